use crate::credentials::hash_password;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::admin::SetPasswordForm;
use crate::models::user::{User, UserResponse};
use tracing::info;
use validator::Validate;

/// User management. Callers gate every method with
/// [`AuthService::require_admin`](crate::service::auth::AuthService::require_admin) and pass the
/// resulting admin in.
pub struct AdminService<'a, R> {
    repository: &'a R,
}

impl<'a, R: UserRepository> AdminService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub async fn list_users(&self, _admin: &User) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repository.list_users().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Overwrites another user's password hash. The old password is not needed.
    pub async fn set_password(&self, admin: &User, form: &SetPasswordForm) -> Result<String, AppError> {
        let target = form.username.trim();
        if target.is_empty() {
            return Err(AppError::EmptyUsername);
        }
        form.validate()?;

        let password_hash = hash_password(&form.new_password)?;
        if !self.repository.update_password_hash(target, &password_hash).await? {
            return Err(AppError::UserNotFound(target.to_string()));
        }

        info!(admin_id = admin.id, target = %target, "password reset by admin");
        Ok(target.to_string())
    }
}
