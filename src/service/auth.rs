use crate::auth::Session;
use crate::config::AdminConfig;
use crate::credentials::{check_password, dummy_verify, hash_password};
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{ChangePasswordForm, RegisterForm, User};
use tracing::{info, warn};
use validator::Validate;

/// Registration, login and the per-request authorization gates.
pub struct AuthService<'a, R> {
    repository: &'a R,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        AuthService { repository }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User, AppError> {
        let form = form.normalized();
        form.validate()?;

        // Checked up front to skip hashing for names that are obviously taken.
        // `create_user` checks again inside its transaction.
        if self.repository.get_user_by_username(&form.username).await?.is_some() {
            return Err(AppError::UsernameTaken(form.username));
        }

        let password_hash = hash_password(&form.password)?;
        let user = self.repository.create_user(&form.username, &password_hash).await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Unknown usernames and wrong passwords fail identically, including the
    /// time spent verifying.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();

        let verified = match self.repository.get_user_by_username(username).await? {
            Some(user) => check_password(password, &user.password_hash).then_some(user),
            None => {
                dummy_verify(password);
                None
            }
        };

        match verified {
            Some(user) => {
                info!(user_id = user.id, username = %user.username, "user logged in");
                Ok(user)
            }
            None => {
                warn!(username = %username, "login failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Resolves the session to a stored user. Sessions naming a user that no
    /// longer resolves count as anonymous.
    pub async fn current_user(&self, session: &Session) -> Result<User, AppError> {
        let username = session.require()?;
        self.repository.get_user_by_username(username).await?.ok_or(AppError::NotAuthenticated)
    }

    /// The admin flag is re-read on every call; nothing about it is cached in the session.
    pub async fn require_admin(&self, session: &Session) -> Result<User, AppError> {
        admin_only(self.current_user(session).await?)
    }

    pub async fn change_password(&self, user: &User, form: &ChangePasswordForm) -> Result<(), AppError> {
        form.validate()?;

        if !check_password(&form.current_password, &user.password_hash) {
            return Err(AppError::IncorrectPassword);
        }

        let password_hash = hash_password(&form.new_password)?;
        if !self.repository.update_password_hash(&user.username, &password_hash).await? {
            return Err(AppError::NotAuthenticated);
        }

        info!(user_id = user.id, username = %user.username, "password changed");
        Ok(())
    }

    /// Bootstrap login for administrators, against credentials provisioned out
    /// of band in [`AdminConfig`]. On success the configured user is created
    /// (with the configured hash) or promoted.
    pub async fn admin_login(&self, admin: &AdminConfig, username: &str, password: &str) -> Result<User, AppError> {
        let Some((admin_username, admin_hash)) = admin.credentials() else {
            dummy_verify(password);
            warn!("admin login attempted but bootstrap credentials are not configured");
            return Err(AppError::InvalidAdminCredentials);
        };

        // Verify before comparing names so both failure modes cost the same.
        let password_ok = check_password(password, admin_hash);
        if !password_ok || username.trim() != admin_username {
            warn!(username = %username, "admin login failed");
            return Err(AppError::InvalidAdminCredentials);
        }

        let grant = self.repository.grant_admin(admin_username, admin_hash, false).await?;
        info!(
            user_id = grant.user.id,
            username = %grant.user.username,
            created = grant.created,
            "admin bootstrap login"
        );

        Ok(grant.user)
    }
}

/// Admin flag check on an already resolved user.
pub fn admin_only(user: User) -> Result<User, AppError> {
    if !user.is_admin {
        warn!(user_id = user.id, username = %user.username, "admin access denied");
        return Err(AppError::AdminRequired);
    }

    Ok(user)
}
