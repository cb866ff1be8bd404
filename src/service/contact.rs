use crate::database::contact::ContactRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use tracing::info;

pub struct ContactService<'a, R> {
    repository: &'a R,
}

impl<'a, R: UserRepository + ContactRepository> ContactService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        ContactService { repository }
    }

    /// Adds `target` to `owner`'s friends. Rejections are checked in order:
    /// empty input, self, unknown user, already added. None of them write.
    pub async fn add_friend(&self, owner: &User, target: &str) -> Result<User, AppError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(AppError::EmptyUsername);
        }
        if target == owner.username {
            return Err(AppError::SelfContact);
        }

        let contact = self
            .repository
            .get_user_by_username(target)
            .await?
            .ok_or_else(|| AppError::UserNotFound(target.to_string()))?;

        self.repository.add_contact(owner, &contact).await?;

        info!(
            owner_id = owner.id,
            contact_id = contact.id,
            contact = %contact.username,
            "contact added"
        );
        Ok(contact)
    }
}
