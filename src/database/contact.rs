use crate::database::sqlite_repository::{SqliteRepository, conflict_or_db};
use crate::error::app_error::AppError;
use crate::models::contact::Contact;
use crate::models::user::User;
use chrono::Utc;

#[async_trait::async_trait]
pub trait ContactRepository: Send + Sync {
    /// Records that `owner` added `contact`. `DuplicateContact` if the pair exists.
    async fn add_contact(&self, owner: &User, contact: &User) -> Result<Contact, AppError>;
    /// Usernames of everyone `owner_id` has added, oldest first.
    async fn list_contact_usernames(&self, owner_id: i64) -> Result<Vec<String>, AppError>;
}

#[async_trait::async_trait]
impl ContactRepository for SqliteRepository {
    async fn add_contact(&self, owner: &User, contact: &User) -> Result<Contact, AppError> {
        let mut tx = self.begin_write().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM contacts WHERE owner_id = ? AND contact_id = ?")
            .bind(owner.id)
            .bind(contact.id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateContact(contact.username.clone()));
        }

        let row = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (owner_id, contact_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, owner_id, contact_id, created_at
            "#,
        )
        .bind(owner.id)
        .bind(contact.id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_db(e, "Failed to add contact", || AppError::DuplicateContact(contact.username.clone())))?;

        tx.commit().await?;

        Ok(row)
    }

    async fn list_contact_usernames(&self, owner_id: i64) -> Result<Vec<String>, AppError> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM contacts c
            JOIN users u ON u.id = c.contact_id
            WHERE c.owner_id = ?
            ORDER BY c.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(usernames)
    }
}
