use crate::config::Config;
use crate::credentials::{generate_password, hash_password};
use crate::database::sqlite_repository::SqliteRepository;
use crate::database::user::UserRepository;
use crate::db::{init_pool, run_migrations};
use crate::error::app_error::AppError;
use crate::models::user::USERNAME_MAX_LEN;
use tracing::info;

const GENERATED_PASSWORD_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub user_id: i64,
    pub username: String,
    pub created: bool,
    /// Set only when a new account was created without an explicit password.
    /// It is never stored in clear and cannot be recovered later.
    pub generated_password: Option<String>,
}

/// Creates or promotes `username` as an administrator in the configured store.
pub async fn provision_admin(config: &Config, username: &str, password: Option<&str>) -> Result<ProvisionResult, AppError> {
    let pool = init_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let repo = SqliteRepository { pool };
    let result = provision_with(&repo, username, password).await;
    repo.pool.close().await;
    result
}

/// Existing users keep their password unless `password` is given. New users
/// get `password`, or a generated one.
pub async fn provision_with<R: UserRepository>(repository: &R, username: &str, password: Option<&str>) -> Result<ProvisionResult, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::EmptyUsername);
    }
    if username.chars().count() as u64 > USERNAME_MAX_LEN {
        return Err(AppError::Validation("Username must be between 1 and 80 characters".to_string()));
    }

    let password = password.filter(|p| !p.is_empty());
    let existing = repository.get_user_by_username(username).await?;

    let (password_hash, generated) = match (password, existing) {
        (Some(password), _) => (hash_password(password)?, None),
        (None, Some(user)) => (user.password_hash, None),
        (None, None) => {
            let generated = generate_password(GENERATED_PASSWORD_LEN);
            (hash_password(&generated)?, Some(generated))
        }
    };

    let grant = repository.grant_admin(username, &password_hash, password.is_some()).await?;
    info!(
        user_id = grant.user.id,
        username = %grant.user.username,
        created = grant.created,
        "admin provisioned"
    );

    Ok(ProvisionResult {
        user_id: grant.user.id,
        username: grant.user.username,
        created: grant.created,
        generated_password: generated.filter(|_| grant.created),
    })
}
