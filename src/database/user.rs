use crate::database::sqlite_repository::{SqliteRepository, conflict_or_db};
use crate::error::app_error::AppError;
use crate::models::user::{AdminGrant, User};
use chrono::Utc;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a regular (non-admin) user. `UsernameTaken` if the name exists.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    /// Overwrites the stored hash. Returns `false` when no such user exists.
    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;
    /// Creates `username` as an administrator, or promotes the existing user.
    /// An existing user's hash is only replaced when `reset_password` is set.
    async fn grant_admin(&self, username: &str, password_hash: &str, reset_password: bool) -> Result<AdminGrant, AppError>;
}

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tx = self.begin_write().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(AppError::UsernameTaken(username.to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, is_admin, created_at)
            VALUES (?, ?, 0, ?)
            RETURNING id, username, password_hash, is_admin, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_db(e, "Failed to create user", || AppError::UsernameTaken(username.to_string())))?;

        tx.commit().await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn grant_admin(&self, username: &str, password_hash: &str, reset_password: bool) -> Result<AdminGrant, AppError> {
        let mut tx = self.begin_write().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;

        let grant = match existing {
            Some(id) => {
                let user = sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET is_admin = 1,
                        password_hash = CASE WHEN ? THEN ? ELSE password_hash END
                    WHERE id = ?
                    RETURNING id, username, password_hash, is_admin, created_at
                    "#,
                )
                .bind(reset_password)
                .bind(password_hash)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                AdminGrant { user, created: false }
            }
            None => {
                let user = sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, password_hash, is_admin, created_at)
                    VALUES (?, ?, 1, ?)
                    RETURNING id, username, password_hash, is_admin, created_at
                    "#,
                )
                .bind(username)
                .bind(password_hash)
                .bind(Utc::now())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| conflict_or_db(e, "Failed to create admin user", || AppError::UsernameTaken(username.to_string())))?;

                AdminGrant { user, created: true }
            }
        };

        tx.commit().await?;

        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FileDatabase, test_repository};
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let repo = test_repository().await;

        let created = repo.create_user("alice", "hash-a").await.expect("created");
        assert_eq!(created.username, "alice");
        assert!(!created.is_admin);

        let fetched = repo.get_user_by_username("alice").await.expect("query").expect("present");
        assert_eq!(fetched, created);
        assert!(repo.get_user_by_username("bob").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict_and_adds_no_row() {
        let repo = test_repository().await;
        repo.create_user("alice", "hash-a").await.expect("created");

        let err = repo.create_user("alice", "hash-b").await.unwrap_err();
        assert!(matches!(err, AppError::UsernameTaken(name) if name == "alice"));

        let users = repo.list_users().await.expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].password_hash, "hash-a");
    }

    #[tokio::test]
    async fn test_unique_constraint_backs_up_the_existence_check() {
        let repo = test_repository().await;
        repo.create_user("alice", "hash-a").await.expect("created");

        let err = sqlx::query("INSERT INTO users (username, password_hash) VALUES ('alice', 'x')")
            .execute(&repo.pool)
            .await
            .unwrap_err();
        assert!(crate::database::sqlite_repository::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_list_users_is_ordered_by_id() {
        let repo = test_repository().await;
        repo.create_user("carol", "h").await.expect("created");
        repo.create_user("alice", "h").await.expect("created");

        let names: Vec<String> = repo.list_users().await.expect("list").into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["carol", "alice"]);
    }

    #[tokio::test]
    async fn test_update_password_hash_reports_missing_user() {
        let repo = test_repository().await;
        repo.create_user("alice", "old").await.expect("created");

        assert!(repo.update_password_hash("alice", "new").await.expect("update"));
        assert!(!repo.update_password_hash("ghost", "new").await.expect("update"));

        let alice = repo.get_user_by_username("alice").await.expect("query").expect("present");
        assert_eq!(alice.password_hash, "new");
    }

    #[tokio::test]
    async fn test_grant_admin_creates_missing_user() {
        let repo = test_repository().await;

        let grant = repo.grant_admin("root", "root-hash", false).await.expect("granted");
        assert!(grant.created);
        assert!(grant.user.is_admin);
        assert_eq!(grant.user.password_hash, "root-hash");
    }

    #[tokio::test]
    async fn test_grant_admin_promotes_existing_user() {
        let repo = test_repository().await;
        let before = repo.create_user("alice", "alice-hash").await.expect("created");

        let grant = repo.grant_admin("alice", "other-hash", false).await.expect("granted");
        assert!(!grant.created);
        assert_eq!(grant.user.id, before.id);
        assert!(grant.user.is_admin);
        assert_eq!(grant.user.password_hash, "alice-hash");

        let grant = repo.grant_admin("alice", "other-hash", true).await.expect("granted");
        assert_eq!(grant.user.password_hash, "other-hash");
        assert_eq!(repo.list_users().await.expect("list").len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_lose_with_a_conflict() {
        let db = FileDatabase::create(8).await;

        for round in 0..10 {
            let username = format!("user{round}");
            let mut tasks = JoinSet::new();
            for _ in 0..8 {
                let repo = db.repo.clone();
                let username = username.clone();
                tasks.spawn(async move { repo.create_user(&username, "h").await });
            }

            let mut created = 0;
            while let Some(joined) = tasks.join_next().await {
                match joined.expect("task completes") {
                    Ok(_) => created += 1,
                    Err(AppError::UsernameTaken(name)) => assert_eq!(name, username),
                    Err(other) => panic!("expected a conflict, got {other:?}"),
                }
            }
            assert_eq!(created, 1, "round {round}");
        }

        assert_eq!(db.repo.list_users().await.expect("list").len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admin_grants_create_one_user() {
        let db = FileDatabase::create(8).await;

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let repo = db.repo.clone();
            tasks.spawn(async move { repo.grant_admin("root", "root-hash", false).await });
        }

        let mut created = 0;
        while let Some(joined) = tasks.join_next().await {
            let grant = joined.expect("task completes").expect("granted");
            assert!(grant.user.is_admin);
            if grant.created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(db.repo.list_users().await.expect("list").len(), 1);
    }
}
