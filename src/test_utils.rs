use crate::config::{AdminConfig, Config};
use crate::credentials::hash_password;
use crate::database::contact::ContactRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::database::user::UserRepository;
use crate::db::{init_pool, run_migrations};
use crate::error::app_error::AppError;
use crate::models::contact::Contact;
use crate::models::user::{AdminGrant, RegisterForm, User};
use crate::build_rocket;
use chrono::Utc;
use rocket::http::{ContentType, RawStr, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::Value;
use uuid::Uuid;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Configuration backed by a private in-memory SQLite database. The pool holds
/// a single connection, which keeps the database alive for the whole test.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    config
}

pub async fn test_repository() -> SqliteRepository {
    let pool = init_pool(&test_config().database).await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations apply");
    SqliteRepository { pool }
}

/// A repository over a throwaway database file. The file is removed on drop.
pub struct FileDatabase {
    pub repo: SqliteRepository,
    path: PathBuf,
}

impl FileDatabase {
    pub async fn create(max_connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("friendlist-test-{}.db", Uuid::new_v4()));
        let mut config = test_config();
        config.database.url = format!("sqlite://{}?mode=rwc", path.display());
        config.database.max_connections = max_connections;

        let pool = init_pool(&config.database).await.expect("file pool");
        run_migrations(&pool).await.expect("migrations apply");
        FileDatabase {
            repo: SqliteRepository { pool },
            path,
        }
    }
}

impl Drop for FileDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub fn admin_config(username: &str, password: &str) -> AdminConfig {
    AdminConfig {
        username: Some(username.to_string()),
        password_hash: Some(hash_password(password).expect("hash")),
    }
}

pub fn register_form(username: &str, password: &str) -> RegisterForm {
    RegisterForm {
        username: username.to_string(),
        password: password.to_string(),
    }
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

pub async fn test_client() -> Client {
    test_client_with(test_config()).await
}

pub async fn test_client_with(config: Config) -> Client {
    Client::tracked(build_rocket(config)).await.expect("valid rocket instance")
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, RawStr::new(value).percent_encode().as_str()))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn post_form<'c>(client: &'c Client, uri: &'static str, fields: &[(&str, &str)]) -> LocalResponse<'c> {
    client.post(uri).header(ContentType::Form).body(form_body(fields)).dispatch().await
}

pub async fn register<'c>(client: &'c Client, username: &str, password: &str) -> LocalResponse<'c> {
    post_form(client, "/register", &[("username", username), ("password", password)]).await
}

pub async fn login<'c>(client: &'c Client, username: &str, password: &str) -> LocalResponse<'c> {
    post_form(client, "/login", &[("username", username), ("password", password)]).await
}

pub fn location(response: &LocalResponse<'_>) -> Option<String> {
    response.headers().get_one("Location").map(str::to_string)
}

/// Asserts a redirect to `to` and returns nothing else; the flash notice is
/// read back by fetching the target page.
pub fn assert_redirect(response: &LocalResponse<'_>, to: &str) {
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(location(response).as_deref(), Some(to));
}

pub async fn get_json(client: &Client, uri: &'static str) -> Value {
    let response = client.get(uri).dispatch().await;
    assert_eq!(response.status(), Status::Ok, "GET {uri}");
    response.into_json::<Value>().await.expect("json body")
}

/// Message of the pending notice, as rendered by the page at `uri`.
pub async fn notice_at(client: &Client, uri: &'static str) -> Option<String> {
    let body = get_json(client, uri).await;
    body["notice"]["message"].as_str().map(str::to_string)
}

// ── In-memory repository ──────────────────────────────────────────────────────

#[derive(Default)]
struct MockState {
    users: Vec<User>,
    contacts: Vec<Contact>,
}

/// In-memory stand-in for [`SqliteRepository`] that also counts user-table
/// listings and writes.
#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
    listings: AtomicUsize,
    writes: AtomicUsize,
}

impl MockRepository {
    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }

    pub fn contact_count(&self) -> usize {
        self.state().contacts.len()
    }

    pub fn listing_count(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn insert_user(state: &mut MockState, username: &str, password_hash: &str, is_admin: bool) -> User {
        let user = User {
            id: state.users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        user
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::UsernameTaken(username.to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Self::insert_user(&mut state, username, password_hash, false))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.state().users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.state().users.clone())
    }

    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let mut state = self.state();
        match state.users.iter_mut().find(|u| u.username == username) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn grant_admin(&self, username: &str, password_hash: &str, reset_password: bool) -> Result<AdminGrant, AppError> {
        let mut state = self.state();
        self.writes.fetch_add(1, Ordering::SeqCst);

        if let Some(user) = state.users.iter_mut().find(|u| u.username == username) {
            user.is_admin = true;
            if reset_password {
                user.password_hash = password_hash.to_string();
            }
            return Ok(AdminGrant {
                user: user.clone(),
                created: false,
            });
        }

        Ok(AdminGrant {
            user: Self::insert_user(&mut state, username, password_hash, true),
            created: true,
        })
    }
}

#[async_trait::async_trait]
impl ContactRepository for MockRepository {
    async fn add_contact(&self, owner: &User, contact: &User) -> Result<Contact, AppError> {
        let mut state = self.state();
        if state.contacts.iter().any(|c| c.owner_id == owner.id && c.contact_id == contact.id) {
            return Err(AppError::DuplicateContact(contact.username.clone()));
        }

        let row = Contact {
            id: state.contacts.len() as i64 + 1,
            owner_id: owner.id,
            contact_id: contact.id,
            created_at: Utc::now(),
        };
        state.contacts.push(row.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn list_contact_usernames(&self, owner_id: i64) -> Result<Vec<String>, AppError> {
        let state = self.state();
        Ok(state
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .filter_map(|c| state.users.iter().find(|u| u.id == c.contact_id))
            .map(|u| u.username.clone())
            .collect())
    }
}
