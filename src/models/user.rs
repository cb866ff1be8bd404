use crate::models::notice::Notice;
use chrono::{DateTime, Utc};
use rocket::FromForm;
use rocket::serde::Serialize;
use validator::Validate;

pub const USERNAME_MAX_LEN: u64 = 80;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Result of creating or promoting an administrator.
#[derive(Debug)]
pub struct AdminGrant {
    pub user: User,
    pub created: bool,
}

#[derive(FromForm, Validate, Debug, Clone)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 80, message = "Username must be between 1 and 80 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RegisterForm {
    /// Usernames are stored trimmed; passwords are kept verbatim.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}

#[derive(FromForm, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(FromForm, Validate, Debug, Clone)]
pub struct ChangePasswordForm {
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Body of `GET /editar`.
#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub notice: Option<Notice>,
}
