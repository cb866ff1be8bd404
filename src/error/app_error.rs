use crate::auth::Session;
use crate::middleware::RequestId;
use rocket::http::Status;
use rocket::response::{Flash, Redirect, Responder};
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Internal server error")]
    Migration {
        message: String,
        #[source]
        source: sqlx::migrate::MigrateError,
    },
    #[error("Internal server error")]
    PasswordHash { message: String },
    #[error("{0}")]
    Validation(String),
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid admin credentials")]
    InvalidAdminCredentials,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Please log in to continue")]
    NotAuthenticated,
    #[error("Access denied: administrators only")]
    AdminRequired,
    #[error("Please enter a username")]
    EmptyUsername,
    #[error("You cannot add yourself as a friend")]
    SelfContact,
    #[error("User '{0}' not found")]
    UserNotFound(String),
    #[error("'{0}' is already in your friends list")]
    DuplicateContact(String),
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn password_hash(message: impl Into<String>, source: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }

    /// Failures the user cannot act on. These never leave the server as a notice.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Db { .. } | AppError::Migration { .. } | AppError::PasswordHash { .. }
        )
    }

    /// Where the user lands when a handler does not pick a target itself.
    pub fn default_redirect(&self) -> &'static str {
        match self {
            AppError::AdminRequired | AppError::EmptyUsername | AppError::SelfContact | AppError::DuplicateContact(_) => "/dashboard",
            AppError::UsernameTaken(_) => "/register",
            AppError::IncorrectPassword => "/editar",
            AppError::InvalidAdminCredentials => "/admin",
            _ => "/",
        }
    }

    /// Bounce the user to `to` with this error as the flash notice.
    pub fn redirect_to(self, to: &'static str) -> Redirected {
        Redirected { error: self, to }
    }
}

/// An [`AppError`] paired with the page that should display it.
#[derive(Debug)]
pub struct Redirected {
    pub error: AppError,
    pub to: &'static str,
}

impl From<AppError> for Redirected {
    fn from(error: AppError) -> Self {
        let to = error.default_redirect();
        Redirected { error, to }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid input".to_string());

        AppError::Validation(message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::db("Database error", e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Migration {
            message: "Failed to apply database migrations".to_string(),
            source: e,
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        if e.is_internal() { Status::InternalServerError } else { Status::SeeOther }
    }
}

fn respond<'r>(error: AppError, to: &'static str, req: &'r Request<'_>) -> rocket::response::Result<'static> {
    let method = req.method();
    let uri = req.uri();

    let request_id = req
        .local_cache(|| None::<RequestId>)
        .as_ref()
        .map(|r| r.0.as_str())
        .unwrap_or("unknown");

    let user = req
        .local_cache(|| None::<Session>)
        .as_ref()
        .and_then(|s| s.username())
        .unwrap_or("anonymous");

    if error.is_internal() {
        error!(
            error = ?error,
            request_id = %request_id,
            user = %user,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&error);
        let body = error.to_string();
        return Response::build().status(status).sized_body(body.len(), Cursor::new(body)).ok();
    }

    warn!(
        notice = %error,
        redirect = to,
        request_id = %request_id,
        user = %user,
        method = %method,
        uri = %uri,
        "request rejected"
    );

    Flash::error(Redirect::to(to), error.to_string()).respond_to(req)
}

impl<'r> Responder<'r, 'static> for Redirected {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        respond(self.error, self.to, req)
    }
}
