use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use crate::service::auth::{AuthService, admin_only};
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use std::convert::Infallible;

/// Name of the private cookie holding the session identity.
pub const SESSION_COOKIE: &str = "session";

/// Identity attached to the current request.
///
/// The only thing a session remembers is the username; everything else
/// (including the admin flag) is re-read from the store on each request.
/// The cookie is private, so it is encrypted and authenticated with the
/// server's secret key and cannot be forged client side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { username: String },
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { username } => Some(username),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// Authorization gate: the username behind the session, or `NotAuthenticated`.
    pub fn require(&self) -> Result<&str, AppError> {
        self.username().ok_or(AppError::NotAuthenticated)
    }

    pub(crate) fn from_cookie_value(value: &str) -> Self {
        let username = value.trim();
        if username.is_empty() {
            Session::Anonymous
        } else {
            Session::Authenticated {
                username: username.to_string(),
            }
        }
    }
}

pub fn build_session_cookie(username: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, username.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// `Anonymous -> Authenticated`.
pub fn start_session(cookies: &CookieJar<'_>, username: &str) {
    cookies.add_private(build_session_cookie(username));
}

/// `Authenticated -> Anonymous`.
pub fn end_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/").build());
}

/// Resolves the session of a gated handler to its user. A session naming a
/// user that no longer exists is ended on the spot.
pub async fn authenticate<R: UserRepository>(repository: &R, session: &Session, cookies: &CookieJar<'_>) -> Result<User, AppError> {
    let result = AuthService::new(repository).current_user(session).await;
    if matches!(result, Err(AppError::NotAuthenticated)) && session.is_authenticated() {
        end_session(cookies);
    }
    result
}

/// [`authenticate`], then the stored admin flag.
pub async fn authenticate_admin<R: UserRepository>(repository: &R, session: &Session, cookies: &CookieJar<'_>) -> Result<User, AppError> {
    admin_only(authenticate(repository, session, cookies).await?)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let session = req
            .cookies()
            .get_private(SESSION_COOKIE)
            .map(|cookie| Session::from_cookie_value(cookie.value()))
            .unwrap_or(Session::Anonymous);

        req.local_cache(|| Some(session.clone()));
        Outcome::Success(session)
    }
}
