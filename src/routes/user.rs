use crate::auth::{Session, authenticate, end_session, start_session};
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::Redirected;
use crate::models::notice::{Notice, PageResponse};
use crate::models::user::{ChangePasswordForm, LoginForm, ProfileResponse, RegisterForm, UserResponse};
use crate::service::auth::AuthService;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::{State, get, post, routes};
use sqlx::SqlitePool;

#[get("/register")]
pub fn register_page(flash: Option<FlashMessage<'_>>) -> Json<PageResponse> {
    Json(PageResponse::new("register", flash))
}

#[post("/register", data = "<form>")]
pub async fn register(pool: &State<SqlitePool>, form: Form<RegisterForm>) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = AuthService::new(&repo)
        .register(form.into_inner())
        .await
        .map_err(|e| e.redirect_to("/register"))?;

    Ok(Flash::success(
        Redirect::to("/"),
        format!("Account created for '{}'. You can now log in.", user.username),
    ))
}

#[post("/login", data = "<form>")]
pub async fn login(pool: &State<SqlitePool>, cookies: &CookieJar<'_>, form: Form<LoginForm>) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = AuthService::new(&repo)
        .login(&form.username, &form.password)
        .await
        .map_err(|e| e.redirect_to("/"))?;

    start_session(cookies, &user.username);
    Ok(Flash::success(Redirect::to("/dashboard"), format!("Welcome, {}!", user.username)))
}

#[get("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Flash<Redirect> {
    end_session(cookies);
    Flash::success(Redirect::to("/"), "You have been logged out")
}

#[get("/editar")]
pub async fn profile(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Json<ProfileResponse>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = authenticate(&repo, &session, cookies).await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from(&user),
        notice: flash.map(Notice::from),
    }))
}

#[post("/editar", data = "<form>")]
pub async fn change_password(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    form: Form<ChangePasswordForm>,
) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = authenticate(&repo, &session, cookies).await?;

    AuthService::new(&repo)
        .change_password(&user, &form)
        .await
        .map_err(|e| e.redirect_to("/editar"))?;

    Ok(Flash::success(Redirect::to("/dashboard"), "Password updated"))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![register_page, register, login, logout, profile, change_password]
}
