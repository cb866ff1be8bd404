use crate::auth::{Session, authenticate_admin, start_session};
use crate::config::Config;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::Redirected;
use crate::models::admin::{AdminLoginForm, AdminUsersResponse, SetPasswordForm};
use crate::models::notice::{Notice, PageResponse};
use crate::service::admin::AdminService;
use crate::service::auth::AuthService;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::{State, get, post, routes};
use sqlx::SqlitePool;

/// Admin login view. Sessions that already hold the admin flag skip it.
#[get("/")]
pub async fn admin_page(
    pool: &State<SqlitePool>,
    session: Session,
    flash: Option<FlashMessage<'_>>,
) -> Result<Json<PageResponse>, Redirect> {
    if session.is_authenticated() {
        let repo = SqliteRepository { pool: pool.inner().clone() };
        if AuthService::new(&repo).require_admin(&session).await.is_ok() {
            return Err(Redirect::to("/admin/users"));
        }
    }

    Ok(Json(PageResponse::new("admin", flash)))
}

#[post("/login", data = "<form>")]
pub async fn admin_login(
    pool: &State<SqlitePool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    form: Form<AdminLoginForm>,
) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let admin = AuthService::new(&repo)
        .admin_login(&config.admin, &form.username, &form.password)
        .await
        .map_err(|e| e.redirect_to("/admin"))?;

    start_session(cookies, &admin.username);
    Ok(Flash::success(
        Redirect::to("/admin/users"),
        format!("Signed in as administrator '{}'", admin.username),
    ))
}

#[get("/users")]
pub async fn list_users(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Json<AdminUsersResponse>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let admin = authenticate_admin(&repo, &session, cookies).await?;

    let users = AdminService::new(&repo).list_users(&admin).await?;
    Ok(Json(AdminUsersResponse {
        users,
        notice: flash.map(Notice::from),
    }))
}

#[post("/set_password", data = "<form>")]
pub async fn set_password(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    form: Form<SetPasswordForm>,
) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let admin = authenticate_admin(&repo, &session, cookies).await?;

    let target = AdminService::new(&repo)
        .set_password(&admin, &form)
        .await
        .map_err(|e| e.redirect_to("/admin/users"))?;

    Ok(Flash::success(Redirect::to("/admin/users"), format!("Password for '{}' updated", target)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![admin_page, admin_login, list_users, set_password]
}
