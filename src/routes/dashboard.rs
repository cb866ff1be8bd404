use crate::auth::{Session, authenticate};
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::Redirected;
use crate::models::dashboard::DashboardResponse;
use crate::models::notice::Notice;
use crate::service::dashboard::DashboardService;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::serde::json::Json;
use rocket::{State, get, routes};
use sqlx::SqlitePool;

/// Current user's dashboard: username, admin flag and contacts in insertion order.
#[get("/dashboard")]
pub async fn get_dashboard(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Json<DashboardResponse>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = authenticate(&repo, &session, cookies).await?;

    let dashboard = DashboardService::new(&repo).dashboard(&user, flash.map(Notice::from)).await?;
    Ok(Json(dashboard))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_dashboard]
}
