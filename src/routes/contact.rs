use crate::auth::{Session, authenticate};
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::Redirected;
use crate::models::contact::AddFriendForm;
use crate::service::contact::ContactService;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::{Flash, Redirect};
use rocket::{State, post, routes};
use sqlx::SqlitePool;

#[post("/add_friend", data = "<form>")]
pub async fn add_friend(
    pool: &State<SqlitePool>,
    session: Session,
    cookies: &CookieJar<'_>,
    form: Form<AddFriendForm>,
) -> Result<Flash<Redirect>, Redirected> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = authenticate(&repo, &session, cookies).await?;

    let contact = ContactService::new(&repo)
        .add_friend(&user, &form.username)
        .await
        .map_err(|e| e.redirect_to("/dashboard"))?;

    Ok(Flash::success(
        Redirect::to("/dashboard"),
        format!("'{}' added to your friends", contact.username),
    ))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![add_friend]
}
