use crate::auth::Session;
use crate::models::notice::PageResponse;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, routes};

/// Login surface. Signed-in users go straight to their dashboard.
#[get("/")]
pub fn home(session: Session, flash: Option<FlashMessage<'_>>) -> Result<Json<PageResponse>, Redirect> {
    if session.is_authenticated() {
        return Err(Redirect::to("/dashboard"));
    }

    Ok(Json(PageResponse::new("home", flash)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![home]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{assert_redirect, get_json, login, register, test_client};

    #[rocket::async_test]
    async fn test_anonymous_visitors_get_the_login_page() {
        let client = test_client().await;

        let body = get_json(&client, "/").await;
        assert_eq!(body["page"], "home");
        assert!(body["notice"].is_null());
    }

    #[rocket::async_test]
    async fn test_signed_in_users_are_sent_to_the_dashboard() {
        let client = test_client().await;
        register(&client, "alice", "pw1").await;
        login(&client, "alice", "pw1").await;

        let response = client.get("/").dispatch().await;
        assert_redirect(&response, "/dashboard");
    }
}
