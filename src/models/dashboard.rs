use crate::models::notice::Notice;
use rocket::serde::Serialize;

#[derive(Serialize, Debug)]
pub struct DashboardResponse {
    pub username: String,
    pub is_admin: bool,
    /// Contact usernames in the order they were added.
    pub contacts: Vec<String>,
    pub notice: Option<Notice>,
}
