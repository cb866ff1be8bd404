use chrono::{DateTime, Utc};
use rocket::FromForm;

/// Directional friendship: `owner_id` added `contact_id`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,
    pub owner_id: i64,
    pub contact_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(FromForm, Debug, Clone)]
pub struct AddFriendForm {
    pub username: String,
}
