use crate::models::notice::Notice;
use crate::models::user::UserResponse;
use rocket::FromForm;
use rocket::serde::Serialize;
use validator::Validate;

#[derive(FromForm, Debug, Clone)]
pub struct AdminLoginForm {
    pub username: String,
    pub password: String,
}

#[derive(FromForm, Validate, Debug, Clone)]
pub struct SetPasswordForm {
    pub username: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

#[derive(Serialize, Debug)]
pub struct AdminUsersResponse {
    pub users: Vec<UserResponse>,
    pub notice: Option<Notice>,
}
