use rocket::request::FlashMessage;
use rocket::serde::Serialize;

/// A one-shot message carried across a redirect in the flash cookie.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub message: String,
}

impl From<FlashMessage<'_>> for Notice {
    fn from(flash: FlashMessage<'_>) -> Self {
        let (kind, message) = flash.into_inner();
        Self { kind, message }
    }
}

/// Body of the views that carry nothing but a page name and the pending notice
/// (home, registration and admin login).
#[derive(Serialize, Debug)]
pub struct PageResponse {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

impl PageResponse {
    pub fn new(page: &'static str, flash: Option<FlashMessage<'_>>) -> Self {
        Self {
            page,
            notice: flash.map(Notice::from),
        }
    }
}
