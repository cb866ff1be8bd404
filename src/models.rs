pub mod admin;
pub mod contact;
pub mod dashboard;
pub mod notice;
pub mod user;
