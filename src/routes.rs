pub mod admin;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod home;
pub mod user;
