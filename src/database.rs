pub mod contact;
pub mod sqlite_repository;
pub mod user;
