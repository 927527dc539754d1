pub mod admin;
pub mod auth;
pub mod envelope;
pub mod files;
pub mod stories;
pub mod users;
