pub mod admin;
pub mod auth;
pub mod fallback;
pub mod files;
pub mod health;
pub mod setup;
pub mod stories;
pub mod template_stories;
pub mod users;
