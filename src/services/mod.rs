pub mod auth;
pub mod blob;
pub mod validation;
