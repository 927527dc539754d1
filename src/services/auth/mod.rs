pub mod access_jwt;
pub mod bootstrap;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod token_issuer;
pub mod token_service;

pub use access_jwt::AccessTokenVerifier;
pub use token_service::TokenService;
