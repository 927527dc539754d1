/*
 * Responsibility
 * - 認証情報ストア (principal / role / claim) の契約と実装を束ねる
 */
pub mod memory;
pub mod pg;
mod store;

pub use memory::MemoryCredentialStore;
pub use pg::PgCredentialStore;
pub use store::{CredentialStore, NewPrincipal, Principal};
