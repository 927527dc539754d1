/*
 * Responsibility
 * - 永続化層 (credential store / story store) の公開
 */
pub mod credentials;
pub mod error;
pub mod stories;
