/*
 * Responsibility
 * - HTTP 層 (dto / extractor / handler / routes) の公開
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
