/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 適用順 (外 → 内): envelope → http → cors → security_headers → auth gate
 */
pub mod auth;
pub mod cors;
pub mod envelope;
pub mod http;
pub mod security_headers;
