/*
 * Responsibility
 *  - core と types を束ねる
 */
mod core;
mod types;

pub use core::{Authorized, PolicyTag};
pub use types::*;
