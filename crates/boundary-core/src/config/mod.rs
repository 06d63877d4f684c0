//! Configuration loading and management.

mod loader;
mod schema;

pub use loader::MAX_EXPIRY_WARNING_DAYS;
pub use schema::*;
