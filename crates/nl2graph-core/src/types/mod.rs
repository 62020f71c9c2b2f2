//! Domain types shared across crates.

pub mod key;
pub mod record;
pub mod results;
pub mod schema;
pub mod stage;
