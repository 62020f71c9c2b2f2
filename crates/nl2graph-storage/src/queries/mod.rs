//! Raw SQL per table. Functions take a `&Connection` and return storage
//! records with JSON columns still encoded; the engine decodes them.

pub mod records;
pub mod results;
