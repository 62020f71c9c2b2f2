//! Storage traits. Implemented by `nl2graph-storage` over SQLite and by the
//! in-memory doubles in `test_helpers`.

pub mod result_store;
pub mod source_store;
pub mod test_helpers;

pub use result_store::IResultStore;
pub use source_store::ISourceStore;
