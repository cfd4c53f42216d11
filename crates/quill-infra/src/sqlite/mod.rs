//! SQLite implementations of the quill-core storage ports.

pub mod cache;
pub mod pool;

pub use cache::SqliteLocalCache;
pub use pool::DatabasePool;
