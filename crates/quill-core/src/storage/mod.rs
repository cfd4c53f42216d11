//! Storage ports and the per-collection adapter built on them.

pub mod adapter;
pub mod local_cache;
pub mod remote_store;

pub use adapter::{ReadOutcome, RemoteWrite, StorageAdapter, WriteReport};
pub use local_cache::LocalCache;
pub use remote_store::RemoteStore;
