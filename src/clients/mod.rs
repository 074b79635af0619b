//! 外部服务客户端

pub mod kv_store;

pub use kv_store::{KeyValueStore, MemoryStore};
