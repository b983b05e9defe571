//! A tiny key-value persistence layer for app preferences.
//!
//! Values are plain strings. Callers decide how to encode them (the frontend stores JSON arrays and enum names).
//! Backends:
//! - [`MemoryStore`]: in-process map, used in tests and when nothing better is available.
//! - [`JsonFileStore`]: a flat JSON object on disk, for native builds.
//! - `LocalStorage`: the browser's `window.localStorage`, behind the `local-storage` feature on wasm32.

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "local-storage")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
#[cfg(feature = "local-storage")]
pub use local_storage::LocalStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
