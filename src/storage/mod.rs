pub mod json_backend;
pub mod memory;

use crate::errors::TripError;

pub type Result<T> = std::result::Result<T, TripError>;

/// String-keyed persistence for small serialized documents, in the spirit of a
/// browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
