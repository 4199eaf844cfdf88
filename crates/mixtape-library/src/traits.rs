use serde_json::Value;

use crate::error::RegistryError;

/// Durable string-keyed store holding JSON values.
///
/// `get` returns `None` for a key that was never written. `set` replaces the
/// whole value of the key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, RegistryError>;
    fn set(&self, key: &str, value: Value) -> Result<(), RegistryError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Value>, RegistryError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), RegistryError> {
        (**self).set(key, value)
    }
}
