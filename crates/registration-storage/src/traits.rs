//! Storage trait definitions.

use crate::errors::{Result, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Keyed record store grouped into column families
///
/// Keys are bincode-encoded, so a tuple key `(a, b)` sorts and scans by its
/// `a` prefix. Every call may block on disk and is expected to run off the
/// async executor.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write one value, overwriting any previous value for the key
    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    /// Remove one key. Removing a missing key is not an error.
    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync;

    /// Every `(encoded key, value)` whose key starts with `prefix`, in key order
    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned + Send;

    /// Start an atomic write batch
    fn batch(&self) -> Box<dyn Batch>;

    /// Check that the store is reachable and its column families are open
    async fn ping(&self) -> Result<()>;
}

/// Atomic group of writes
///
/// Object safe, so it works on encoded bytes; [`BatchExt`] adds typed
/// helpers. Dropping a batch without `commit` writes nothing.
#[async_trait]
pub trait Batch: Send {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()>;

    /// Apply every queued write, or none of them
    async fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>);
}

/// Typed keys and values on top of [`Batch`]
pub trait BatchExt: Batch {
    fn put<K, V>(&mut self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        self.put_raw(cf, serialize_key(key)?, serialize_value(value)?)
    }

    fn delete<K>(&mut self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize,
    {
        self.delete_raw(cf, serialize_key(key)?)
    }
}

impl<T: Batch + ?Sized> BatchExt for T {}

/// Encode a key the same way the storage engine does
pub fn serialize_key<K: Serialize + ?Sized>(key: &K) -> Result<Vec<u8>> {
    bincode::serialize(key).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn serialize_value<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn deserialize_value<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}
