//! RocksDB storage implementation.
//!
//! RocksDB calls block on disk, so each one runs on tokio's blocking pool.
//! That keeps executor threads free and lets callers put a deadline on a
//! stalled call; the engine work itself still runs to completion.

use crate::{
    column_families::all_column_families,
    errors::{Result, StorageError},
    traits::{deserialize_value, serialize_key, serialize_value, Batch, Storage},
};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tracing::{debug, info, trace};

/// RocksDB storage implementation
pub struct RocksDbStorage {
    db: Arc<DB>,
}

impl RocksDbStorage {
    /// Open (or create) the database and all column families
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, &path, all_column_families()).map_err(engine_error)?;

        info!(path = ?path.as_ref(), "Opened RocksDB");

        Ok(Self { db: Arc::new(db) })
    }

    /// Open a database in a fresh temporary directory
    ///
    /// The directory is removed when the returned [`TempDir`] is dropped, so
    /// callers must keep it alive for as long as the storage is in use.
    pub fn open_temp() -> Result<(Self, TempDir)> {
        let temp_dir = TempDir::new()?;
        let storage = Self::open(temp_dir.path())?;
        Ok((storage, temp_dir))
    }

    /// Flush memtables to disk. Called once on shutdown.
    pub fn flush(&self) -> Result<()> {
        for cf in all_column_families() {
            self.db
                .flush_cf(column_family(&self.db, cf)?)
                .map_err(engine_error)?;
        }
        debug!("Flushed RocksDB column families");
        Ok(())
    }

    /// Run `op` against the database on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DB) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StorageError::Database(format!("Storage task failed: {}", e)))?
    }
}

fn column_family<'a>(db: &'a DB, cf: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(cf)
        .ok_or_else(|| StorageError::InvalidColumnFamily(cf.to_string()))
}

fn engine_error(e: rocksdb::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

#[async_trait]
impl Storage for RocksDbStorage {
    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let cf = cf.to_string();
        let key = serialize_key(key)?;
        let value = serialize_value(value)?;

        self.blocking(move |db| {
            db.put_cf(column_family(db, &cf)?, key, value)
                .map_err(engine_error)
        })
        .await
    }

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync,
    {
        let cf = cf.to_string();
        let key = serialize_key(key)?;

        self.blocking(move |db| db.delete_cf(column_family(db, &cf)?, key).map_err(engine_error))
            .await
    }

    async fn get_by_prefix<K, V>(&self, cf: &str, prefix: &K) -> Result<Vec<(Vec<u8>, V)>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned + Send,
    {
        let cf = cf.to_string();
        let prefix = serialize_key(prefix)?;

        let raw = self
            .blocking(move |db| {
                // No prefix extractor is configured; seek and stop at the first foreign key.
                let mut rows = Vec::new();
                let iter = db.iterator_cf(
                    column_family(db, &cf)?,
                    IteratorMode::From(&prefix, Direction::Forward),
                );
                for item in iter {
                    let (key, value) = item.map_err(engine_error)?;
                    if !key.starts_with(&prefix) {
                        break;
                    }
                    rows.push((key.into_vec(), value.into_vec()));
                }
                Ok(rows)
            })
            .await?;

        trace!(rows = raw.len(), "Prefix scan");

        raw.into_iter()
            .map(|(key, value)| -> Result<(Vec<u8>, V)> { Ok((key, deserialize_value(&value)?)) })
            .collect()
    }

    fn batch(&self) -> Box<dyn Batch> {
        Box::new(RocksDbBatch {
            db: Arc::clone(&self.db),
            write_batch: WriteBatch::default(),
        })
    }

    async fn ping(&self) -> Result<()> {
        self.blocking(|db| {
            for cf in all_column_families() {
                column_family(db, cf)?;
            }
            db.property_int_value("rocksdb.estimate-num-keys")
                .map_err(engine_error)?;
            Ok(())
        })
        .await
    }
}

/// Write batch over a shared database handle
pub struct RocksDbBatch {
    db: Arc<DB>,
    write_batch: WriteBatch,
}

#[async_trait]
impl Batch for RocksDbBatch {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.write_batch
            .put_cf(column_family(&self.db, cf)?, key, value);
        Ok(())
    }

    fn delete_raw(&mut self, cf: &str, key: Vec<u8>) -> Result<()> {
        self.write_batch.delete_cf(column_family(&self.db, cf)?, key);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let RocksDbBatch { db, write_batch } = *self;
        let operations = write_batch.len();

        tokio::task::spawn_blocking(move || db.write(write_batch).map_err(engine_error))
            .await
            .map_err(|e| StorageError::Database(format!("Storage task failed: {}", e)))??;

        debug!(operations, "Batch committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        debug!(operations = self.write_batch.len(), "Batch rolled back");
    }
}
