//! # registration-storage
//!
//! Storage abstraction layer for the registration service.
//!
//! Records are bincode-encoded and grouped into column families. The
//! [`Storage`] trait keeps the rest of the workspace independent of RocksDB so
//! the credential store can be exercised against a throwaway database in tests.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use rocksdb_impl::RocksDbStorage;
pub use traits::{Batch, BatchExt, Storage};
