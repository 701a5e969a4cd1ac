//! RocksDB column family definitions.

/// User credentials: (screen_name, record_id) → UserCredential
///
/// Keys are prefixed by the bincode-encoded screen name so that every record
/// for one screen name can be read with a single prefix scan.
pub const CF_USER_CREDENTIALS: &str = "user_credentials";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![CF_USER_CREDENTIALS]
}
