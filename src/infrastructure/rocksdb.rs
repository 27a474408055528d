use crate::domain::ports::LocalStorage;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding local storage entries.
pub const CF_LOCAL_STORAGE: &str = "local_storage";

/// A persistent local storage implementation using RocksDB.
///
/// Keys are stored as UTF-8 bytes in their own Column Family. This struct is
/// thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStorage {
    db: Arc<DB>,
}

impl RocksDbStorage {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `local_storage` column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_LOCAL_STORAGE, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn handle(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_LOCAL_STORAGE).ok_or_else(|| {
            StorefrontError::StorageError(Box::new(std::io::Error::other(
                "Local storage column family not found",
            )))
        })
    }
}

#[async_trait]
impl LocalStorage for RocksDbStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.handle()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self.handle()?;
        self.db.put_cf(cf, key.as_bytes(), value)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let cf = self.handle()?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbStorage::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_LOCAL_STORAGE).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_storage_round_trip() {
        let dir = tempdir().unwrap();
        let store = RocksDbStorage::open(dir.path()).unwrap();

        store.set("cart-storage", b"{}".to_vec()).await.unwrap();
        assert_eq!(
            store.get("cart-storage").await.unwrap(),
            Some(b"{}".to_vec())
        );

        store.remove("cart-storage").await.unwrap();
        assert!(store.get("cart-storage").await.unwrap().is_none());
    }
}
