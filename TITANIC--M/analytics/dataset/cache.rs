use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::OnceCell;

use super::{
    loader::{load_passengers, DatasetError},
    record::PassengerTable,
};

/// Session-lifetime cache for the passenger table.
///
/// The first successful [`DatasetCache::get`] reads the file; every later call
/// hands out the same table. There is no invalidation: the source file is
/// treated as immutable for the session. A failed load leaves the cache empty.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    table: OnceCell<Arc<PassengerTable>>,
}

impl DatasetCache {
    /// Creates an empty cache for the dataset at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceCell::new(),
        }
    }

    /// Creates a cache already holding `table`.
    #[must_use]
    pub fn preloaded(table: PassengerTable) -> Self {
        let path = table.source().to_path_buf();
        Self {
            path,
            table: OnceCell::with_value(Arc::new(table)),
        }
    }

    /// Returns the cached table, loading it on first use.
    pub fn get(&self) -> Result<Arc<PassengerTable>, DatasetError> {
        self.table
            .get_or_try_init(|| load_passengers(&self.path).map(Arc::new))
            .map(Arc::clone)
    }

    /// Whether the table has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Dataset path backing the cache.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loading_twice_returns_identical_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.csv");
        fs::write(
            &path,
            "Survived,Pclass,Sex,Age\n1,1,female,38\n0,3,male,22\n0,3,male,\n",
        )
        .unwrap();

        let cache = DatasetCache::new(&path);
        assert!(!cache.is_loaded());
        let first = cache.get().unwrap();
        // Changing the file must not affect the cached session view.
        fs::write(&path, "Survived,Pclass,Sex,Age\n1,2,female,5\n").unwrap();
        let second = cache.get().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(second.len(), 2);
        assert!(cache.is_loaded());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let cache = DatasetCache::new(&path);
        assert!(matches!(cache.get(), Err(DatasetError::Io { .. })));
        assert!(!cache.is_loaded());

        fs::write(&path, "Survived,Pclass,Sex,Age\n1,1,female,38\n").unwrap();
        assert_eq!(cache.get().unwrap().len(), 1);
    }
}
