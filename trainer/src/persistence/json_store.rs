use super::PersistenceError;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::PathBuf;

/// A record stored as a single named JSON file.
pub trait Blob: Serialize + DeserializeOwned + Default {
    /// File stem, e.g. `"progress"` for `progress.json`.
    const NAME: &'static str;
}

/// Stores one `T` as `<dir>/<T::NAME>.json`.
#[derive(Debug)]
pub struct JsonBlobStore<T> {
    dir: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T: Blob> JsonBlobStore<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _phantom: PhantomData,
        }
    }

    pub fn ensure_dir(&self) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", T::NAME))
    }

    pub fn save(&self, data: &T) -> Result<(), PersistenceError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(self.file_path(), json)?;
        Ok(())
    }

    /// Load the blob. Returns None if it has never been saved.
    pub fn load(&self) -> Result<Option<T>, PersistenceError> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        let data = serde_json::from_str(&contents)?;
        Ok(Some(data))
    }

    /// Load the blob, falling back to `T::default()` when it is missing or
    /// cannot be read.
    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load {} from {:?}, using defaults: {}",
                    T::NAME,
                    self.file_path(),
                    e
                );
                T::default()
            }
        }
    }

    pub fn delete(&self) -> Result<(), PersistenceError> {
        let path = self.file_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    impl Blob for Counter {
        const NAME: &'static str = "counter";
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store: JsonBlobStore<Counter> = JsonBlobStore::new(tmp.path().join("nested"));

        assert!(store.load().unwrap().is_none());
        store.save(&Counter { value: 3 }).unwrap();
        assert_eq!(store.load().unwrap(), Some(Counter { value: 3 }));
        assert!(store.file_path().ends_with("counter.json"));

        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store: JsonBlobStore<Counter> = JsonBlobStore::new(tmp.path());
        std::fs::write(store.file_path(), "{ definitely not json").unwrap();

        assert!(matches!(store.load(), Err(PersistenceError::Json(_))));
        assert_eq!(store.load_or_default(), Counter::default());
    }
}
