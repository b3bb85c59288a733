use contracts::shared::autosave::SnapshotStorage;
use contracts::shared::error::StorageError;
use web_sys::window;

fn get_local_storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

/// `window.localStorage` as snapshot storage
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl SnapshotStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        get_local_storage()
            .ok_or(StorageError::Unavailable)?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        get_local_storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                message: format!("{:?}", e),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        get_local_storage()
            .ok_or(StorageError::Unavailable)?
            .remove_item(key)
            .map_err(|_| StorageError::Unavailable)
    }
}
