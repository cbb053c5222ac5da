use super::error::InfrastructureError;
use crate::domain::image_store::ImageStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

// 1 キー = 1 ファイル. キーは UUID のみ受け付ける (パス操作の防止)
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, InfrastructureError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(InfrastructureError::IoError)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        Uuid::parse_str(key)
            .ok()
            .map(|id| self.root.join(id.hyphenated().to_string()))
    }
}

#[async_trait]
impl ImageStore for LocalFileStorage {
    async fn put(&self, bytes: Vec<u8>) -> Result<String, InfrastructureError> {
        let key = Uuid::new_v4().hyphenated().to_string();
        let mut file = File::create(self.root.join(&key)).await.map_err(InfrastructureError::IoError)?;
        file.write_all(&bytes).await.map_err(InfrastructureError::IoError)?;
        file.flush().await.map_err(InfrastructureError::IoError)?;
        log::debug!("Stored {} bytes at {}", bytes.len(), self.root.join(&key).display());
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, InfrastructureError> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InfrastructureError::IoError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("background-studio-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = scratch_dir();
        let storage = LocalFileStorage::new(&dir).await.unwrap();

        let key = storage.put(vec![1, 2, 3]).await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), Some(vec![1, 2, 3]));
        assert!(dir.join(&key).exists());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_keys_are_absent() {
        let dir = scratch_dir();
        let storage = LocalFileStorage::new(&dir).await.unwrap();

        let unknown = Uuid::new_v4().to_string();
        assert_eq!(storage.get(&unknown).await.unwrap(), None);
        assert_eq!(storage.get("../../etc/passwd").await.unwrap(), None);
        assert_eq!(storage.get("").await.unwrap(), None);

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
