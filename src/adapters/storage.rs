use crate::domain::ports::Storage;
use crate::utils::error::{RulesetError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        let write_error = |source: std::io::Error| RulesetError::WriteError {
            path: full_path.display().to_string(),
            source,
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        tokio::fs::write(&full_path, data).await.map_err(write_error)?;
        Ok(())
    }

    fn full_path(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("generated");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("List/a.conf", b"old\n").await.unwrap();
        storage.write_file("List/a.conf", b"new\n").await.unwrap();

        let data = std::fs::read(base.join("List/a.conf")).unwrap();
        assert_eq!(data, b"new\n");
        assert!(storage.full_path("List/a.conf").ends_with("a.conf"));
    }

    #[tokio::test]
    async fn test_write_into_file_path_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let storage = LocalStorage::new(blocker.to_str().unwrap().to_string());
        let err = storage.write_file("out.conf", b"x").await.unwrap_err();

        assert!(matches!(err, RulesetError::WriteError { .. }));
    }
}
