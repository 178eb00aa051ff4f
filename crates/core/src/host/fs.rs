//! Local filesystem collaborator.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{HostError, LocalFiles, LocalReader};

/// Local files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFiles {
    root: PathBuf,
}

impl DirectoryFiles {
    /// Creates a collaborator rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, HostError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(HostError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl LocalFiles for DirectoryFiles {
    async fn open(&self, path: &str) -> Result<LocalReader, HostError> {
        let full = self.resolve(path)?;
        match tokio::fs::File::open(&full).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(HostError::FileNotFound(path.to_string()))
            }
            Err(e) => Err(HostError::Io(e)),
        }
    }
}
