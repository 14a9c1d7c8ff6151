//! Filesystem-backed module source.
//!
//! Each module is a JSON document shaped like `{"default": {...}}` stored at the
//! resolved path, relative to a root directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{FetchError, ModuleExports, ModuleSource};
use crate::module::resolver::ResourcePath;

/// Reads module documents from disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &ResourcePath) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.as_str().trim_start_matches('/'));

        // Security: keep lookups inside the root
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::Failed {
                path: path.to_string(),
                reason: "path escapes module root".into(),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ModuleSource for FsSource {
    async fn import(&self, path: &ResourcePath) -> Result<ModuleExports, FetchError> {
        let file = self.locate(path)?;

        let content = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.to_string()));
            }
            Err(e) => {
                return Err(FetchError::Failed {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        log::debug!("Read {} bytes for {}", content.len(), path);

        serde_json::from_slice(&content).map_err(|e| FetchError::Failed {
            path: path.to_string(),
            reason: format!("invalid module document: {}", e),
        })
    }
}
