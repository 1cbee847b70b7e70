use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

pub const EVENT_COVER_DIR: &str = "images/events";
pub const PROJECT_IMAGE_DIR: &str = "images/projects";

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/storage";

const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0}")]
    Rejected(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), MediaError>;

    /// Removing a key that does not exist is not an error.
    async fn remove(&self, key: &str) -> Result<(), MediaError>;
}

/// Files under a root directory that is also served at [`PUBLIC_PREFIX`].
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !plain {
            return Err(MediaError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), MediaError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MediaError> {
        let path = self.resolve(key)?;
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An image received in a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accepts jpeg, png and gif by content type or, failing that, by extension.
    pub fn validate(&self) -> Result<(), MediaError> {
        if self.bytes.is_empty() {
            return Err(MediaError::Rejected("The uploaded image is empty".to_string()));
        }

        let by_type = self
            .content_type
            .as_deref()
            .map(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        let by_extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        if by_type || by_extension {
            Ok(())
        } else {
            Err(MediaError::Rejected(
                "The image must be a file of type: jpeg, png, jpg, gif".to_string(),
            ))
        }
    }
}

/// Storage key for an upload: `<dir>/<uuid>-<sanitized name>`.
pub fn object_key(dir: &str, original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');
    let sanitized = if sanitized.is_empty() { "upload" } else { sanitized };

    format!("{dir}/{}-{sanitized}", Uuid::new_v4().simple())
}

pub fn public_path(key: &str) -> String {
    format!("{PUBLIC_PREFIX}/{key}")
}
