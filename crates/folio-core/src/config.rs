use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FolioError, FolioResult};

/// Default bytes per page (2 MiB)
pub const DEFAULT_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Top-level client configuration (loaded from folio.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub pack: PackConfig,
    pub compression: CompressionConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl FolioConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> FolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| FolioError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FolioResult<()> {
        if self.pack.page_size == 0 {
            return Err(FolioError::Config("pack.page_size must be at least 1".into()));
        }
        if u32::try_from(self.pack.page_size).is_err() {
            return Err(FolioError::Config(format!(
                "pack.page_size {} exceeds u32::MAX",
                self.pack.page_size
            )));
        }
        match self.storage.backend.as_str() {
            "memory" | "fs" | "s3" => {}
            other => {
                return Err(FolioError::Config(format!(
                    "storage.backend must be memory, fs or s3 (got {other:?})"
                )))
            }
        }
        match self.log.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(FolioError::Config(format!(
                "log.format must be text or json (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Maximum compressed bytes carried by one page (default: 2 MiB)
    pub page_size: usize,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Which media types skip compression, and how hard to compress the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// zstd compression level (default: 3)
    pub zstd_level: i32,
    /// Media types whose content is already compressed
    pub skip_media_types: Vec<String>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            zstd_level: 3,
            skip_media_types: [
                "application/x-gzip",
                "application/gzip",
                "application/x-compressed",
                "application/x-zip-compressed",
                "application/zip",
                "application/pdf",
                "application/x-pdf",
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// "memory", "fs" or "s3"
    pub backend: String,
    /// Root directory for the fs backend
    pub root: Option<PathBuf>,
    /// S3 endpoint
    pub endpoint: String,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// Bucket name
    pub bucket: String,
    /// Key prefix under which documents are stored
    pub prefix: String,
    /// Timeout for a single document put, in seconds
    pub put_timeout_secs: u64,
    /// Timeout for a single document get, in seconds
    pub get_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".into(),
            root: None,
            endpoint: "http://localhost:8333".into(),
            region: "us-east-1".into(),
            bucket: "folio".into(),
            prefix: "folio".into(),
            put_timeout_secs: 5,
            get_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}
