//! OpenDAL Operator factory for folio storage backends

use folio_core::config::StorageConfig;
use folio_core::{FolioError, FolioResult};
use opendal::Operator;

/// S3 access credentials. Never part of the config file.
#[derive(Clone)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Credentials {
    /// Read `FOLIO_S3_ACCESS_KEY_ID` / `FOLIO_S3_SECRET_ACCESS_KEY`, falling
    /// back to the standard `AWS_*` variables.
    pub fn from_env() -> Option<Self> {
        let var = |folio: &str, aws: &str| {
            std::env::var(folio)
                .or_else(|_| std::env::var(aws))
                .ok()
        };
        Some(Self {
            access_key_id: var("FOLIO_S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID")?,
            secret_access_key: var("FOLIO_S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY")?,
        })
    }
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Build an Operator for the configured backend.
///
/// `memory` and `fs` need no credentials. For `s3`, path-style addressing
/// (the opendal 0.55 default) is used so SeaweedFS and MinIO work; when no
/// credentials are given, opendal's own environment/profile loading applies.
pub fn build_operator(
    cfg: &StorageConfig,
    credentials: Option<&S3Credentials>,
) -> FolioResult<Operator> {
    let op = match cfg.backend.as_str() {
        "memory" => Operator::new(opendal::services::Memory::default())
            .map_err(storage_err)?
            .finish(),
        "fs" => {
            let root = cfg
                .root
                .as_ref()
                .ok_or_else(|| FolioError::Config("storage.root is required for fs".into()))?;
            let builder = opendal::services::Fs::default().root(&root.to_string_lossy());
            Operator::new(builder).map_err(storage_err)?.finish()
        }
        "s3" => {
            if cfg.endpoint.starts_with("http://") {
                tracing::warn!(
                    endpoint = %cfg.endpoint,
                    "S3 endpoint uses plaintext HTTP; credentials are transmitted unencrypted"
                );
            }
            let mut builder = opendal::services::S3::default()
                .endpoint(&cfg.endpoint)
                .region(&cfg.region)
                .bucket(&cfg.bucket);
            if let Some(creds) = credentials {
                builder = builder
                    .access_key_id(&creds.access_key_id)
                    .secret_access_key(&creds.secret_access_key);
            }
            Operator::new(builder).map_err(storage_err)?.finish()
        }
        other => {
            return Err(FolioError::Config(format!(
                "unknown storage backend {other:?}"
            )))
        }
    };

    Ok(op
        .layer(opendal::layers::LoggingLayer::default())
        .layer(
            opendal::layers::RetryLayer::new()
                .with_max_times(5)
                .with_jitter(),
        ))
}

pub(crate) fn storage_err(e: opendal::Error) -> FolioError {
    FolioError::Storage(e.to_string())
}
