//! Content-addressed document store

use std::future::Future;
use std::time::Duration;

use folio_core::config::StorageConfig;
use folio_core::{Document, FolioError, FolioResult, Id};
use opendal::Operator;
use tracing::{debug, warn};

use crate::operator::{build_operator, storage_err, S3Credentials};

/// Put/get of [`Document`]s keyed by their content address.
///
/// Cheap to clone; clones share the underlying operator.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    op: Operator,
    prefix: String,
    put_timeout: Duration,
    get_timeout: Duration,
}

impl DocumentStore {
    pub fn new(op: Operator, prefix: impl Into<String>) -> Self {
        let defaults = StorageConfig::default();
        Self {
            op,
            prefix: prefix.into().trim_end_matches('/').to_string(),
            put_timeout: Duration::from_secs(defaults.put_timeout_secs),
            get_timeout: Duration::from_secs(defaults.get_timeout_secs),
        }
    }

    /// Build the operator and store from config.
    pub fn from_config(
        cfg: &StorageConfig,
        credentials: Option<&S3Credentials>,
    ) -> FolioResult<Self> {
        let op = build_operator(cfg, credentials)?;
        Ok(Self::new(op, cfg.prefix.as_str()).with_timeouts(
            Duration::from_secs(cfg.put_timeout_secs),
            Duration::from_secs(cfg.get_timeout_secs),
        ))
    }

    pub fn with_timeouts(mut self, put: Duration, get: Duration) -> Self {
        self.put_timeout = put;
        self.get_timeout = get;
        self
    }

    pub fn operator(&self) -> &Operator {
        &self.op
    }

    /// Storage path of a document: `{prefix}/documents/{hex}`
    pub fn path_for(&self, id: &Id) -> String {
        if self.prefix.is_empty() {
            format!("documents/{id}")
        } else {
            format!("{}/documents/{id}", self.prefix)
        }
    }

    /// Persist a document and return its content address.
    ///
    /// Writing the same document twice is harmless: the address and bytes
    /// are identical.
    pub async fn put(&self, doc: &Document) -> FolioResult<Id> {
        let bytes = doc.encode();
        let id = Id::of(&bytes);
        let path = self.path_for(&id);
        let len = bytes.len();

        with_timeout("put", self.put_timeout, self.op.write(&path, bytes))
            .await?
            .map_err(storage_err)?;

        debug!(kind = doc.type_name(), %id, bytes = len, "stored document");
        Ok(id)
    }

    /// Fetch a document by content address.
    ///
    /// Fails with `NotFound` if nothing is stored there, and with
    /// `AddressMismatch` if the stored bytes do not hash to `id`.
    pub async fn get(&self, id: &Id) -> FolioResult<Document> {
        let path = self.path_for(id);

        let buf = match with_timeout("get", self.get_timeout, self.op.read(&path)).await? {
            Ok(buf) => buf,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                return Err(FolioError::NotFound(*id))
            }
            Err(e) => return Err(storage_err(e)),
        };
        let bytes = buf.to_vec();

        let actual = Id::of(&bytes);
        if actual != *id {
            warn!(requested = %id, %actual, "stored bytes do not match address");
            return Err(FolioError::AddressMismatch {
                requested: *id,
                actual,
            });
        }

        let doc = Document::decode(&bytes)?;
        debug!(kind = doc.type_name(), %id, bytes = bytes.len(), "fetched document");
        Ok(doc)
    }
}

async fn with_timeout<F: Future>(op: &str, limit: Duration, fut: F) -> FolioResult<F::Output> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| FolioError::Storage(format!("{op} timed out after {limit:?}")))
}
