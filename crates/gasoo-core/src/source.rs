//! The async seam between the reading service and where readings live.

use async_trait::async_trait;
use tokio::sync::Mutex;

use gasoo_store::ReadingStore;
use gasoo_types::Reading;

use crate::client::{ServiceClient, ServiceClientError};

/// Errors a [`ReadingSource`] can report.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The remote API failed or could not be reached.
    #[error(transparent)]
    Client(#[from] ServiceClientError),

    /// A local store failed.
    #[error(transparent)]
    Store(#[from] gasoo_store::Error),

    /// The source is unavailable for another reason.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Something readings can be fetched from and written to.
///
/// Each method makes exactly one attempt; retry policy (if any) belongs to
/// the caller.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// The newest reading, or `None` when nothing is stored.
    async fn latest(&self) -> Result<Option<Reading>, SourceError>;

    /// At most `limit` readings, newest first.
    async fn readings(&self, limit: u32) -> Result<Vec<Reading>, SourceError>;

    /// Store a reading and return it as stored.
    async fn add(&self, level: f64) -> Result<Reading, SourceError>;
}

#[async_trait]
impl ReadingSource for ServiceClient {
    async fn latest(&self) -> Result<Option<Reading>, SourceError> {
        Ok(self.latest_reading().await?)
    }

    async fn readings(&self, limit: u32) -> Result<Vec<Reading>, SourceError> {
        Ok(ServiceClient::readings(self, limit).await?)
    }

    async fn add(&self, level: f64) -> Result<Reading, SourceError> {
        Ok(self.add_reading(level).await?)
    }
}

/// Exposes a local [`ReadingStore`] as a [`ReadingSource`].
///
/// The store is guarded by an async mutex; each call holds it only for the
/// duration of one store operation.
pub struct LocalSource<S> {
    store: Mutex<S>,
}

impl<S: ReadingStore> LocalSource<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.store.into_inner()
    }
}

#[async_trait]
impl<S: ReadingStore> ReadingSource for LocalSource<S> {
    async fn latest(&self) -> Result<Option<Reading>, SourceError> {
        Ok(self.store.lock().await.latest()?)
    }

    async fn readings(&self, limit: u32) -> Result<Vec<Reading>, SourceError> {
        Ok(self.store.lock().await.list(limit)?)
    }

    async fn add(&self, level: f64) -> Result<Reading, SourceError> {
        Ok(self.store.lock().await.insert(level)?)
    }
}
