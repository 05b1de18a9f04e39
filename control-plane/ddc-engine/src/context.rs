use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::retry::ConflictRetry;

/// Everything one reconciliation of a (dataset, runtime) pair needs: the
/// store handle, the resource identity and the caller's cancellation token.
///
/// The dataset and its runtime share `name` and `namespace`.
pub struct EngineContext<S> {
    pub store: Arc<S>,
    pub name: String,
    pub namespace: String,
    pub engine_impl: String,
    /// UID of the owning dataset; read from the dataset when unset
    pub owner_dataset_uid: Option<String>,
    pub cancel: CancellationToken,
    pub retry: ConflictRetry,
}

impl<S> Clone for EngineContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            engine_impl: self.engine_impl.clone(),
            owner_dataset_uid: self.owner_dataset_uid.clone(),
            cancel: self.cancel.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl<S> EngineContext<S> {
    pub fn new(
        store: Arc<S>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        engine_impl: impl Into<String>,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            namespace: namespace.into(),
            engine_impl: engine_impl.into(),
            owner_dataset_uid: None,
            cancel: CancellationToken::new(),
            retry: ConflictRetry::default(),
        }
    }

    pub fn with_owner_dataset_uid(mut self, uid: impl Into<String>) -> Self {
        self.owner_dataset_uid = Some(uid.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_retry(mut self, retry: ConflictRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Checked before every external call.
    pub fn ensure_active(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}
