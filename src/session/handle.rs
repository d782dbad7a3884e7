//! Authenticated session handle

use super::executor::{QueryExecutor, QueryResponse};
use super::observer::{CallInfo, CallObserver};
use crate::error::{Error, Result};
use crate::query::QuerySpec;
use crate::record::RecordSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Session through which every query of a run is issued.
///
/// Failures of the underlying executor are reported as [`Error::Query`]
/// naming the schema.
pub struct Session {
    executor: Arc<dyn QueryExecutor>,
    observers: Vec<Arc<dyn CallObserver>>,
    calls: AtomicU64,
}

impl Session {
    /// Create a session without observers
    pub fn new(executor: impl QueryExecutor + 'static) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    /// Create a session around a shared executor
    pub fn from_arc(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            observers: Vec::new(),
            calls: AtomicU64::new(0),
        }
    }

    /// Register an observer
    #[must_use]
    pub fn with_observer(mut self, observer: impl CallObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Register a shared observer
    #[must_use]
    pub fn with_shared_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Number of calls issued so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Execute a query, notifying observers
    pub async fn execute(&self, spec: &QuerySpec) -> Result<QueryResponse> {
        let id = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let call = CallInfo { id, spec };

        for observer in &self.observers {
            observer.on_call(&call);
        }

        match self.executor.execute(spec).await {
            Ok(response) => {
                for observer in &self.observers {
                    observer.on_success(&call, &response);
                }
                Ok(response)
            }
            Err(e) => {
                let err = if matches!(e, Error::Query { .. }) {
                    e
                } else {
                    Error::query(&spec.schema, e.to_string())
                };
                for observer in &self.observers {
                    observer.on_failure(&call, &err);
                }
                Err(err)
            }
        }
    }

    /// Run a count query
    pub async fn count(&self, spec: &QuerySpec) -> Result<u64> {
        self.execute(spec)
            .await?
            .into_count()
            .map_err(|e| Error::query(&spec.schema, e.to_string()))
    }

    /// Run a select query for one page
    pub async fn select(&self, spec: &QuerySpec) -> Result<RecordSet> {
        self.execute(spec)
            .await?
            .into_records()
            .map_err(|e| Error::query(&spec.schema, e.to_string()))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("observers", &self.observers.len())
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}
