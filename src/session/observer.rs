//! Call observers

use super::executor::QueryResponse;
use crate::error::Error;
use crate::query::QuerySpec;

/// Identifies one call made through a session
#[derive(Debug, Clone, Copy)]
pub struct CallInfo<'a> {
    /// Sequence number of the call within the session, starting at 1
    pub id: u64,
    /// The query being executed
    pub spec: &'a QuerySpec,
}

/// Hook notified around every query issued through a [`Session`].
///
/// All methods default to doing nothing. Observers must not fail the call;
/// problems are logged and swallowed.
///
/// [`Session`]: super::Session
pub trait CallObserver: Send + Sync {
    /// Before the query is sent
    fn on_call(&self, _call: &CallInfo<'_>) {}

    /// After a successful response
    fn on_success(&self, _call: &CallInfo<'_>, _response: &QueryResponse) {}

    /// After a failed call
    fn on_failure(&self, _call: &CallInfo<'_>, _error: &Error) {}
}
