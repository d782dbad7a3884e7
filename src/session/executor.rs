//! Remote query execution

use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::query::QuerySpec;
use crate::record::{decode_count, decode_records, RecordSet, ResponseFormat};
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

/// Query endpoint, relative to the server URL
pub const DEFAULT_QUERY_PATH: &str = "/xtk/queryDef/execute";

/// Result of one query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Result of a count query
    Count(u64),
    /// One page of a select query
    Records(RecordSet),
}

impl QueryResponse {
    /// Take the count, failing for a record page
    pub fn into_count(self) -> Result<u64> {
        match self {
            Self::Count(n) => Ok(n),
            Self::Records(_) => Err(Error::decode("Expected a count, got records")),
        }
    }

    /// Take the records, failing for a count
    pub fn into_records(self) -> Result<RecordSet> {
        match self {
            Self::Records(set) => Ok(set),
            Self::Count(_) => Err(Error::decode("Expected records, got a count")),
        }
    }
}

/// Executes query specifications against the remote server
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one query.
    ///
    /// Count queries yield [`QueryResponse::Count`], select queries
    /// [`QueryResponse::Records`].
    async fn execute(&self, spec: &QuerySpec) -> Result<QueryResponse>;
}

/// Executes queries by POSTing the JSON query definition to the server
#[derive(Debug)]
pub struct HttpQueryExecutor {
    client: HttpClient,
    query_path: String,
}

impl HttpQueryExecutor {
    /// Create an executor using the default query endpoint
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            query_path: DEFAULT_QUERY_PATH.to_string(),
        }
    }

    /// Use a different query endpoint
    #[must_use]
    pub fn with_query_path(mut self, path: impl Into<String>) -> Self {
        self.query_path = path.into();
        self
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
    async fn execute(&self, spec: &QuerySpec) -> Result<QueryResponse> {
        let request = RequestConfig::new()
            .header("Accept", "application/json, application/xml;q=0.9")
            .json(spec.to_json());

        let response = self
            .client
            .request_text(Method::POST, &self.query_path, request)
            .await?;

        let format = ResponseFormat::detect(response.content_type.as_deref(), &response.body);
        debug!(
            "{} on {} returned {} bytes ({:?})",
            spec.operation,
            spec.schema,
            response.body.len(),
            format
        );

        if spec.is_count() {
            Ok(QueryResponse::Count(decode_count(&response.body, format)?))
        } else {
            Ok(QueryResponse::Records(decode_records(&response.body, format)?))
        }
    }
}
