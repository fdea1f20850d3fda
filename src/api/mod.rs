//! Assessment backend client.
//!
//! Typed wrappers for every REST endpoint the flow consumes. All requests
//! carry the bearer token from the shared [`SessionStore`](crate::session::SessionStore);
//! a 401 from any endpoint clears that store.

mod client;
mod types;

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;

pub use client::ApiClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::ApiResult;

/// The endpoints the polling pages depend on.
///
/// Implemented by [`ApiClient`]; the poller and page are written against
/// this trait so they can run against a mock backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// `GET /recommendations/status/{session_id}`
    async fn pipeline_status(&self, session_id: &str) -> ApiResult<StatusResponse>;

    /// `GET /followup-questions?session_id=...`; `None` when the body is null
    async fn followup_questions(&self, session_id: &str)
        -> ApiResult<Option<Vec<QuestionRecord>>>;

    /// `POST /followup-responses`
    async fn submit_followup_responses(&self, records: &[SubmissionRecord]) -> ApiResult<()>;
}
