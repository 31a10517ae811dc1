//! Trait abstraction for the submission transport to enable mocking in tests

use super::{SubmissionResult, SubmitRequest};
use crate::error::SubmitError;
use async_trait::async_trait;

/// Sends a serialized form to its backend and decodes the JSON reply
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    /// Submit one request. Any HTTP status is accepted as long as the body
    /// decodes; network failures, timeouts and undecodable bodies are errors.
    async fn submit(&self, request: SubmitRequest) -> Result<SubmissionResult, SubmitError>;
}
