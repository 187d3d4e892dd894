//! Error types for tablechat.
//!
//! Each pipeline stage has its own error kind so the orchestrator can tag a
//! failure with the stage it came from. Nothing here carries a raw service
//! stack trace; the underlying message is enough for a user to decide
//! whether to rephrase the question.

use std::fmt;

use thiserror::Error;

/// Failures from the language-model service boundary.
///
/// Covers both pipeline calls (translation and explanation); the
/// orchestrator distinguishes the two by the stage it tags the error with.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced a response (DNS, connect, I/O).
    #[error("request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// The service answered but the completion text was empty.
    #[error("service returned an empty completion")]
    EmptyCompletion,
    /// The bounded per-call timeout expired.
    #[error("request timed out after {0}s")]
    Timeout(u64),
}

impl LlmError {
    /// Whether a single retry with backoff is worth attempting.
    ///
    /// Client-side rejections (4xx other than 429) and empty completions are
    /// not transient and never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) | LlmError::Timeout(_) => true,
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::EmptyCompletion => false,
        }
    }
}

/// Rejections from the query guard, in rule order. The first rule that
/// fails is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("query is empty")]
    Empty,
    #[error("query contains more than one statement")]
    MultipleStatements,
    #[error("only SELECT statements are allowed, found {0:?}")]
    NotReadOnly(String),
    #[error("query failed to parse: {0}")]
    Parse(String),
}

/// An engine-reported parse or runtime failure, carrying the underlying
/// SQLite message verbatim (e.g. "no such column: agee").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExecutionError(pub String);

impl From<rusqlite::Error> for ExecutionError {
    fn from(err: rusqlite::Error) -> Self {
        ExecutionError(err.to_string())
    }
}

/// The pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translate,
    Guard,
    Execute,
    Explain,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Translate => write!(f, "translation"),
            Stage::Guard => write!(f, "validation"),
            Stage::Execute => write!(f, "execution"),
            Stage::Explain => write!(f, "explanation"),
        }
    }
}

/// A single structured failure returned by the orchestrator.
///
/// Strictly forward pipeline: a failed stage short-circuits everything after
/// it, and the caller sees exactly one of these, never a partial result.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A question arrived before any dataset was loaded.
    #[error("no dataset loaded")]
    NoDataset,
    #[error("translation failed: {0}")]
    Translation(#[source] LlmError),
    #[error("validation failed: {0}")]
    Guard(#[source] GuardError),
    #[error("execution failed: {0}")]
    Execution(#[source] ExecutionError),
    #[error("explanation failed: {0}")]
    Explanation(#[source] LlmError),
}

impl PipelineError {
    /// The originating stage, if the failure came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::NoDataset => None,
            PipelineError::Translation(_) => Some(Stage::Translate),
            PipelineError::Guard(_) => Some(Stage::Guard),
            PipelineError::Execution(_) => Some(Stage::Execute),
            PipelineError::Explanation(_) => Some(Stage::Explain),
        }
    }
}
