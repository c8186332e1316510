//! Client for the CodDoc AI backend.
//!
//! `client` is the JSON transport, `endpoints` the typed operations, and
//! `types` the request/response shapes.

mod client;
mod endpoints;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use endpoints::{validate_code, ReviewsQuery, MAX_PAGE_LIMIT};
pub use error::{ApiError, Result};
pub use types::{
    AnalyzeRequest, AnalyzeResponse, Analysis, ClassDoc, CodeIssue, DocumentRequest,
    DocumentResponse, Documentation, FieldDoc, FunctionDoc, HealthResponse, LlmProvider,
    Pagination, Priority, ProvidersResponse, ReturnDoc, ReviewSummary, ReviewsListResponse,
    SecurityConcern, SecuritySeverity, Severity, Suggestion,
};
