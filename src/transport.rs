//! External collaborator seams
//!
//! The engine never performs I/O of its own. Sending a built request goes
//! through the [`Transport`] trait, and the one-shot meta-schema check of a
//! description goes through [`ConformanceChecker`]. Implementations live
//! outside this crate.

/// One outgoing request, fully built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    /// HTTP method name
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Value for the `Content-Type` header
    pub content_type: String,
    /// Serialized request body
    pub body: String,
}

/// Status/body pair produced by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub content: String,
}

/// How a transport send can fail
///
/// The two cases are deliberately distinct: an HTTP-level error response is
/// a perfectly valid call outcome and is handed back to the caller as data,
/// while a connection that produced no response at all is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The exchange failed but a response was captured (e.g. a 4xx/5xx);
    /// treated as a normal outcome
    WithResponse(TransportReply),
    /// No response could be obtained at all (connection-level failure);
    /// fatal
    NoResponse(String),
}

/// Transport adapter sending built requests
///
/// The adapter may apply its own timeout and cancellation policy; the
/// engine imposes none and never retries.
pub trait Transport {
    /// Send one request and return its status/body pair
    fn send(&self, request: WireRequest) -> Result<TransportReply, TransportFailure>;
}

/// One-shot conformance check of a description against its meta-schema
///
/// Runs before any resolution happens; a failure aborts loading.
pub trait ConformanceChecker {
    /// Check the raw description, returning the failure reason if it does
    /// not conform
    fn check(&self, description: &str) -> Result<(), String>;
}
