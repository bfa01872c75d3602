//! The error taxonomy shared by every authorizer and by the HTTP transport.

use thiserror::Error;

use crate::operation::Operation;

/// Errors the bridge can raise while answering an authorization question.
///
/// `AccessDenied` is the only variant an [`AccessControl`](crate::AccessControl)
/// implementation is expected to map to a plain "no" for boolean-style checks;
/// every other variant represents a failure to obtain a verdict at all and
/// should propagate up as a query failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// The policy decision point returned a negative verdict, optionally with
    /// a human-readable reason.
    #[error("access denied: {reason}")]
    AccessDenied {
        /// Why access was denied, as supplied by the policy or synthesized
        /// locally (see [`crate::denied`]).
        reason: String,
    },

    /// The HTTP call to the policy decision point failed outright (network
    /// error, timeout, connection refused).
    #[error("query to policy decision point failed for operation {operation}: {source}")]
    QueryFailed {
        /// The operation being evaluated when the failure occurred.
        operation: Operation,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured policy document path does not exist at the decision
    /// point (HTTP 404).
    #[error("policy not found at configured URI for operation {operation}")]
    PolicyNotFound {
        /// The operation being evaluated.
        operation: Operation,
    },

    /// The policy decision point returned a server error (HTTP 5xx).
    #[error("policy decision point returned server error {status} for operation {operation}")]
    PdpServerError {
        /// The operation being evaluated.
        operation: Operation,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The bridge failed to serialize the outgoing input document.
    #[error("failed to serialize input document for operation {operation}: {source}")]
    SerializeFailed {
        /// The operation being evaluated.
        operation: Operation,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The bridge failed to deserialize the policy decision point's response.
    #[error("failed to deserialize decision for operation {operation}: {source}")]
    DeserializeFailed {
        /// The operation being evaluated.
        operation: Operation,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A batch decision response referenced an index outside the request's
    /// candidate list, or otherwise violated an invariant the bridge relies
    /// on to trust the policy decision point's reply.
    #[error("internal invariant violated for operation {operation}: {detail}")]
    InternalInvariant {
        /// The operation being evaluated.
        operation: Operation,
        /// What invariant was violated.
        detail: String,
    },

    /// The bridge's own configuration was invalid or incomplete.
    #[error("invalid bridge configuration: {detail}")]
    Config {
        /// What was wrong with the configuration.
        detail: String,
    },
}

impl BridgeError {
    /// Build an [`BridgeError::AccessDenied`] with the given reason.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Whether this error represents a negative authorization verdict, as
    /// opposed to a failure to obtain one.
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn denied_constructs_access_denied_variant() {
        let err = BridgeError::denied("no grant for catalog");
        assert!(err.is_access_denied());
        assert_eq!(err.to_string(), "access denied: no grant for catalog");
    }

    #[test]
    fn non_denied_variant_reports_false() {
        let err = BridgeError::Config {
            detail: "missing policy uri".to_owned(),
        };
        assert!(!err.is_access_denied());
    }
}
