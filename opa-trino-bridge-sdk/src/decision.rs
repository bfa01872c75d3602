//! The two response shapes a policy decision point can return.
//!
//! Both wrap a single `result` key, matching the policy-engine convention of
//! omitting the key entirely when the referenced policy document is
//! undefined (as opposed to evaluating to `false`).

use serde::Deserialize;

/// The response to a single-decision call: `POST <policy_uri>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleDecision {
    result: Option<bool>,
}

impl SingleDecision {
    /// Build a decision directly, for tests and for synthesizing a verdict
    /// locally (e.g. the permission-management gate).
    #[must_use]
    pub const fn new(allow: bool) -> Self {
        Self { result: Some(allow) }
    }

    /// Whether the policy decision point granted access.
    ///
    /// A missing `result` key — the policy document was undefined — is
    /// treated as a denial, consistent with default-deny.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.result.unwrap_or(false)
    }
}

/// The response to a batch filter call: `POST <batch_policy_uri>`.
///
/// `result` carries the indices, into the request's `filterResources` list,
/// of the candidates the policy decision point allows.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchDecision {
    result: Option<Vec<usize>>,
}

impl BatchDecision {
    /// Build a decision directly, for tests.
    #[must_use]
    pub fn new(allowed_indices: Vec<usize>) -> Self {
        Self {
            result: Some(allowed_indices),
        }
    }

    /// The allowed indices, or an empty slice when the policy document was
    /// undefined.
    #[must_use]
    pub fn allowed_indices(&self) -> &[usize] {
        self.result.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn single_decision_missing_result_is_denied() {
        let decision: SingleDecision = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!decision.is_allowed());
    }

    #[test]
    fn single_decision_true_result_is_allowed() {
        let decision: SingleDecision =
            serde_json::from_value(serde_json::json!({"result": true})).unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn batch_decision_missing_result_has_no_allowed_indices() {
        let decision: BatchDecision = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(decision.allowed_indices().is_empty());
    }

    #[test]
    fn batch_decision_carries_allowed_indices_in_order() {
        let decision: BatchDecision =
            serde_json::from_value(serde_json::json!({"result": [0, 2]})).unwrap();
        assert_eq!(decision.allowed_indices(), &[0, 2]);
    }
}
