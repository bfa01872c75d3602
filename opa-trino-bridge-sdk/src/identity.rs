//! Caller identity, in its two wire shapes, and the request context.
//!
//! Two identity shapes exist on the wire: a **minimal** form (user, groups
//! only) used for filter targets and grantees, and a **full** form (adds
//! enabled roles, catalog roles, extra credentials and the underlying
//! principal) used for `context.identity`. Keeping them as distinct types
//! lets the compiler enforce which shape a given call site must use.

use std::collections::BTreeMap;

use serde::Serialize;

/// A role selected for a catalog: either a named role, `ALL`, or `NONE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE", tag = "type")]
pub enum SelectedRole {
    /// A specific named role is active.
    Role {
        /// The role name.
        role: String,
    },
    /// All enabled roles are active.
    All,
    /// No role is active.
    None,
}

/// The minimal identity shape: user name and group membership only.
///
/// Used for filter targets (`FilterViewQueryOwnedBy`) and grantees/grantors
/// that only need to be named, not fully described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinimalIdentity {
    /// The user name.
    pub user: String,
    /// Group membership. Emitted as an array even when empty.
    pub groups: Vec<String>,
}

impl MinimalIdentity {
    /// Build a minimal identity for the given user and groups.
    #[must_use]
    pub fn new(user: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            user: user.into(),
            groups,
        }
    }
}

/// The full identity shape carried in `context.identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullIdentity {
    /// The user name.
    pub user: String,
    /// Group membership. Emitted as an array even when empty.
    pub groups: Vec<String>,
    /// Roles enabled for the current statement. Emitted as an array even
    /// when empty.
    #[serde(rename = "enabledRoles")]
    pub enabled_roles: Vec<String>,
    /// Per-catalog selected roles. Omitted entirely when empty.
    #[serde(rename = "catalogRoles", skip_serializing_if = "BTreeMap::is_empty")]
    pub catalog_roles: BTreeMap<String, SelectedRole>,
    /// Extra credentials attached to the session. Omitted entirely when
    /// empty.
    #[serde(rename = "extraCredentials", skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_credentials: BTreeMap<String, String>,
    /// The underlying authenticated principal, when it differs from the
    /// mapped user name. Omitted entirely when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}

impl FullIdentity {
    /// Build a full identity with no roles, catalog roles, credentials, or
    /// principal.
    #[must_use]
    pub fn new(user: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            user: user.into(),
            groups,
            enabled_roles: Vec::new(),
            catalog_roles: BTreeMap::new(),
            extra_credentials: BTreeMap::new(),
            principal: None,
        }
    }

    /// Attach the underlying authenticated principal name.
    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Project this full identity down to its minimal shape.
    #[must_use]
    pub fn to_minimal(&self) -> MinimalIdentity {
        MinimalIdentity::new(self.user.clone(), self.groups.clone())
    }
}

/// The engine's software stack descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftwareStack {
    /// The engine version, or `"UNKNOWN"` when the host does not supply one.
    #[serde(rename = "trinoVersion")]
    pub trino_version: String,
}

impl Default for SoftwareStack {
    fn default() -> Self {
        Self {
            trino_version: "UNKNOWN".to_owned(),
        }
    }
}

/// `input.context` — the caller identity plus engine metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryContext {
    /// The full identity of the caller.
    pub identity: FullIdentity,
    /// The engine's software stack descriptor.
    #[serde(rename = "softwareStack")]
    pub software_stack: SoftwareStack,
}

impl QueryContext {
    /// Build a context from an identity, defaulting the engine version to
    /// `"UNKNOWN"`.
    #[must_use]
    pub fn new(identity: FullIdentity) -> Self {
        Self {
            identity,
            software_stack: SoftwareStack::default(),
        }
    }

    /// Build a context with an explicit engine version.
    #[must_use]
    pub fn with_version(identity: FullIdentity, trino_version: impl Into<String>) -> Self {
        Self {
            identity,
            software_stack: SoftwareStack {
                trino_version: trino_version.into(),
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn full_identity_omits_empty_maps() {
        let identity = FullIdentity::new("alice", vec!["admins".to_owned()]);
        let json = serde_json::to_value(&identity).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("catalogRoles"));
        assert!(!obj.contains_key("extraCredentials"));
        assert_eq!(obj["groups"], serde_json::json!(["admins"]));
    }

    #[test]
    fn full_identity_emits_empty_groups_as_array() {
        let identity = FullIdentity::new("bob", vec![]);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["groups"], serde_json::json!([]));
    }

    #[test]
    fn context_defaults_trino_version_to_unknown() {
        let ctx = QueryContext::new(FullIdentity::new("alice", vec![]));
        assert_eq!(ctx.software_stack.trino_version, "UNKNOWN");
    }

    #[test]
    fn minimal_identity_projection_drops_roles_and_credentials() {
        let mut full = FullIdentity::new("alice", vec!["g".to_owned()]);
        full.enabled_roles.push("admin".to_owned());
        let minimal = full.to_minimal();
        assert_eq!(minimal.user, "alice");
        assert_eq!(minimal.groups, vec!["g".to_owned()]);
    }

    #[test]
    fn full_identity_omits_principal_when_unset() {
        let identity = FullIdentity::new("alice", vec![]);
        let json = serde_json::to_value(&identity).unwrap();
        assert!(!json.as_object().unwrap().contains_key("principal"));
    }

    #[test]
    fn full_identity_emits_principal_when_set() {
        let identity = FullIdentity::new("alice", vec![]).with_principal("alice@EXAMPLE.COM");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["principal"], "alice@EXAMPLE.COM");
    }
}
