//! `input.action` and the top-level `InputDocument` envelope.

use serde::Serialize;

use crate::error::BridgeError;
use crate::identity::QueryContext;
use crate::operation::Operation;
use crate::resource::Resource;

/// Whether a [`Principal`] names a user or a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrincipalType {
    /// The principal is a user.
    User,
    /// The principal is a role.
    Role,
}

/// A grantee or grantor named in a grant/revoke action: `{ name, type }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// The principal's name.
    pub name: String,
    /// Whether the name refers to a user or a role.
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
}

impl Principal {
    /// Build a user principal.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal_type: PrincipalType::User,
        }
    }

    /// Build a role principal.
    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            principal_type: PrincipalType::Role,
        }
    }
}

/// The grant-specific fields carried by `GrantRoles`, `RevokeRoles` and the
/// table/schema privilege grant and revoke operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    /// The principals the privilege is granted to or revoked from.
    pub principals: Vec<Principal>,
    /// Whether the grantee may, in turn, grant the privilege to others.
    #[serde(rename = "grantOption", skip_serializing_if = "Option::is_none")]
    pub grant_option: Option<bool>,
    /// The privilege named, when the action is privilege-scoped rather
    /// than role-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privilege: Option<String>,
}

impl Grant {
    /// Build a grant over the given principals, with no grant-option flag
    /// or privilege name set.
    #[must_use]
    pub fn new(principals: Vec<Principal>) -> Self {
        Self {
            principals,
            grant_option: None,
            privilege: None,
        }
    }

    /// Replace the principals this grant covers.
    #[must_use]
    pub fn with_principals(mut self, principals: Vec<Principal>) -> Self {
        self.principals = principals;
        self
    }

    /// Set the grant-option flag.
    #[must_use]
    pub fn with_grant_option(mut self, grant_option: bool) -> Self {
        self.grant_option = Some(grant_option);
        self
    }

    /// Set the privilege name.
    #[must_use]
    pub fn with_privilege(mut self, privilege: impl Into<String>) -> Self {
        self.privilege = Some(privilege.into());
        self
    }
}

/// `input.action` — the operation under evaluation, plus whichever resource
/// fields that operation requires.
///
/// Only one of `resource` or `filter_resources` is ever populated for a
/// given action: the former for single-decision calls, the latter for
/// batch filter calls. [`Action::validate`] enforces this before the
/// document is sent.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    /// The operation under evaluation.
    pub operation: Operation,
    /// The resource the operation acts on, for single-decision actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    /// The destination resource, for rename and set-authorization
    /// operations.
    #[serde(rename = "targetResource", skip_serializing_if = "Option::is_none")]
    pub target_resource: Option<Resource>,
    /// The grantee(s) and grant details, for grant/revoke/deny operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grantee: Option<Grant>,
    /// The principal that performed the grant/revoke, when the caller
    /// supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grantor: Option<Principal>,
    /// The candidate resources, for batch filter actions.
    #[serde(rename = "filterResources", skip_serializing_if = "Option::is_none")]
    pub filter_resources: Option<Vec<Resource>>,
}

impl Action {
    /// Build a single-resource action.
    #[must_use]
    pub fn new(operation: Operation, resource: Option<Resource>) -> Self {
        Self {
            operation,
            resource,
            target_resource: None,
            grantee: None,
            grantor: None,
            filter_resources: None,
        }
    }

    /// Build a batch filter action over the given candidates.
    #[must_use]
    pub fn filter(operation: Operation, candidates: Vec<Resource>) -> Self {
        Self {
            operation,
            resource: None,
            target_resource: None,
            grantee: None,
            grantor: None,
            filter_resources: Some(candidates),
        }
    }

    /// Attach a target resource (rename/set-authorization operations).
    #[must_use]
    pub fn with_target_resource(mut self, target: Resource) -> Self {
        self.target_resource = Some(target);
        self
    }

    /// Attach a grant (grant/revoke/deny operations).
    #[must_use]
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grantee = Some(grant);
        self
    }

    /// Attach the principal that performed the grant/revoke.
    #[must_use]
    pub fn with_grantor(mut self, grantor: Principal) -> Self {
        self.grantor = Some(grantor);
        self
    }

    /// Validate that exactly one of `resource`/`filter_resources` is set for
    /// the action's kind, consistent with [`Operation::as_str`]'s single vs.
    /// batch protocols.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InternalInvariant`] if both or neither are
    /// populated.
    pub fn validate(&self) -> Result<(), BridgeError> {
        match (&self.resource, &self.filter_resources) {
            (Some(_), Some(_)) => Err(BridgeError::InternalInvariant {
                operation: self.operation,
                detail: "action carries both resource and filterResources".to_owned(),
            }),
            (None, None) if !self.operation.is_permission_management() => {
                Err(BridgeError::InternalInvariant {
                    operation: self.operation,
                    detail: "action carries neither resource nor filterResources".to_owned(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// `{ input: { context, action } }` — the complete document posted to the
/// policy decision point.
#[derive(Debug, Clone, Serialize)]
pub struct InputDocument {
    input: InputBody,
}

#[derive(Debug, Clone, Serialize)]
struct InputBody {
    context: QueryContext,
    action: Action,
}

impl InputDocument {
    /// Build an input document from a context and action.
    #[must_use]
    pub fn new(context: QueryContext, action: Action) -> Self {
        Self {
            input: InputBody { context, action },
        }
    }

    /// The action this document carries.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.input.action
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::identity::FullIdentity;
    use crate::resource::CatalogResource;

    #[test]
    fn single_resource_action_validates() {
        let action = Action::new(
            Operation::AccessCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: "cat".to_owned(),
            })),
        );
        assert!(action.validate().is_ok());
    }

    #[test]
    fn action_with_both_resource_and_filter_fails_validation() {
        let mut action = Action::new(
            Operation::AccessCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: "cat".to_owned(),
            })),
        );
        action.filter_resources = Some(vec![]);
        let err = action.validate().unwrap_err();
        assert!(matches!(err, BridgeError::InternalInvariant { .. }));
    }

    #[test]
    fn permission_management_action_may_carry_no_resource() {
        let action = Action::new(Operation::CreateRole, None);
        assert!(action.validate().is_ok());
    }

    #[test]
    fn document_wraps_action_under_input_envelope() {
        let context = QueryContext::new(FullIdentity::new("alice", vec![]));
        let action = Action::new(Operation::ExecuteQuery, None);
        let document = InputDocument::new(context, action);
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["input"]["action"]["operation"], "ExecuteQuery");
        assert_eq!(json["input"]["context"]["identity"]["user"], "alice");
    }

    #[test]
    fn filter_action_carries_candidates_under_filter_resources() {
        let action = Action::filter(
            Operation::FilterCatalogs,
            vec![Resource::Catalog(CatalogResource {
                name: "a".to_owned(),
            })],
        );
        let json = serde_json::to_value(&action).unwrap();
        assert!(!json.as_object().unwrap().contains_key("resource"));
        assert_eq!(json["filterResources"][0]["catalog"]["name"], "a");
    }

    #[test]
    fn principal_serializes_as_name_and_type() {
        let json = serde_json::to_value(Principal::user("alice")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "alice", "type": "USER"}));
        let json = serde_json::to_value(Principal::role("admin")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "admin", "type": "ROLE"}));
    }

    #[test]
    fn grant_carries_all_principals_and_optional_fields() {
        let grant = Grant::new(vec![Principal::user("alice"), Principal::user("bob")])
            .with_grant_option(true)
            .with_privilege("SELECT");
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["principals"].as_array().unwrap().len(), 2);
        assert_eq!(json["grantOption"], true);
        assert_eq!(json["privilege"], "SELECT");
    }

    #[test]
    fn grant_omits_unset_grant_option_and_privilege() {
        let grant = Grant::new(vec![Principal::user("alice")]);
        let json = serde_json::to_value(&grant).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("grantOption"));
        assert!(!obj.contains_key("privilege"));
    }

    #[test]
    fn action_carries_grantor_when_set_and_omits_it_otherwise() {
        let with_grantor = Action::new(Operation::CreateRole, None).with_grantor(Principal::user("alice"));
        let json = serde_json::to_value(&with_grantor).unwrap();
        assert_eq!(json["grantor"]["name"], "alice");

        let without_grantor = Action::new(Operation::CreateRole, None);
        let json = serde_json::to_value(&without_grantor).unwrap();
        assert!(!json.as_object().unwrap().contains_key("grantor"));
    }
}
