//! OPA Trino Bridge
//!
//! Intercepts a distributed SQL query engine's security callbacks and
//! delegates every verdict to an external HTTP policy decision point,
//! modeled on Trino's OPA access-control plugin.
//!
//! - [`config::BridgeConfig`] - parses the flat `opa.*` property map
//! - [`authorizer::SingleDecisionAuthorizer`] - one HTTP call per callback (C3)
//! - [`authorizer::BatchAuthorizer`] - one batched call per filter callback (C4)
//! - [`authorizer::PermissionManagementGate`] - locally gates privilege/role ops (C5)
//! - [`factory::BridgeFactory`] - the plugin entry point (C6)
//!
//! ## Usage
//!
//! ```ignore
//! use std::collections::HashMap;
//! use opa_trino_bridge::factory::BridgeFactory;
//!
//! let mut properties = HashMap::new();
//! properties.insert("opa.policy.uri".to_owned(), "https://pdp/v1/data/trino/allow".to_owned());
//! let access_control = BridgeFactory::create(&properties)?;
//! # Ok::<(), opa_trino_bridge_sdk::BridgeError>(())
//! ```

pub mod authorizer;
pub mod config;
pub mod factory;

pub use authorizer::{BatchAuthorizer, PermissionManagementGate, SingleDecisionAuthorizer};
pub use config::{BridgeConfig, HttpClientConfig};
pub use factory::BridgeFactory;
pub use opa_trino_bridge_sdk::{
    Action, AccessControl, BridgeError, DecisionClient, FullIdentity, Grant, InputDocument, MinimalIdentity,
    Operation, Principal, QueryContext, Resource, SelectedRole,
};
