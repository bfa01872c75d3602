//! OPA Trino Bridge SDK
//!
//! This crate provides the canonical input-document schema and the HTTP
//! decision protocol shared by every authorizer in `opa-trino-bridge`:
//!
//! - [`Operation`] - the fixed catalog of PascalCase operation identifiers
//! - [`Identity`], [`QueryContext`] - caller identity, full and minimal shapes
//! - [`Resource`] - the tagged resource variants (catalog, schema, table, ...)
//! - [`Action`], [`InputDocument`] - the request document sent to the PDP
//! - [`SingleDecision`], [`BatchDecision`] - the two response shapes
//! - [`DecisionClient`] - the HTTP transport (C2)
//! - [`BridgeError`] - the error taxonomy shared across the bridge
//! - [`AccessControl`] - the host capability surface the bridge implements
//!
//! ## Usage
//!
//! ```ignore
//! use opa_trino_bridge_sdk::{DecisionClient, InputDocument};
//!
//! let client = DecisionClient::new(reqwest::Client::new(), false, false);
//! let document = InputDocument::new(context, action);
//! let decision = client.decide_single(&policy_uri, &document).await?;
//! ```

pub mod action;
pub mod capability;
pub mod client;
pub mod decision;
pub mod denied;
pub mod error;
pub mod identity;
pub mod operation;
pub mod resource;

pub use action::{Action, Grant, InputDocument, Principal};
pub use capability::AccessControl;
pub use client::DecisionClient;
pub use decision::{BatchDecision, SingleDecision};
pub use error::BridgeError;
pub use identity::{FullIdentity, MinimalIdentity, QueryContext, SelectedRole};
pub use operation::Operation;
pub use resource::Resource;
