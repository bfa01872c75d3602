//! The host capability surface the bridge implements.
//!
//! Each `check_can_*` method returns `Ok(())` when the operation is allowed
//! and an [`BridgeError`] (typically [`BridgeError::AccessDenied`]) when it
//! is not. Each `filter_*` method returns the subset of its candidates the
//! caller may see, preserving input order.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::action::{Grant, Principal};
use crate::error::BridgeError;
use crate::identity::{MinimalIdentity, QueryContext};
use crate::resource::Properties;

/// The full set of authorization questions a host engine can ask.
///
/// Implementations live in `opa-trino-bridge` as thin adapters over a
/// [`DecisionClient`](crate::client::DecisionClient): one building a
/// single-decision [`InputDocument`](crate::action::InputDocument) per call,
/// the other batching filter candidates into one request.
#[async_trait]
pub trait AccessControl: Send + Sync {
    // -- No resource. --

    async fn check_can_execute_query(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_view_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError>;

    async fn check_can_kill_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError>;

    /// Restrict `owners` to those whose queries `context` may view.
    async fn filter_view_query_owned_by(
        &self,
        context: &QueryContext,
        owners: Vec<MinimalIdentity>,
    ) -> Result<Vec<MinimalIdentity>, BridgeError>;

    async fn check_can_read_system_information(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_write_system_information(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_show_roles(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_show_current_roles(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_show_role_grants(&self, context: &QueryContext) -> Result<(), BridgeError>;

    async fn check_can_show_role_authorization_descriptors(
        &self,
        context: &QueryContext,
    ) -> Result<(), BridgeError>;

    // -- User. --

    async fn check_can_impersonate_user(
        &self,
        context: &QueryContext,
        user_name: &str,
    ) -> Result<(), BridgeError>;

    // -- Catalog. --

    /// Whether `context` may access `catalog_name` at all. Unlike the other
    /// `check_can_*` methods this returns the verdict rather than failing,
    /// since the host treats catalog visibility as a query, not a gate.
    async fn can_access_catalog(
        &self,
        context: &QueryContext,
        catalog_name: &str,
    ) -> Result<bool, BridgeError>;

    async fn check_can_create_catalog(
        &self,
        context: &QueryContext,
        catalog_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_catalog(
        &self,
        context: &QueryContext,
        catalog_name: &str,
    ) -> Result<(), BridgeError>;

    /// Restrict `catalogs` to those `context` may see.
    async fn filter_catalogs(
        &self,
        context: &QueryContext,
        catalogs: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError>;

    async fn check_can_show_schemas(
        &self,
        context: &QueryContext,
        catalog_name: &str,
    ) -> Result<(), BridgeError>;

    // -- Schema. --

    async fn check_can_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_show_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_show_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_show_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError>;

    /// Restrict `schemas` within `catalog_name` to those `context` may see.
    async fn filter_schemas(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schemas: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError>;

    async fn check_can_rename_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        new_schema_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_schema_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError>;

    // -- Table / view (shared shape). --

    async fn check_can_show_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_table_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_view_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_column_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_show_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    /// Restrict `columns` of the named table to those `context` may see.
    async fn filter_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError>;

    async fn check_can_add_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_alter_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_rename_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_table_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError>;

    async fn check_can_insert_into_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_delete_from_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_truncate_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_update_table_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        update_columns: Vec<String>,
    ) -> Result<(), BridgeError>;

    async fn check_can_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError>;

    async fn check_can_create_view_with_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError>;

    /// Restrict `tables` within the named schema to those `context` may see.
    async fn filter_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        tables: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError>;

    async fn check_can_rename_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        new_table_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_table_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError>;

    // -- View. --

    async fn check_can_create_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_create_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_refresh_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_materialized_view_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError>;

    async fn check_can_rename_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_rename_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_view_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError>;

    // -- Function. --

    async fn check_can_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_create_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_create_view_with_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_execute_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_execute_table_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_grant_execute_function_privilege(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError>;

    /// Restrict `functions` within the named schema to those `context` may
    /// see.
    async fn filter_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        functions: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError>;

    // -- Role. --

    async fn check_can_create_role(
        &self,
        context: &QueryContext,
        role_name: &str,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError>;

    async fn check_can_drop_role(&self, context: &QueryContext, role_name: &str) -> Result<(), BridgeError>;

    async fn check_can_grant_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        grant: Grant,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError>;

    async fn check_can_revoke_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        admin_option: bool,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError>;

    // -- Session properties. --

    async fn check_can_set_system_session_property(
        &self,
        context: &QueryContext,
        property_name: &str,
    ) -> Result<(), BridgeError>;

    async fn check_can_set_catalog_session_property(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        property_name: &str,
    ) -> Result<(), BridgeError>;

    // -- Privilege management (gated, see the permission-management flag). --

    async fn check_can_grant_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError>;

    async fn check_can_deny_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
    ) -> Result<(), BridgeError>;

    async fn check_can_revoke_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), BridgeError>;

    async fn check_can_grant_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError>;

    async fn check_can_deny_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
    ) -> Result<(), BridgeError>;

    async fn check_can_revoke_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), BridgeError>;
}
