//! The permission-management gate (C5): a thin wrapper around any
//! [`AccessControl`] implementation that locally short-circuits the
//! privilege/role-management operations instead of contacting the PDP.

use std::collections::HashSet;

use async_trait::async_trait;
use opa_trino_bridge_sdk::{denied, AccessControl, BridgeError, Grant, MinimalIdentity, Principal, QueryContext};

/// Wraps an inner [`AccessControl`] (a [`super::single::SingleDecisionAuthorizer`]
/// or a [`super::batch::BatchAuthorizer`]) and locally decides the ten
/// gated operations and the three always-allowed role-inspection
/// operations, leaving everything else to the inner authorizer.
#[derive(Debug, Clone)]
pub struct PermissionManagementGate<A> {
    inner: A,
    allow_permission_management_operations: bool,
}

impl<A> PermissionManagementGate<A>
where
    A: AccessControl,
{
    /// Wrap `inner`, gating the privilege/role operations on
    /// `allow_permission_management_operations`.
    #[must_use]
    pub const fn new(inner: A, allow_permission_management_operations: bool) -> Self {
        Self {
            inner,
            allow_permission_management_operations,
        }
    }

    fn gate(&self, denial: impl FnOnce() -> BridgeError) -> Result<(), BridgeError> {
        if self.allow_permission_management_operations {
            Ok(())
        } else {
            Err(denial())
        }
    }
}

#[async_trait]
impl<A> AccessControl for PermissionManagementGate<A>
where
    A: AccessControl,
{
    async fn check_can_execute_query(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.inner.check_can_execute_query(context).await
    }

    async fn check_can_view_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_view_query_owned_by(context, query_owner).await
    }

    async fn check_can_kill_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_kill_query_owned_by(context, query_owner).await
    }

    async fn filter_view_query_owned_by(
        &self,
        context: &QueryContext,
        owners: Vec<MinimalIdentity>,
    ) -> Result<Vec<MinimalIdentity>, BridgeError> {
        self.inner.filter_view_query_owned_by(context, owners).await
    }

    async fn check_can_read_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.inner.check_can_read_system_information(context).await
    }

    async fn check_can_write_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.inner.check_can_write_system_information(context).await
    }

    /// Always allowed, independent of both the gate and the PDP.
    async fn check_can_show_roles(&self, _context: &QueryContext) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Always allowed, independent of both the gate and the PDP.
    async fn check_can_show_current_roles(&self, _context: &QueryContext) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Always allowed, independent of both the gate and the PDP.
    async fn check_can_show_role_grants(&self, _context: &QueryContext) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn check_can_show_role_authorization_descriptors(
        &self,
        context: &QueryContext,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_role_authorization_descriptors(context).await
    }

    async fn check_can_impersonate_user(&self, context: &QueryContext, user_name: &str) -> Result<(), BridgeError> {
        self.inner.check_can_impersonate_user(context, user_name).await
    }

    async fn can_access_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<bool, BridgeError> {
        self.inner.can_access_catalog(context, catalog_name).await
    }

    async fn check_can_create_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.inner.check_can_create_catalog(context, catalog_name).await
    }

    async fn check_can_drop_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.inner.check_can_drop_catalog(context, catalog_name).await
    }

    async fn filter_catalogs(
        &self,
        context: &QueryContext,
        catalogs: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.inner.filter_catalogs(context, catalogs).await
    }

    async fn check_can_show_schemas(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.inner.check_can_show_schemas(context, catalog_name).await
    }

    async fn check_can_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_create_schema(context, catalog_name, schema_name, properties).await
    }

    async fn check_can_drop_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_schema(context, catalog_name, schema_name).await
    }

    async fn check_can_show_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_create_schema(context, catalog_name, schema_name).await
    }

    async fn check_can_show_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_tables(context, catalog_name, schema_name).await
    }

    async fn check_can_show_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_functions(context, catalog_name, schema_name).await
    }

    async fn filter_schemas(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schemas: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.inner.filter_schemas(context, catalog_name, schemas).await
    }

    async fn check_can_rename_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        new_schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_rename_schema(context, catalog_name, schema_name, new_schema_name).await
    }

    async fn check_can_set_schema_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_schema_authorization(context, catalog_name, schema_name, principal).await
    }

    async fn check_can_show_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_create_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_create_table(context, catalog_name, schema_name, table_name, properties).await
    }

    async fn check_can_drop_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_table_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_table_comment(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_view_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_view_comment(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_set_column_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_set_column_comment(context, catalog_name, schema_name, table_name, column_name)
            .await
    }

    async fn check_can_show_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_show_columns(context, catalog_name, schema_name, table_name).await
    }

    async fn filter_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.inner.filter_columns(context, catalog_name, schema_name, table_name, columns).await
    }

    async fn check_can_add_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_add_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_drop_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_alter_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_alter_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_rename_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_rename_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_table_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_table_properties(context, catalog_name, schema_name, table_name, properties).await
    }

    async fn check_can_insert_into_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_insert_into_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_delete_from_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_delete_from_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_truncate_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_truncate_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_update_table_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        update_columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_update_table_columns(context, catalog_name, schema_name, table_name, update_columns)
            .await
    }

    async fn check_can_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_select_from_columns(context, catalog_name, schema_name, table_name, columns).await
    }

    async fn check_can_create_view_with_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_create_view_with_select_from_columns(context, catalog_name, schema_name, table_name, columns)
            .await
    }

    async fn filter_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        tables: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.inner.filter_tables(context, catalog_name, schema_name, tables).await
    }

    async fn check_can_rename_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        new_table_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_rename_table(context, catalog_name, schema_name, table_name, new_table_name).await
    }

    async fn check_can_set_table_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_set_table_authorization(context, catalog_name, schema_name, table_name, principal)
            .await
    }

    async fn check_can_create_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_create_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_drop_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_create_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_create_materialized_view(context, catalog_name, schema_name, view_name, properties).await
    }

    async fn check_can_drop_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_materialized_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_refresh_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_refresh_materialized_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_set_materialized_view_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_set_materialized_view_properties(context, catalog_name, schema_name, view_name, properties)
            .await
    }

    async fn check_can_rename_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_rename_view(context, catalog_name, schema_name, view_name, new_view_name).await
    }

    async fn check_can_rename_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_rename_materialized_view(context, catalog_name, schema_name, view_name, new_view_name)
            .await
    }

    async fn check_can_set_view_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_view_authorization(context, catalog_name, schema_name, view_name, principal).await
    }

    async fn check_can_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_execute_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_create_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_create_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_drop_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_drop_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_create_view_with_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_create_view_with_execute_function(context, catalog_name, schema_name, function_name)
            .await
    }

    async fn check_can_execute_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_execute_procedure(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_execute_table_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_execute_table_procedure(context, catalog_name, schema_name, table_name, function_name)
            .await
    }

    async fn check_can_grant_execute_function_privilege(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError> {
        self.inner
            .check_can_grant_execute_function_privilege(context, catalog_name, schema_name, function_name, grantee, grant)
            .await
    }

    async fn filter_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        functions: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.inner.filter_functions(context, catalog_name, schema_name, functions).await
    }

    /// Gated: succeeds iff the permission-management flag is set; the PDP
    /// is never consulted.
    async fn check_can_create_role(
        &self,
        _context: &QueryContext,
        role_name: &str,
        _grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot_access_role(role_name))
    }

    async fn check_can_drop_role(&self, _context: &QueryContext, role_name: &str) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot_access_role(role_name))
    }

    async fn check_can_grant_roles(
        &self,
        _context: &QueryContext,
        roles: Vec<String>,
        _grantees: Vec<Principal>,
        _grant: Grant,
        _grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("grant roles {}", roles.join(", "))))
    }

    async fn check_can_revoke_roles(
        &self,
        _context: &QueryContext,
        roles: Vec<String>,
        _grantees: Vec<Principal>,
        _admin_option: bool,
        _grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("revoke roles {}", roles.join(", "))))
    }

    async fn check_can_set_system_session_property(
        &self,
        context: &QueryContext,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_system_session_property(context, property_name).await
    }

    async fn check_can_set_catalog_session_property(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        self.inner.check_can_set_catalog_session_property(context, catalog_name, property_name).await
    }

    async fn check_can_grant_schema_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        _grantee: &Principal,
        _grant: Grant,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("grant {privilege} on schema {catalog_name}.{schema_name}")))
    }

    async fn check_can_deny_schema_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        _grantee: &Principal,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("deny {privilege} on schema {catalog_name}.{schema_name}")))
    }

    async fn check_can_revoke_schema_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        _grantee: &Principal,
        _grant_option_for: bool,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("revoke {privilege} on schema {catalog_name}.{schema_name}")))
    }

    async fn check_can_grant_table_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        _grantee: &Principal,
        _grant: Grant,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("grant {privilege} on table {catalog_name}.{schema_name}.{table_name}")))
    }

    async fn check_can_deny_table_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        _grantee: &Principal,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("deny {privilege} on table {catalog_name}.{schema_name}.{table_name}")))
    }

    async fn check_can_revoke_table_privilege(
        &self,
        _context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        _grantee: &Principal,
        _grant_option_for: bool,
    ) -> Result<(), BridgeError> {
        self.gate(|| denied::cannot(format!("revoke {privilege} on table {catalog_name}.{schema_name}.{table_name}")))
    }
}
