//! The batch authorizer (C4): one HTTP call per filter callback, carrying
//! every candidate in an ordered `filterResources` list, instead of one
//! call per candidate.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use opa_trino_bridge_sdk::resource::{CatalogResource, FunctionResource, SchemaResource, TableResource};
use opa_trino_bridge_sdk::{
    Action, AccessControl, BridgeError, DecisionClient, Grant, InputDocument, MinimalIdentity, Operation, Principal,
    QueryContext, Resource,
};
use url::Url;

use super::single::SingleDecisionAuthorizer;

/// Implements [`AccessControl`] by delegating every non-filter callback to
/// an inner [`SingleDecisionAuthorizer`] and overriding the filter
/// callbacks to use one batched call against the configured batch URI.
#[derive(Debug, Clone)]
pub struct BatchAuthorizer {
    single: SingleDecisionAuthorizer,
    client: DecisionClient,
    batch_policy_uri: Url,
}

impl BatchAuthorizer {
    /// Build a batch authorizer. `single` handles every callback this type
    /// does not override.
    #[must_use]
    pub const fn new(single: SingleDecisionAuthorizer, client: DecisionClient, batch_policy_uri: Url) -> Self {
        Self {
            single,
            client,
            batch_policy_uri,
        }
    }

    /// Run the batch algorithm (§4.4): freeze `candidates` into an ordered
    /// list, send one `filterResources` request, and map the returned
    /// indices back onto the original candidates.
    async fn filter_batch<T: Clone>(
        &self,
        context: &QueryContext,
        operation: Operation,
        candidates: Vec<T>,
        to_resource: impl Fn(&T) -> Resource,
    ) -> Result<Vec<T>, BridgeError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let resources = candidates.iter().map(&to_resource).collect();
        let action = Action::filter(operation, resources);
        let document = InputDocument::new(context.clone(), action);
        let decision = self.client.decide_batch(&self.batch_policy_uri, &document).await?;

        let mut selected = Vec::new();
        for &index in decision.allowed_indices() {
            let item = candidates.get(index).ok_or_else(|| BridgeError::InternalInvariant {
                operation,
                detail: format!("batch decision referenced out-of-range index {index} of {}", candidates.len()),
            })?;
            selected.push(item.clone());
        }
        Ok(selected)
    }

    async fn filter_set<T>(
        &self,
        context: &QueryContext,
        operation: Operation,
        candidates: Vec<T>,
        to_resource: impl Fn(&T) -> Resource,
    ) -> Result<HashSet<T>, BridgeError>
    where
        T: Clone + std::hash::Hash + Eq,
    {
        Ok(self.filter_batch(context, operation, candidates, to_resource).await?.into_iter().collect())
    }
}

#[async_trait]
impl AccessControl for BatchAuthorizer {
    async fn check_can_execute_query(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_execute_query(context).await
    }

    async fn check_can_view_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        self.single.check_can_view_query_owned_by(context, query_owner).await
    }

    async fn check_can_kill_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        self.single.check_can_kill_query_owned_by(context, query_owner).await
    }

    /// Overridden (§4.4): the query-owner filter is the one batch callback
    /// that preserves input order rather than collecting into a set.
    async fn filter_view_query_owned_by(
        &self,
        context: &QueryContext,
        owners: Vec<MinimalIdentity>,
    ) -> Result<Vec<MinimalIdentity>, BridgeError> {
        self.filter_batch(context, Operation::FilterViewQueryOwnedBy, owners, |owner| {
            Resource::User(owner.clone())
        })
        .await
    }

    async fn check_can_read_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_read_system_information(context).await
    }

    async fn check_can_write_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_write_system_information(context).await
    }

    async fn check_can_show_roles(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_show_roles(context).await
    }

    async fn check_can_show_current_roles(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_show_current_roles(context).await
    }

    async fn check_can_show_role_grants(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.single.check_can_show_role_grants(context).await
    }

    async fn check_can_show_role_authorization_descriptors(
        &self,
        context: &QueryContext,
    ) -> Result<(), BridgeError> {
        self.single.check_can_show_role_authorization_descriptors(context).await
    }

    async fn check_can_impersonate_user(&self, context: &QueryContext, user_name: &str) -> Result<(), BridgeError> {
        self.single.check_can_impersonate_user(context, user_name).await
    }

    async fn can_access_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<bool, BridgeError> {
        self.single.can_access_catalog(context, catalog_name).await
    }

    async fn check_can_create_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.single.check_can_create_catalog(context, catalog_name).await
    }

    async fn check_can_drop_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.single.check_can_drop_catalog(context, catalog_name).await
    }

    /// Overridden (§4.4): one batched `filterResources` call instead of a
    /// per-catalog fan-out.
    async fn filter_catalogs(
        &self,
        context: &QueryContext,
        catalogs: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.filter_set(context, Operation::FilterCatalogs, catalogs, |name| {
            Resource::Catalog(CatalogResource { name: name.clone() })
        })
        .await
    }

    async fn check_can_show_schemas(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        self.single.check_can_show_schemas(context, catalog_name).await
    }

    async fn check_can_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_schema(context, catalog_name, schema_name, properties).await
    }

    async fn check_can_drop_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_schema(context, catalog_name, schema_name).await
    }

    async fn check_can_show_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_show_create_schema(context, catalog_name, schema_name).await
    }

    async fn check_can_show_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_show_tables(context, catalog_name, schema_name).await
    }

    async fn check_can_show_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_show_functions(context, catalog_name, schema_name).await
    }

    /// Overridden (§4.4): one batched `filterResources` call instead of a
    /// per-schema fan-out.
    async fn filter_schemas(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schemas: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let catalog_name = catalog_name.to_owned();
        self.filter_set(context, Operation::FilterSchemas, schemas, move |name| {
            Resource::Schema(SchemaResource::new(catalog_name.clone(), name.clone()))
        })
        .await
    }

    async fn check_can_rename_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        new_schema_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_rename_schema(context, catalog_name, schema_name, new_schema_name).await
    }

    async fn check_can_set_schema_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_schema_authorization(context, catalog_name, schema_name, principal).await
    }

    async fn check_can_show_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_show_create_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_table(context, catalog_name, schema_name, table_name, properties).await
    }

    async fn check_can_drop_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_table_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_table_comment(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_view_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_view_comment(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_set_column_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single.check_can_show_columns(context, catalog_name, schema_name, table_name).await
    }

    /// Overridden (§4.4 step 5): `filterColumns` is batched as a single
    /// `filterResources` entry carrying the whole column candidate set on
    /// one table resource; the returned indices select within that set,
    /// not across multiple resources.
    async fn filter_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        if columns.is_empty() {
            return Ok(HashSet::new());
        }

        let sorted_columns: BTreeSet<String> = columns.into_iter().collect();
        let table =
            TableResource::new(catalog_name, schema_name, table_name).with_columns(sorted_columns.clone());
        let action = Action::filter(Operation::FilterColumns, vec![Resource::Table(table)]);
        let document = InputDocument::new(context.clone(), action);
        let decision = self.client.decide_batch(&self.batch_policy_uri, &document).await?;

        let sorted_columns: Vec<String> = sorted_columns.into_iter().collect();
        let mut selected = HashSet::new();
        for &index in decision.allowed_indices() {
            let column = sorted_columns.get(index).ok_or_else(|| BridgeError::InternalInvariant {
                operation: Operation::FilterColumns,
                detail: format!(
                    "batch decision referenced out-of-range column index {index} of {}",
                    sorted_columns.len()
                ),
            })?;
            selected.insert(column.clone());
        }
        Ok(selected)
    }

    async fn check_can_add_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_add_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_drop_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_alter_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_alter_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_rename_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_rename_column(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_set_table_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_table_properties(context, catalog_name, schema_name, table_name, properties).await
    }

    async fn check_can_insert_into_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_insert_into_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_delete_from_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_delete_from_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_truncate_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_truncate_table(context, catalog_name, schema_name, table_name).await
    }

    async fn check_can_update_table_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        update_columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single.check_can_select_from_columns(context, catalog_name, schema_name, table_name, columns).await
    }

    async fn check_can_create_view_with_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_create_view_with_select_from_columns(context, catalog_name, schema_name, table_name, columns)
            .await
    }

    /// Overridden (§4.4): one batched `filterResources` call instead of a
    /// per-table fan-out.
    async fn filter_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        tables: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.filter_set(context, Operation::FilterTables, tables, move |name| {
            Resource::Table(TableResource::new(catalog_name.clone(), schema_name.clone(), name.clone()))
        })
        .await
    }

    async fn check_can_rename_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        new_table_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_rename_table(context, catalog_name, schema_name, table_name, new_table_name).await
    }

    async fn check_can_set_table_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_table_authorization(context, catalog_name, schema_name, table_name, principal).await
    }

    async fn check_can_create_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_drop_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_create_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_materialized_view(context, catalog_name, schema_name, view_name, properties).await
    }

    async fn check_can_drop_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_materialized_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_refresh_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_refresh_materialized_view(context, catalog_name, schema_name, view_name).await
    }

    async fn check_can_set_materialized_view_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<opa_trino_bridge_sdk::resource::Properties>,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single.check_can_rename_view(context, catalog_name, schema_name, view_name, new_view_name).await
    }

    async fn check_can_rename_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single.check_can_set_view_authorization(context, catalog_name, schema_name, view_name, principal).await
    }

    async fn check_can_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_execute_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_create_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_drop_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_drop_function(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_create_view_with_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single.check_can_execute_procedure(context, catalog_name, schema_name, function_name).await
    }

    async fn check_can_execute_table_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.single
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
        self.single
            .check_can_grant_execute_function_privilege(context, catalog_name, schema_name, function_name, grantee, grant)
            .await
    }

    /// Overridden (§4.4): one batched `filterResources` call instead of a
    /// per-function fan-out.
    async fn filter_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        functions: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.filter_set(context, Operation::FilterFunctions, functions, move |name| {
            Resource::Function(FunctionResource::new(catalog_name.clone(), schema_name.clone(), name.clone()))
        })
        .await
    }

    async fn check_can_create_role(
        &self,
        context: &QueryContext,
        role_name: &str,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_create_role(context, role_name, grantor).await
    }

    async fn check_can_drop_role(&self, context: &QueryContext, role_name: &str) -> Result<(), BridgeError> {
        self.single.check_can_drop_role(context, role_name).await
    }

    async fn check_can_grant_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        grant: Grant,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_grant_roles(context, roles, grantees, grant, grantor).await
    }

    async fn check_can_revoke_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        admin_option: bool,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        self.single.check_can_revoke_roles(context, roles, grantees, admin_option, grantor).await
    }

    async fn check_can_set_system_session_property(
        &self,
        context: &QueryContext,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_system_session_property(context, property_name).await
    }

    async fn check_can_set_catalog_session_property(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        self.single.check_can_set_catalog_session_property(context, catalog_name, property_name).await
    }

    async fn check_can_grant_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_grant_schema_privilege(context, privilege, catalog_name, schema_name, grantee, grant)
            .await
    }

    async fn check_can_deny_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
    ) -> Result<(), BridgeError> {
        self.single.check_can_deny_schema_privilege(context, privilege, catalog_name, schema_name, grantee).await
    }

    async fn check_can_revoke_schema_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        grantee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_revoke_schema_privilege(context, privilege, catalog_name, schema_name, grantee, grant_option_for)
            .await
    }

    async fn check_can_grant_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
        grant: Grant,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_grant_table_privilege(context, privilege, catalog_name, schema_name, table_name, grantee, grant)
            .await
    }

    async fn check_can_deny_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_deny_table_privilege(context, privilege, catalog_name, schema_name, table_name, grantee)
            .await
    }

    async fn check_can_revoke_table_privilege(
        &self,
        context: &QueryContext,
        privilege: &str,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        grantee: &Principal,
        grant_option_for: bool,
    ) -> Result<(), BridgeError> {
        self.single
            .check_can_revoke_table_privilege(
                context,
                privilege,
                catalog_name,
                schema_name,
                table_name,
                grantee,
                grant_option_for,
            )
            .await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use httpmock::MockServer;
    use opa_trino_bridge_sdk::FullIdentity;

    use super::*;

    fn context() -> QueryContext {
        QueryContext::new(FullIdentity::new("alice", vec![]))
    }

    fn authorizer(server: &MockServer) -> BatchAuthorizer {
        let client = DecisionClient::new(reqwest::Client::new());
        let single = SingleDecisionAuthorizer::new(client.clone(), server.url("/v1/data/trino/allow").parse().unwrap());
        BatchAuthorizer::new(single, client, server.url("/v1/data/trino/batch").parse().unwrap())
    }

    #[tokio::test]
    async fn filter_catalogs_sends_one_batched_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": [0, 2]}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer
            .filter_catalogs(&context(), vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])
            .await
            .unwrap();

        mock.assert_hits(1);
        assert_eq!(result, HashSet::from(["a".to_owned(), "c".to_owned()]));
    }

    #[tokio::test]
    async fn empty_candidates_make_no_http_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": []}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer.filter_catalogs(&context(), vec![]).await.unwrap();

        assert!(result.is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn out_of_range_index_aborts_with_internal_invariant() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": [5]}));
        });
        let authorizer = authorizer(&server);

        let err = authorizer
            .filter_catalogs(&context(), vec!["a".to_owned()])
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::InternalInvariant { .. }));
    }

    #[tokio::test]
    async fn duplicate_indices_are_idempotent_in_output_set() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": [0, 0]}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer
            .filter_catalogs(&context(), vec!["a".to_owned(), "b".to_owned()])
            .await
            .unwrap();

        assert_eq!(result, HashSet::from(["a".to_owned()]));
    }

    #[tokio::test]
    async fn filter_view_query_owned_by_preserves_input_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/batch");
            then.status(200).json_body(serde_json::json!({"result": [1, 0]}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer
            .filter_view_query_owned_by(
                &context(),
                vec![MinimalIdentity::new("bob", vec![]), MinimalIdentity::new("carol", vec![])],
            )
            .await
            .unwrap();

        assert_eq!(result, vec![MinimalIdentity::new("bob", vec![]), MinimalIdentity::new("carol", vec![])]);
    }

    #[tokio::test]
    async fn filter_columns_sends_single_resource_with_full_column_list() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/v1/data/trino/batch")
                .json_body_partial(serde_json::json!({
                    "input": {
                        "action": {
                            "filterResources": [
                                {"table": {"catalogName": "cat", "schemaName": "sch", "tableName": "tbl", "columns": ["c1", "c2"]}}
                            ]
                        }
                    }
                }).to_string());
            then.status(200).json_body(serde_json::json!({"result": [1]}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer
            .filter_columns(&context(), "cat", "sch", "tbl", vec!["c1".to_owned(), "c2".to_owned()])
            .await
            .unwrap();

        mock.assert_hits(1);
        assert_eq!(result, HashSet::from(["c2".to_owned()]));
    }

    #[tokio::test]
    async fn filter_columns_indexes_into_wire_order_not_caller_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/v1/data/trino/batch")
                .json_body_partial(serde_json::json!({
                    "input": {
                        "action": {
                            "filterResources": [
                                {"table": {"catalogName": "cat", "schemaName": "sch", "tableName": "tbl", "columns": ["c1", "c2"]}}
                            ]
                        }
                    }
                }).to_string());
            then.status(200).json_body(serde_json::json!({"result": [0]}));
        });
        let authorizer = authorizer(&server);

        let result = authorizer
            .filter_columns(&context(), "cat", "sch", "tbl", vec!["c2".to_owned(), "c1".to_owned()])
            .await
            .unwrap();

        mock.assert_hits(1);
        assert_eq!(result, HashSet::from(["c1".to_owned()]));
    }

    #[tokio::test]
    async fn non_filter_callbacks_delegate_to_single_decision_authorizer() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/v1/data/trino/allow");
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let authorizer = authorizer(&server);

        assert!(authorizer.check_can_execute_query(&context()).await.is_ok());
    }
}
