//! The single-decision authorizer (C3): one HTTP call per callback, with
//! parallel fan-out for the filter callbacks.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use opa_trino_bridge_sdk::resource::{
    CatalogResource, CatalogSessionPropertyResource, FunctionResource, Properties, RoleEntry, RoleResource,
    SchemaResource, SystemSessionPropertyResource, TableResource,
};
use opa_trino_bridge_sdk::{
    denied, Action, AccessControl, BridgeError, DecisionClient, Grant, InputDocument, MinimalIdentity, Operation,
    Principal, QueryContext, Resource,
};
use url::Url;

/// Implements [`AccessControl`] by sending one [`InputDocument`] per
/// callback to a single configured policy URI.
#[derive(Debug, Clone)]
pub struct SingleDecisionAuthorizer {
    client: DecisionClient,
    policy_uri: Url,
}

impl SingleDecisionAuthorizer {
    /// Build an authorizer that posts every decision to `policy_uri`.
    #[must_use]
    pub const fn new(client: DecisionClient, policy_uri: Url) -> Self {
        Self { client, policy_uri }
    }

    async fn decide(&self, context: &QueryContext, action: Action) -> Result<bool, BridgeError> {
        let document = InputDocument::new(context.clone(), action);
        let decision = self.client.decide_single(&self.policy_uri, &document).await?;
        Ok(decision.is_allowed())
    }

    async fn check(
        &self,
        context: &QueryContext,
        operation: Operation,
        resource: Option<Resource>,
        denial: impl Fn() -> BridgeError,
    ) -> Result<(), BridgeError> {
        let action = Action::new(operation, resource);
        if self.decide(context, action).await? {
            Ok(())
        } else {
            Err(denial())
        }
    }

    async fn check_action(
        &self,
        context: &QueryContext,
        action: Action,
        denial: impl Fn() -> BridgeError,
    ) -> Result<(), BridgeError> {
        if self.decide(context, action).await? {
            Ok(())
        } else {
            Err(denial())
        }
    }

    /// Fan out one HTTP call per candidate, unordered, and collect the
    /// allowed subset into a `HashSet`.
    async fn filter<T>(
        &self,
        context: &QueryContext,
        operation: Operation,
        candidates: Vec<T>,
        to_resource: impl Fn(&T) -> Resource,
    ) -> Result<HashSet<T>, BridgeError>
    where
        T: std::hash::Hash + Eq,
    {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut in_flight = FuturesUnordered::new();
        for item in candidates {
            let resource = to_resource(&item);
            let action = Action::new(operation, Some(resource));
            let document = InputDocument::new(context.clone(), action);
            let client = self.client.clone();
            let uri = self.policy_uri.clone();
            in_flight.push(async move {
                let decision = client.decide_single(&uri, &document).await?;
                Ok::<_, BridgeError>((item, decision.is_allowed()))
            });
        }

        let mut allowed = HashSet::new();
        while let Some(result) = in_flight.next().await {
            let (item, is_allowed) = result?;
            if is_allowed {
                allowed.insert(item);
            }
        }
        Ok(allowed)
    }

    /// Fan out one HTTP call per candidate, preserving input order in the
    /// result (used only by the query-owner filter, which returns a
    /// collection rather than a set).
    async fn filter_ordered<T>(
        &self,
        context: &QueryContext,
        operation: Operation,
        candidates: Vec<T>,
        to_resource: impl Fn(&T) -> Resource,
    ) -> Result<Vec<T>, BridgeError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut in_flight = FuturesUnordered::new();
        for (index, item) in candidates.into_iter().enumerate() {
            let resource = to_resource(&item);
            let action = Action::new(operation, Some(resource));
            let document = InputDocument::new(context.clone(), action);
            let client = self.client.clone();
            let uri = self.policy_uri.clone();
            in_flight.push(async move {
                let decision = client.decide_single(&uri, &document).await?;
                Ok::<_, BridgeError>((index, item, decision.is_allowed()))
            });
        }

        let mut results = Vec::new();
        while let Some(result) = in_flight.next().await {
            results.push(result?);
        }
        results.sort_by_key(|(index, _, _)| *index);
        Ok(results
            .into_iter()
            .filter_map(|(_, item, is_allowed)| is_allowed.then_some(item))
            .collect())
    }
}

#[async_trait]
impl AccessControl for SingleDecisionAuthorizer {
    async fn check_can_execute_query(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::ExecuteQuery, None, || denied::cannot("execute query"))
            .await
    }

    async fn check_can_view_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        let owner = query_owner.clone();
        self.check(
            context,
            Operation::ViewQueryOwnedBy,
            Some(Resource::User(query_owner.clone())),
            move || denied::cannot(format!("view query owned by {}", owner.user)),
        )
        .await
    }

    async fn check_can_kill_query_owned_by(
        &self,
        context: &QueryContext,
        query_owner: &MinimalIdentity,
    ) -> Result<(), BridgeError> {
        let owner = query_owner.clone();
        self.check(
            context,
            Operation::KillQueryOwnedBy,
            Some(Resource::User(query_owner.clone())),
            move || denied::cannot(format!("kill query owned by {}", owner.user)),
        )
        .await
    }

    async fn filter_view_query_owned_by(
        &self,
        context: &QueryContext,
        owners: Vec<MinimalIdentity>,
    ) -> Result<Vec<MinimalIdentity>, BridgeError> {
        self.filter_ordered(context, Operation::FilterViewQueryOwnedBy, owners, |owner| {
            Resource::User(owner.clone())
        })
        .await
    }

    async fn check_can_read_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::ReadSystemInformation, None, || {
            denied::cannot("read system information")
        })
        .await
    }

    async fn check_can_write_system_information(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::WriteSystemInformation, None, || {
            denied::cannot("write system information")
        })
        .await
    }

    async fn check_can_show_roles(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::ShowRoles, None, || denied::cannot("show roles"))
            .await
    }

    async fn check_can_show_current_roles(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::ShowCurrentRoles, None, || denied::cannot("show current roles"))
            .await
    }

    async fn check_can_show_role_grants(&self, context: &QueryContext) -> Result<(), BridgeError> {
        self.check(context, Operation::ShowRoleGrants, None, || denied::cannot("show role grants"))
            .await
    }

    async fn check_can_show_role_authorization_descriptors(
        &self,
        context: &QueryContext,
    ) -> Result<(), BridgeError> {
        self.check(context, Operation::ShowRoleAuthorizationDescriptors, None, || {
            denied::cannot("show role authorization descriptors")
        })
        .await
    }

    async fn check_can_impersonate_user(&self, context: &QueryContext, user_name: &str) -> Result<(), BridgeError> {
        let user_name = user_name.to_owned();
        self.check(
            context,
            Operation::ImpersonateUser,
            Some(Resource::User(MinimalIdentity::new(user_name.clone(), vec![]))),
            move || denied::cannot_impersonate_user(&user_name),
        )
        .await
    }

    async fn can_access_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<bool, BridgeError> {
        let action = Action::new(
            Operation::AccessCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: catalog_name.to_owned(),
            })),
        );
        self.decide(context, action).await
    }

    async fn check_can_create_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        let catalog_name = catalog_name.to_owned();
        self.check(
            context,
            Operation::CreateCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: catalog_name.clone(),
            })),
            move || denied::cannot_access_catalog(&catalog_name),
        )
        .await
    }

    async fn check_can_drop_catalog(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        let catalog_name = catalog_name.to_owned();
        self.check(
            context,
            Operation::DropCatalog,
            Some(Resource::Catalog(CatalogResource {
                name: catalog_name.clone(),
            })),
            move || denied::cannot_access_catalog(&catalog_name),
        )
        .await
    }

    async fn filter_catalogs(
        &self,
        context: &QueryContext,
        catalogs: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        self.filter(context, Operation::FilterCatalogs, catalogs, |name| {
            Resource::Catalog(CatalogResource { name: name.clone() })
        })
        .await
    }

    async fn check_can_show_schemas(&self, context: &QueryContext, catalog_name: &str) -> Result<(), BridgeError> {
        let catalog_name = catalog_name.to_owned();
        self.check(
            context,
            Operation::ShowSchemas,
            Some(Resource::Catalog(CatalogResource {
                name: catalog_name.clone(),
            })),
            move || denied::cannot_access_catalog(&catalog_name),
        )
        .await
    }

    async fn check_can_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let mut schema = SchemaResource::new(catalog_name.clone(), schema_name.clone());
        schema.properties = properties;
        self.check(context, Operation::CreateSchema, Some(Resource::Schema(schema)), move || {
            denied::cannot_access_schema(&catalog_name, &schema_name)
        })
        .await
    }

    async fn check_can_drop_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.check(
            context,
            Operation::DropSchema,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
            move || denied::cannot_access_schema(&catalog_name, &schema_name),
        )
        .await
    }

    async fn check_can_show_create_schema(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.check(
            context,
            Operation::ShowCreateSchema,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
            move || denied::cannot_access_schema(&catalog_name, &schema_name),
        )
        .await
    }

    async fn check_can_show_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.check(
            context,
            Operation::ShowTables,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
            move || denied::cannot_access_schema(&catalog_name, &schema_name),
        )
        .await
    }

    async fn check_can_show_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.check(
            context,
            Operation::ShowFunctions,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
            move || denied::cannot_access_schema(&catalog_name, &schema_name),
        )
        .await
    }

    async fn filter_schemas(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schemas: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let catalog_name = catalog_name.to_owned();
        self.filter(context, Operation::FilterSchemas, schemas, move |name| {
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
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let action = Action::new(
            Operation::RenameSchema,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
        )
        .with_target_resource(Resource::Schema(SchemaResource::new(
            catalog_name.clone(),
            new_schema_name.to_owned(),
        )));
        self.check_action(context, action, move || denied::cannot_access_schema(&catalog_name, &schema_name))
            .await
    }

    async fn check_can_set_schema_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let action = Action::new(
            Operation::SetSchemaAuthorization,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
        )
        .with_grant(Grant::new(vec![principal.clone()]));
        self.check_action(context, action, move || denied::cannot_access_schema(&catalog_name, &schema_name))
            .await
    }

    async fn check_can_show_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::ShowCreateTable, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_create_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone());
        let table = match properties {
            Some(properties) => table.with_properties(properties),
            None => table,
        };
        self.check(context, Operation::CreateTable, Some(Resource::Table(table)), move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
        .await
    }

    async fn check_can_drop_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::DropTable, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_set_table_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::SetTableComment, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_set_view_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_view_op(context, Operation::SetViewComment, catalog_name, schema_name, view_name)
            .await
    }

    async fn check_can_set_column_comment(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        column_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name, column_name) = (
            catalog_name.to_owned(),
            schema_name.to_owned(),
            table_name.to_owned(),
            column_name.to_owned(),
        );
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone())
            .with_columns(std::collections::BTreeSet::from([column_name.clone()]));
        self.check(context, Operation::SetColumnComment, Some(Resource::Table(table)), move || {
            denied::cannot_access_columns(&catalog_name, &schema_name, &table_name, std::slice::from_ref(&column_name))
        })
        .await
    }

    async fn check_can_show_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::ShowColumns, catalog_name, schema_name, table_name)
            .await
    }

    async fn filter_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        self.filter(context, Operation::FilterColumns, columns, move |column| {
            Resource::Table(
                TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone())
                    .with_columns(std::collections::BTreeSet::from([column.clone()])),
            )
        })
        .await
    }

    async fn check_can_add_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::AddColumn, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_drop_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::DropColumn, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_alter_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::AlterColumn, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_rename_column(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::RenameColumn, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_set_table_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone());
        let table = match properties {
            Some(properties) => table.with_properties(properties),
            None => table,
        };
        self.check(context, Operation::SetTableProperties, Some(Resource::Table(table)), move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
        .await
    }

    async fn check_can_insert_into_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::InsertIntoTable, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_delete_from_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::DeleteFromTable, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_truncate_table(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_table_op(context, Operation::TruncateTable, catalog_name, schema_name, table_name)
            .await
    }

    async fn check_can_update_table_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        update_columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone())
            .with_columns(update_columns.into_iter().collect());
        self.check(context, Operation::UpdateTableColumns, Some(Resource::Table(table)), move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
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
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone())
            .with_columns(columns.iter().cloned().collect());
        self.check(context, Operation::SelectFromColumns, Some(Resource::Table(table)), move || {
            denied::cannot_access_columns(&catalog_name, &schema_name, &table_name, &columns)
        })
        .await
    }

    async fn check_can_create_view_with_select_from_columns(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let table = TableResource::new(catalog_name.clone(), schema_name.clone(), table_name.clone())
            .with_columns(columns.iter().cloned().collect());
        self.check(
            context,
            Operation::CreateViewWithSelectFromColumns,
            Some(Resource::Table(table)),
            move || denied::cannot_access_columns(&catalog_name, &schema_name, &table_name, &columns),
        )
        .await
    }

    async fn filter_tables(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        tables: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.filter(context, Operation::FilterTables, tables, move |name| {
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
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let action = Action::new(
            Operation::RenameTable,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_target_resource(Resource::Table(TableResource::new(
            catalog_name.clone(),
            schema_name.clone(),
            new_table_name.to_owned(),
        )));
        self.check_action(context, action, move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
        .await
    }

    async fn check_can_set_table_authorization(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        principal: &Principal,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let action = Action::new(
            Operation::SetTableAuthorization,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_grant(Grant::new(vec![principal.clone()]));
        self.check_action(context, action, move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
        .await
    }

    async fn check_can_create_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_view_op(context, Operation::CreateView, catalog_name, schema_name, view_name)
            .await
    }

    async fn check_can_drop_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_view_op(context, Operation::DropView, catalog_name, schema_name, view_name)
            .await
    }

    async fn check_can_create_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, view_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), view_name.to_owned());
        let view = TableResource::new(catalog_name.clone(), schema_name.clone(), view_name.clone());
        let view = match properties {
            Some(properties) => view.with_properties(properties),
            None => view,
        };
        self.check(context, Operation::CreateMaterializedView, Some(Resource::View(view)), move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &view_name)
        })
        .await
    }

    async fn check_can_drop_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_view_op(context, Operation::DropMaterializedView, catalog_name, schema_name, view_name)
            .await
    }

    async fn check_can_refresh_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_view_op(context, Operation::RefreshMaterializedView, catalog_name, schema_name, view_name)
            .await
    }

    async fn check_can_set_materialized_view_properties(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        properties: Option<Properties>,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, view_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), view_name.to_owned());
        let view = TableResource::new(catalog_name.clone(), schema_name.clone(), view_name.clone());
        let view = match properties {
            Some(properties) => view.with_properties(properties),
            None => view,
        };
        self.check(
            context,
            Operation::SetMaterializedViewProperties,
            Some(Resource::View(view)),
            move || denied::cannot_access_table(&catalog_name, &schema_name, &view_name),
        )
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
        self.check_rename_view_op(context, Operation::RenameView, catalog_name, schema_name, view_name, new_view_name)
            .await
    }

    async fn check_can_rename_materialized_view(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_rename_view_op(
            context,
            Operation::RenameMaterializedView,
            catalog_name,
            schema_name,
            view_name,
            new_view_name,
        )
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
        let (catalog_name, schema_name, view_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), view_name.to_owned());
        let action = Action::new(
            Operation::SetViewAuthorization,
            Some(Resource::View(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                view_name.clone(),
            ))),
        )
        .with_grant(Grant::new(vec![principal.clone()]));
        self.check_action(context, action, move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &view_name)
        })
        .await
    }

    async fn check_can_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_function_op(context, Operation::ExecuteFunction, catalog_name, schema_name, function_name)
            .await
    }

    async fn check_can_create_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_function_op(
            context,
            Operation::CreateFunction,
            Some(catalog_name),
            Some(schema_name),
            function_name,
        )
        .await
    }

    async fn check_can_drop_function(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_function_op(context, Operation::DropFunction, Some(catalog_name), Some(schema_name), function_name)
            .await
    }

    async fn check_can_create_view_with_execute_function(
        &self,
        context: &QueryContext,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_function_op(
            context,
            Operation::CreateViewWithExecuteFunction,
            catalog_name,
            schema_name,
            function_name,
        )
        .await
    }

    async fn check_can_execute_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        self.check_function_op(
            context,
            Operation::ExecuteProcedure,
            Some(catalog_name),
            Some(schema_name),
            function_name,
        )
        .await
    }

    async fn check_can_execute_table_procedure(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name, function_name) = (
            catalog_name.to_owned(),
            schema_name.to_owned(),
            table_name.to_owned(),
            function_name.to_owned(),
        );
        let action = Action::new(
            Operation::ExecuteTableProcedure,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_target_resource(Resource::Function(FunctionResource::new(
            catalog_name.clone(),
            schema_name.clone(),
            function_name.clone(),
        )));
        self.check_action(context, action, move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &table_name)
        })
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
        let function_name_owned = function_name.to_owned();
        let resource = Resource::Function(FunctionResource {
            catalog_name: catalog_name.map(str::to_owned),
            schema_name: schema_name.map(str::to_owned),
            function_name: function_name_owned.clone(),
            function_kind: None,
        });
        let action = Action::new(Operation::GrantExecuteFunctionPrivilege, Some(resource))
            .with_grant(grant.with_principals(vec![grantee.clone()]));
        self.check_action(context, action, move || denied::cannot_access_function(&function_name_owned))
            .await
    }

    async fn filter_functions(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        schema_name: &str,
        functions: Vec<String>,
    ) -> Result<HashSet<String>, BridgeError> {
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        self.filter(context, Operation::FilterFunctions, functions, move |name| {
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
        let role_name = role_name.to_owned();
        let mut action = Action::new(
            Operation::CreateRole,
            Some(Resource::Role(RoleResource { name: role_name.clone() })),
        );
        action.grantor = grantor.cloned();
        self.check_action(context, action, move || denied::cannot_access_role(&role_name))
            .await
    }

    async fn check_can_drop_role(&self, context: &QueryContext, role_name: &str) -> Result<(), BridgeError> {
        let role_name = role_name.to_owned();
        self.check(
            context,
            Operation::DropRole,
            Some(Resource::Role(RoleResource { name: role_name.clone() })),
            move || denied::cannot_access_role(&role_name),
        )
        .await
    }

    async fn check_can_grant_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        grant: Grant,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        let role_list = roles.clone();
        let resource = Resource::Roles(roles.into_iter().map(|name| RoleEntry { name }).collect());
        let mut action = Action::new(Operation::GrantRoles, Some(resource));
        action.grantee = Some(grant.with_principals(grantees));
        action.grantor = grantor.cloned();
        self.check_action(context, action, move || {
            denied::cannot(format!("grant roles {}", role_list.join(", ")))
        })
        .await
    }

    async fn check_can_revoke_roles(
        &self,
        context: &QueryContext,
        roles: Vec<String>,
        grantees: Vec<Principal>,
        admin_option: bool,
        grantor: Option<&Principal>,
    ) -> Result<(), BridgeError> {
        let role_list = roles.clone();
        let resource = Resource::Roles(roles.into_iter().map(|name| RoleEntry { name }).collect());
        let mut action = Action::new(Operation::RevokeRoles, Some(resource));
        action.grantee = Some(Grant::new(grantees).with_grant_option(admin_option));
        action.grantor = grantor.cloned();
        self.check_action(context, action, move || {
            denied::cannot(format!("revoke roles {}", role_list.join(", ")))
        })
        .await
    }

    async fn check_can_set_system_session_property(
        &self,
        context: &QueryContext,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        let property_name = property_name.to_owned();
        self.check(
            context,
            Operation::SetSystemSessionProperty,
            Some(Resource::SystemSessionProperty(SystemSessionPropertyResource {
                name: property_name.clone(),
            })),
            move || denied::cannot_set_session_property(&property_name),
        )
        .await
    }

    async fn check_can_set_catalog_session_property(
        &self,
        context: &QueryContext,
        catalog_name: &str,
        property_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, property_name) = (catalog_name.to_owned(), property_name.to_owned());
        self.check(
            context,
            Operation::SetCatalogSessionProperty,
            Some(Resource::CatalogSessionProperty(CatalogSessionPropertyResource {
                catalog_name: catalog_name.clone(),
                property_name: property_name.clone(),
            })),
            move || denied::cannot_set_session_property(&property_name),
        )
        .await
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
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::GrantSchemaPrivilege,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
        )
        .with_grant(grant.with_principals(vec![grantee.clone()]).with_privilege(privilege.clone()));
        self.check_action(context, action, move || {
            denied::cannot(format!("grant {privilege} on schema {catalog_name}.{schema_name}"))
        })
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
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::DenySchemaPrivilege,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
        )
        .with_grant(Grant::new(vec![grantee.clone()]).with_privilege(privilege.clone()));
        self.check_action(context, action, move || {
            denied::cannot(format!("deny {privilege} on schema {catalog_name}.{schema_name}"))
        })
        .await
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
        let (catalog_name, schema_name) = (catalog_name.to_owned(), schema_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::RevokeSchemaPrivilege,
            Some(Resource::Schema(SchemaResource::new(catalog_name.clone(), schema_name.clone()))),
        )
        .with_grant(
            Grant::new(vec![grantee.clone()])
                .with_grant_option(grant_option_for)
                .with_privilege(privilege.clone()),
        );
        self.check_action(context, action, move || {
            denied::cannot(format!("revoke {privilege} on schema {catalog_name}.{schema_name}"))
        })
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
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::GrantTablePrivilege,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_grant(grant.with_principals(vec![grantee.clone()]).with_privilege(privilege.clone()));
        self.check_action(context, action, move || {
            denied::cannot(format!("grant {privilege} on table {catalog_name}.{schema_name}.{table_name}"))
        })
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
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::DenyTablePrivilege,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_grant(Grant::new(vec![grantee.clone()]).with_privilege(privilege.clone()));
        self.check_action(context, action, move || {
            denied::cannot(format!("deny {privilege} on table {catalog_name}.{schema_name}.{table_name}"))
        })
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
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        let privilege = privilege.to_owned();
        let action = Action::new(
            Operation::RevokeTablePrivilege,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
        )
        .with_grant(
            Grant::new(vec![grantee.clone()])
                .with_grant_option(grant_option_for)
                .with_privilege(privilege.clone()),
        );
        self.check_action(context, action, move || {
            denied::cannot(format!("revoke {privilege} on table {catalog_name}.{schema_name}.{table_name}"))
        })
        .await
    }
}

impl SingleDecisionAuthorizer {
    async fn check_table_op(
        &self,
        context: &QueryContext,
        operation: Operation,
        catalog_name: &str,
        schema_name: &str,
        table_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, table_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), table_name.to_owned());
        self.check(
            context,
            operation,
            Some(Resource::Table(TableResource::new(
                catalog_name.clone(),
                schema_name.clone(),
                table_name.clone(),
            ))),
            move || denied::cannot_access_table(&catalog_name, &schema_name, &table_name),
        )
        .await
    }

    async fn check_view_op(
        &self,
        context: &QueryContext,
        operation: Operation,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, view_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), view_name.to_owned());
        self.check(
            context,
            operation,
            Some(Resource::View(TableResource::new(catalog_name.clone(), schema_name.clone(), view_name.clone()))),
            move || denied::cannot_access_table(&catalog_name, &schema_name, &view_name),
        )
        .await
    }

    async fn check_rename_view_op(
        &self,
        context: &QueryContext,
        operation: Operation,
        catalog_name: &str,
        schema_name: &str,
        view_name: &str,
        new_view_name: &str,
    ) -> Result<(), BridgeError> {
        let (catalog_name, schema_name, view_name) =
            (catalog_name.to_owned(), schema_name.to_owned(), view_name.to_owned());
        let action = Action::new(
            operation,
            Some(Resource::View(TableResource::new(catalog_name.clone(), schema_name.clone(), view_name.clone()))),
        )
        .with_target_resource(Resource::View(TableResource::new(
            catalog_name.clone(),
            schema_name.clone(),
            new_view_name.to_owned(),
        )));
        self.check_action(context, action, move || {
            denied::cannot_access_table(&catalog_name, &schema_name, &view_name)
        })
        .await
    }

    async fn check_function_op(
        &self,
        context: &QueryContext,
        operation: Operation,
        catalog_name: Option<&str>,
        schema_name: Option<&str>,
        function_name: &str,
    ) -> Result<(), BridgeError> {
        let function_name_owned = function_name.to_owned();
        let resource = Resource::Function(FunctionResource {
            catalog_name: catalog_name.map(str::to_owned),
            schema_name: schema_name.map(str::to_owned),
            function_name: function_name_owned.clone(),
            function_kind: None,
        });
        self.check(context, operation, Some(resource), move || {
            denied::cannot_access_function(&function_name_owned)
        })
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

    #[tokio::test]
    async fn allowed_check_returns_ok() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        assert!(authorizer.check_can_execute_query(&context()).await.is_ok());
    }

    #[tokio::test]
    async fn denied_check_returns_specific_access_denied() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        let err = authorizer
            .check_can_drop_catalog(&context(), "cat")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::AccessDenied { .. }));
        assert!(err.to_string().contains("cat"));
    }

    #[tokio::test]
    async fn empty_filter_input_makes_no_http_calls() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        let result = authorizer.filter_catalogs(&context(), vec![]).await.unwrap();

        assert!(result.is_empty());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn filter_permits_all_when_pdp_allows_all() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        let result = authorizer
            .filter_catalogs(&context(), vec!["a".to_owned(), "b".to_owned()])
            .await
            .unwrap();

        assert_eq!(result, HashSet::from(["a".to_owned(), "b".to_owned()]));
    }

    #[tokio::test]
    async fn filter_denies_all_when_pdp_denies_all() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({"result": false}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        let result = authorizer
            .filter_catalogs(&context(), vec!["a".to_owned(), "b".to_owned()])
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn can_access_catalog_returns_bool_rather_than_erroring() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200).json_body(serde_json::json!({"result": false}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        let allowed = authorizer.can_access_catalog(&context(), "cat").await.unwrap();

        assert!(!allowed);
    }

    #[tokio::test]
    async fn grant_roles_sends_every_grantee_and_the_grantor() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/v1/data/trino/allow")
                .json_body_partial(
                    serde_json::json!({
                        "input": {
                            "action": {
                                "grantee": {
                                    "principals": [
                                        {"name": "alice", "type": "USER"},
                                        {"name": "bob", "type": "USER"},
                                    ],
                                },
                                "grantor": {"name": "admin", "type": "USER"},
                            }
                        }
                    })
                    .to_string(),
                );
            then.status(200).json_body(serde_json::json!({"result": true}));
        });
        let authorizer = SingleDecisionAuthorizer::new(
            DecisionClient::new(reqwest::Client::new()),
            server.url("/v1/data/trino/allow").parse().unwrap(),
        );

        authorizer
            .check_can_grant_roles(
                &context(),
                vec!["admin_role".to_owned()],
                vec![Principal::user("alice"), Principal::user("bob")],
                Grant::new(vec![]),
                Some(&Principal::user("admin")),
            )
            .await
            .unwrap();

        mock.assert_hits(1);
    }
}
