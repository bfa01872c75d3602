//! The fixed catalog of authorization operations.
//!
//! Each variant's [`Display`] output is the exact PascalCase wire identifier
//! sent as `action.operation`. The operation name alone determines which
//! resource fields an [`Action`](crate::action::Action) carries; see the
//! per-group tables in the module catalog this crate was built against.

use std::fmt;

use serde::{Serialize, Serializer};

/// A single authorization question the host engine can ask the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operation {
    // No resource.
    ExecuteQuery,
    ReadSystemInformation,
    WriteSystemInformation,
    ShowRoles,
    ShowCurrentRoles,
    ShowRoleGrants,
    ShowRoleAuthorizationDescriptors,

    // `user` resource.
    ImpersonateUser,
    ViewQueryOwnedBy,
    KillQueryOwnedBy,
    FilterViewQueryOwnedBy,

    // `catalog` resource.
    AccessCatalog,
    CreateCatalog,
    DropCatalog,
    FilterCatalogs,
    ShowSchemas,

    // `schema` resource.
    CreateSchema,
    DropSchema,
    ShowCreateSchema,
    ShowTables,
    ShowFunctions,
    FilterSchemas,
    RenameSchema,
    SetSchemaAuthorization,

    // `table`/`view` resource (comment/column ops apply to both tables and views).
    ShowCreateTable,
    CreateTable,
    DropTable,
    SetTableComment,
    SetViewComment,
    SetColumnComment,
    ShowColumns,
    AddColumn,
    DropColumn,
    AlterColumn,
    RenameColumn,
    SetTableProperties,
    InsertIntoTable,
    DeleteFromTable,
    TruncateTable,
    UpdateTableColumns,
    SelectFromColumns,
    CreateViewWithSelectFromColumns,
    FilterTables,
    FilterColumns,
    RenameTable,
    SetTableAuthorization,

    // `view` resource.
    CreateView,
    DropView,
    CreateMaterializedView,
    DropMaterializedView,
    RefreshMaterializedView,
    SetMaterializedViewProperties,
    RenameView,
    RenameMaterializedView,
    SetViewAuthorization,

    // `function` resource.
    ExecuteFunction,
    CreateFunction,
    DropFunction,
    CreateViewWithExecuteFunction,
    ExecuteProcedure,
    ExecuteTableProcedure,
    GrantExecuteFunctionPrivilege,
    FilterFunctions,

    // `role` resource.
    CreateRole,
    DropRole,
    GrantRoles,
    RevokeRoles,

    // Session properties.
    SetSystemSessionProperty,
    SetCatalogSessionProperty,

    // Privilege management (gated, see `PermissionManagementGate`).
    GrantSchemaPrivilege,
    DenySchemaPrivilege,
    RevokeSchemaPrivilege,
    GrantTablePrivilege,
    DenyTablePrivilege,
    RevokeTablePrivilege,
}

impl Operation {
    /// The exact PascalCase wire identifier for `action.operation`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExecuteQuery => "ExecuteQuery",
            Self::ReadSystemInformation => "ReadSystemInformation",
            Self::WriteSystemInformation => "WriteSystemInformation",
            Self::ShowRoles => "ShowRoles",
            Self::ShowCurrentRoles => "ShowCurrentRoles",
            Self::ShowRoleGrants => "ShowRoleGrants",
            Self::ShowRoleAuthorizationDescriptors => "ShowRoleAuthorizationDescriptors",
            Self::ImpersonateUser => "ImpersonateUser",
            Self::ViewQueryOwnedBy => "ViewQueryOwnedBy",
            Self::KillQueryOwnedBy => "KillQueryOwnedBy",
            Self::FilterViewQueryOwnedBy => "FilterViewQueryOwnedBy",
            Self::AccessCatalog => "AccessCatalog",
            Self::CreateCatalog => "CreateCatalog",
            Self::DropCatalog => "DropCatalog",
            Self::FilterCatalogs => "FilterCatalogs",
            Self::ShowSchemas => "ShowSchemas",
            Self::CreateSchema => "CreateSchema",
            Self::DropSchema => "DropSchema",
            Self::ShowCreateSchema => "ShowCreateSchema",
            Self::ShowTables => "ShowTables",
            Self::ShowFunctions => "ShowFunctions",
            Self::FilterSchemas => "FilterSchemas",
            Self::RenameSchema => "RenameSchema",
            Self::SetSchemaAuthorization => "SetSchemaAuthorization",
            Self::ShowCreateTable => "ShowCreateTable",
            Self::CreateTable => "CreateTable",
            Self::DropTable => "DropTable",
            Self::SetTableComment => "SetTableComment",
            Self::SetViewComment => "SetViewComment",
            Self::SetColumnComment => "SetColumnComment",
            Self::ShowColumns => "ShowColumns",
            Self::AddColumn => "AddColumn",
            Self::DropColumn => "DropColumn",
            Self::AlterColumn => "AlterColumn",
            Self::RenameColumn => "RenameColumn",
            Self::SetTableProperties => "SetTableProperties",
            Self::InsertIntoTable => "InsertIntoTable",
            Self::DeleteFromTable => "DeleteFromTable",
            Self::TruncateTable => "TruncateTable",
            Self::UpdateTableColumns => "UpdateTableColumns",
            Self::SelectFromColumns => "SelectFromColumns",
            Self::CreateViewWithSelectFromColumns => "CreateViewWithSelectFromColumns",
            Self::FilterTables => "FilterTables",
            Self::FilterColumns => "FilterColumns",
            Self::RenameTable => "RenameTable",
            Self::SetTableAuthorization => "SetTableAuthorization",
            Self::CreateView => "CreateView",
            Self::DropView => "DropView",
            Self::CreateMaterializedView => "CreateMaterializedView",
            Self::DropMaterializedView => "DropMaterializedView",
            Self::RefreshMaterializedView => "RefreshMaterializedView",
            Self::SetMaterializedViewProperties => "SetMaterializedViewProperties",
            Self::RenameView => "RenameView",
            Self::RenameMaterializedView => "RenameMaterializedView",
            Self::SetViewAuthorization => "SetViewAuthorization",
            Self::ExecuteFunction => "ExecuteFunction",
            Self::CreateFunction => "CreateFunction",
            Self::DropFunction => "DropFunction",
            Self::CreateViewWithExecuteFunction => "CreateViewWithExecuteFunction",
            Self::ExecuteProcedure => "ExecuteProcedure",
            Self::ExecuteTableProcedure => "ExecuteTableProcedure",
            Self::GrantExecuteFunctionPrivilege => "GrantExecuteFunctionPrivilege",
            Self::FilterFunctions => "FilterFunctions",
            Self::CreateRole => "CreateRole",
            Self::DropRole => "DropRole",
            Self::GrantRoles => "GrantRoles",
            Self::RevokeRoles => "RevokeRoles",
            Self::SetSystemSessionProperty => "SetSystemSessionProperty",
            Self::SetCatalogSessionProperty => "SetCatalogSessionProperty",
            Self::GrantSchemaPrivilege => "GrantSchemaPrivilege",
            Self::DenySchemaPrivilege => "DenySchemaPrivilege",
            Self::RevokeSchemaPrivilege => "RevokeSchemaPrivilege",
            Self::GrantTablePrivilege => "GrantTablePrivilege",
            Self::DenyTablePrivilege => "DenyTablePrivilege",
            Self::RevokeTablePrivilege => "RevokeTablePrivilege",
        }
    }

    /// Whether this operation is gated locally by the permission-management
    /// flag instead of being sent to the PDP.
    #[must_use]
    pub const fn is_permission_management(self) -> bool {
        matches!(
            self,
            Self::GrantSchemaPrivilege
                | Self::DenySchemaPrivilege
                | Self::RevokeSchemaPrivilege
                | Self::GrantTablePrivilege
                | Self::DenyTablePrivilege
                | Self::RevokeTablePrivilege
                | Self::CreateRole
                | Self::DropRole
                | Self::GrantRoles
                | Self::RevokeRoles
        )
    }

    /// Whether this operation is always allowed, bypassing both the gate and
    /// the PDP.
    #[must_use]
    pub const fn is_always_allowed(self) -> bool {
        matches!(
            self,
            Self::ShowRoles | Self::ShowCurrentRoles | Self::ShowRoleGrants
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
