//! The tagged resource variants that populate `action.resource`,
//! `action.targetResource`, and the elements of `action.filterResources`.
//!
//! Resource is modeled as a Rust enum rather than a struct with many
//! optional fields: the serializer only ever emits the populated variant,
//! under the camelCase key matching that variant (`catalog`, `schema`,
//! `table`, `view`, ...). The `view` vs `table` distinction is carried by
//! the variant tag, not a runtime toggle.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::identity::MinimalIdentity;

/// A property value: either an explicit JSON value or an engine-side
/// absence, which must round-trip as JSON `null`.
pub type PropertyValue = Option<serde_json::Value>;

/// A flat property map, keyed verbatim.
pub type Properties = BTreeMap<String, PropertyValue>;

/// `resource.catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogResource {
    /// The catalog name.
    pub name: String,
}

/// `resource.schema`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaResource {
    /// The owning catalog name.
    #[serde(rename = "catalogName")]
    pub catalog_name: String,
    /// The schema name.
    #[serde(rename = "schemaName")]
    pub schema_name: String,
    /// Schema properties, when the action carries them. Omitted when
    /// `None`; individual entries may still serialize as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl SchemaResource {
    /// Build a schema resource with no properties.
    #[must_use]
    pub fn new(catalog_name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
            properties: None,
        }
    }
}

/// `resource.table` / `resource.view` — tables, views and materialized
/// views all share this shape; only the serialized key differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResource {
    /// The owning catalog name.
    #[serde(rename = "catalogName")]
    pub catalog_name: String,
    /// The owning schema name.
    #[serde(rename = "schemaName")]
    pub schema_name: String,
    /// The table or view name.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// The columns involved, when the action is column-scoped. Omitted
    /// when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<BTreeSet<String>>,
    /// Table/view properties, when the action carries them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl TableResource {
    /// Build a table/view resource with no columns or properties.
    #[must_use]
    pub fn new(
        catalog_name: impl Into<String>,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog_name: catalog_name.into(),
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            columns: None,
            properties: None,
        }
    }

    /// Attach a column set.
    #[must_use]
    pub fn with_columns(mut self, columns: BTreeSet<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Attach properties.
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// The kind of callable a function resource refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionKind {
    /// A scalar or aggregate function.
    Scalar,
    /// A table function.
    Table,
    /// A window function.
    Window,
}

/// `resource.function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionResource {
    /// The owning catalog name, when the function is catalog-scoped.
    #[serde(rename = "catalogName", skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// The owning schema name, when the function is schema-scoped.
    #[serde(rename = "schemaName", skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// The function name.
    #[serde(rename = "functionName")]
    pub function_name: String,
    /// The function kind, when known.
    #[serde(rename = "functionKind", skip_serializing_if = "Option::is_none")]
    pub function_kind: Option<FunctionKind>,
}

impl FunctionResource {
    /// Build a fully-qualified function resource.
    #[must_use]
    pub fn new(
        catalog_name: impl Into<String>,
        schema_name: impl Into<String>,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog_name: Some(catalog_name.into()),
            schema_name: Some(schema_name.into()),
            function_name: function_name.into(),
            function_kind: None,
        }
    }
}

/// `resource.role` — a single named role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleResource {
    /// The role name.
    pub name: String,
}

/// A single role entry inside the multi-role `resource.roles` variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleEntry {
    /// The role name.
    pub name: String,
}

/// `resource.systemSessionProperty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSessionPropertyResource {
    /// The session property name.
    pub name: String,
}

/// `resource.catalogSessionProperty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSessionPropertyResource {
    /// The owning catalog name.
    #[serde(rename = "catalogName")]
    pub catalog_name: String,
    /// The session property name.
    #[serde(rename = "propertyName")]
    pub property_name: String,
}

/// The sum type of every resource shape the bridge can describe.
///
/// Exactly the variant populated for a given action appears on the wire,
/// under a camelCase key matching the variant name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    /// A user, in its minimal (user + groups) shape.
    User(MinimalIdentity),
    /// A catalog.
    Catalog(CatalogResource),
    /// A schema.
    Schema(SchemaResource),
    /// A table.
    Table(TableResource),
    /// A view or materialized view.
    View(TableResource),
    /// A function.
    Function(FunctionResource),
    /// A single role.
    Role(RoleResource),
    /// Multiple roles.
    Roles(Vec<RoleEntry>),
    /// A system session property.
    SystemSessionProperty(SystemSessionPropertyResource),
    /// A catalog session property.
    CatalogSessionProperty(CatalogSessionPropertyResource),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn catalog_resource_serializes_under_catalog_key() {
        let resource = Resource::Catalog(CatalogResource {
            name: "cat".to_owned(),
        });
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json, serde_json::json!({"catalog": {"name": "cat"}}));
    }

    #[test]
    fn table_and_view_share_shape_but_differ_in_key() {
        let table = Resource::Table(TableResource::new("cat", "sch", "tbl"));
        let view = Resource::View(TableResource::new("cat", "sch", "tbl"));
        let table_json = serde_json::to_value(&table).unwrap();
        let view_json = serde_json::to_value(&view).unwrap();
        assert!(table_json.as_object().unwrap().contains_key("table"));
        assert!(view_json.as_object().unwrap().contains_key("view"));
        assert_eq!(table_json["table"], view_json["view"]);
    }

    #[test]
    fn table_resource_omits_absent_columns_and_properties() {
        let resource = Resource::Table(TableResource::new("cat", "sch", "tbl"));
        let json = serde_json::to_value(&resource).unwrap();
        let table = json["table"].as_object().unwrap();
        assert!(!table.contains_key("columns"));
        assert!(!table.contains_key("properties"));
    }

    #[test]
    fn table_resource_carries_columns_when_set() {
        let resource = Resource::Table(
            TableResource::new("cat", "sch", "tbl")
                .with_columns(BTreeSet::from(["c1".to_owned(), "c2".to_owned()])),
        );
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["table"]["columns"], serde_json::json!(["c1", "c2"]));
    }

    #[test]
    fn property_null_entries_round_trip_as_json_null() {
        let mut properties: Properties = BTreeMap::new();
        properties.insert("format".to_owned(), Some(serde_json::json!("orc")));
        properties.insert("absent_prop".to_owned(), None);
        let resource =
            Resource::Schema(SchemaResource::new("cat", "sch").tap_properties(properties));
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["schema"]["properties"]["format"], "orc");
        assert!(json["schema"]["properties"]["absent_prop"].is_null());
    }

    #[test]
    fn session_property_keys_are_camel_case() {
        let system = Resource::SystemSessionProperty(SystemSessionPropertyResource {
            name: "query_max_memory".to_owned(),
        });
        let catalog = Resource::CatalogSessionProperty(CatalogSessionPropertyResource {
            catalog_name: "cat".to_owned(),
            property_name: "prop".to_owned(),
        });
        assert!(
            serde_json::to_value(&system)
                .unwrap()
                .as_object()
                .unwrap()
                .contains_key("systemSessionProperty")
        );
        assert!(
            serde_json::to_value(&catalog)
                .unwrap()
                .as_object()
                .unwrap()
                .contains_key("catalogSessionProperty")
        );
    }

    #[test]
    fn roles_variant_serializes_as_array_under_roles_key() {
        let resource = Resource::Roles(vec![
            RoleEntry { name: "a".to_owned() },
            RoleEntry { name: "b".to_owned() },
        ]);
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["roles"], serde_json::json!([{"name": "a"}, {"name": "b"}]));
    }

    /// Test-only helper: attach properties without needing a public
    /// builder method that non-test callers never use.
    trait TapProperties {
        fn tap_properties(self, properties: Properties) -> Self;
    }

    impl TapProperties for SchemaResource {
        fn tap_properties(mut self, properties: Properties) -> Self {
            self.properties = Some(properties);
            self
        }
    }
}
