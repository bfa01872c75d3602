//! Denial-message helpers.
//!
//! Authorizers call these instead of constructing [`BridgeError::denied`]
//! inline, so that the wording stays consistent across every operation that
//! denies access to the same kind of resource.

use crate::error::BridgeError;

/// Generic "cannot perform this operation" denial, used when no more
/// specific helper applies.
#[must_use]
pub fn cannot(action: impl std::fmt::Display) -> BridgeError {
    BridgeError::denied(format!("Cannot {action}"))
}

/// Denial for catalog-scoped operations.
#[must_use]
pub fn cannot_access_catalog(catalog_name: &str) -> BridgeError {
    cannot(format!("access catalog {catalog_name}"))
}

/// Denial for schema-scoped operations.
#[must_use]
pub fn cannot_access_schema(catalog_name: &str, schema_name: &str) -> BridgeError {
    cannot(format!("access schema {catalog_name}.{schema_name}"))
}

/// Denial for table/view-scoped operations.
#[must_use]
pub fn cannot_access_table(catalog_name: &str, schema_name: &str, table_name: &str) -> BridgeError {
    cannot(format!("access table {catalog_name}.{schema_name}.{table_name}"))
}

/// Denial for column-scoped operations, naming the offending columns.
#[must_use]
pub fn cannot_access_columns(
    catalog_name: &str,
    schema_name: &str,
    table_name: &str,
    columns: &[String],
) -> BridgeError {
    cannot(format!(
        "access columns {} of table {catalog_name}.{schema_name}.{table_name}",
        columns.join(", ")
    ))
}

/// Denial for function-scoped operations.
#[must_use]
pub fn cannot_access_function(function_name: &str) -> BridgeError {
    cannot(format!("access function {function_name}"))
}

/// Denial for role-scoped operations.
#[must_use]
pub fn cannot_access_role(role_name: &str) -> BridgeError {
    cannot(format!("access role {role_name}"))
}

/// Denial for session-property-scoped operations.
#[must_use]
pub fn cannot_set_session_property(property_name: &str) -> BridgeError {
    cannot(format!("set session property {property_name}"))
}

/// Denial for user impersonation.
#[must_use]
pub fn cannot_impersonate_user(user_name: &str) -> BridgeError {
    cannot(format!("impersonate user {user_name}"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn cannot_access_table_names_the_full_path() {
        let err = cannot_access_table("cat", "sch", "tbl");
        assert_eq!(err.to_string(), "access denied: Cannot access table cat.sch.tbl");
    }

    #[test]
    fn cannot_access_columns_lists_offenders() {
        let err = cannot_access_columns("cat", "sch", "tbl", &["a".to_owned(), "b".to_owned()]);
        assert!(err.to_string().contains("columns a, b"));
    }
}
