use serde::{Deserialize, Serialize};

/// Fallback schema name when a connection doesn't specify one.
pub const DEFAULT_SCHEMA: &str = "public";

/// Read-only snapshot of a connection's schema.
///
/// A snapshot is produced by a single sync call and replaced wholesale on the
/// next one. It is never patched incrementally; everything that depends on it
/// (selection reconciliation, view projection) re-derives from the new value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub connection_id: String,
    pub database: String,

    /// Schema scope of the snapshot (PostgreSQL concept). `None` means "public".
    pub schema_name: Option<String>,

    #[serde(default)]
    pub tables: Vec<TableInfo>,
}

impl SchemaSnapshot {
    /// Schema name used to qualify table names, defaulting to "public".
    pub fn schema_prefix(&self) -> &str {
        self.schema_name.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Qualified name for a table in this snapshot: `"{schema}.{table}"`.
    pub fn full_table_name(&self, table: &str) -> String {
        format!("{}.{}", self.schema_prefix(), table)
    }

    /// Look up a table by its qualified `"{schema}.{table}"` name.
    ///
    /// Returns `None` when the schema part doesn't match this snapshot's
    /// scope, which is how stale references from another schema surface.
    pub fn table_by_full_name(&self, full_name: &str) -> Option<&TableInfo> {
        let (schema, table) = full_name.split_once('.')?;
        if schema != self.schema_prefix() {
            return None;
        }
        self.tables.iter().find(|t| t.name == table)
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Table metadata within a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<ColumnInfo>,

    /// Bounded sample rows fetched together with the schema, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleData>,
}

impl TableInfo {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Column metadata within a table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,

    /// Database-specific type (e.g., "integer", "character varying").
    pub type_name: String,

    pub nullable: bool,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_foreign_key: bool,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

/// Bounded preview of a table's data.
///
/// `columns` carries the column order the rows were fetched with; projections
/// of the preview must preserve that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleData {
    pub columns: Vec<String>,

    /// Row objects keyed by column name, JSON-safe values only.
    #[serde(default)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SchemaSnapshot {
        SchemaSnapshot {
            connection_id: "conn-1".into(),
            database: "appdb".into(),
            schema_name: Some("sales".into()),
            tables: vec![TableInfo {
                name: "orders".into(),
                columns: vec![ColumnInfo {
                    name: "id".into(),
                    type_name: "integer".into(),
                    nullable: false,
                    is_primary_key: true,
                    ..ColumnInfo::default()
                }],
                sample: None,
            }],
        }
    }

    #[test]
    fn full_table_name_uses_schema_prefix() {
        let snap = snapshot();
        assert_eq!(snap.full_table_name("orders"), "sales.orders");

        let unscoped = SchemaSnapshot {
            schema_name: None,
            ..snapshot()
        };
        assert_eq!(unscoped.full_table_name("orders"), "public.orders");
    }

    #[test]
    fn table_by_full_name_requires_matching_schema() {
        let snap = snapshot();
        assert!(snap.table_by_full_name("sales.orders").is_some());
        assert!(snap.table_by_full_name("public.orders").is_none());
        assert!(snap.table_by_full_name("orders").is_none());
    }

    #[test]
    fn has_column_checks_current_columns() {
        let snap = snapshot();
        let table = snap.table("orders").unwrap();
        assert!(table.has_column("id"));
        assert!(!table.has_column("legacy_flag"));
    }
}
