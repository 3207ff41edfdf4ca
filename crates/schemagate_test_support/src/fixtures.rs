use schemagate_core::{ColumnInfo, SampleData, SchemaSnapshot, SelectedSchema, TableInfo};

pub fn column(name: impl Into<String>, type_name: impl Into<String>) -> ColumnInfo {
    ColumnInfo {
        name: name.into(),
        type_name: type_name.into(),
        nullable: true,
        ..ColumnInfo::default()
    }
}

pub fn pk_column(name: impl Into<String>, type_name: impl Into<String>) -> ColumnInfo {
    ColumnInfo {
        name: name.into(),
        type_name: type_name.into(),
        nullable: false,
        is_primary_key: true,
        ..ColumnInfo::default()
    }
}

pub fn table(name: impl Into<String>, columns: Vec<ColumnInfo>) -> TableInfo {
    TableInfo {
        name: name.into(),
        columns,
        sample: None,
    }
}

pub fn snapshot(connection_id: impl Into<String>, tables: Vec<TableInfo>) -> SchemaSnapshot {
    SchemaSnapshot {
        connection_id: connection_id.into(),
        database: "appdb".into(),
        schema_name: Some("public".into()),
        tables,
    }
}

/// The two-table fixture used throughout the scenario tests:
/// `public.users(id,name,email)` and `public.orders(id,user_id,total)`.
pub fn users_orders_snapshot(connection_id: impl Into<String>) -> SchemaSnapshot {
    snapshot(
        connection_id,
        vec![
            table(
                "users",
                vec![
                    pk_column("id", "integer"),
                    column("name", "text"),
                    column("email", "character varying"),
                ],
            ),
            table(
                "orders",
                vec![
                    pk_column("id", "integer"),
                    column("user_id", "integer"),
                    column("total", "numeric"),
                ],
            ),
        ],
    )
}

pub fn sample(columns: Vec<&str>, rows: Vec<serde_json::Value>) -> SampleData {
    SampleData {
        columns: columns.into_iter().map(str::to_string).collect(),
        rows: rows
            .into_iter()
            .filter_map(|row| match row {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        total_rows: None,
    }
}

pub fn selection_from_json(json: &str) -> SelectedSchema {
    serde_json::from_str(json).expect("selection fixture must be valid JSON")
}
