use crate::{ColumnInfo, SampleData, SchemaSnapshot, SelectedSchema, TableInfo, TriState};
use std::cmp::Ordering;

/// Which tab of the table list is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionTab {
    #[default]
    All,

    /// Only tables with at least one chosen column.
    Selected,
}

/// One table row in the projected tree view.
#[derive(Debug, Clone)]
pub struct TableRow<'a> {
    pub full_name: String,
    pub table: &'a TableInfo,
    pub state: TriState,
}

/// Tables of one schema, sorted by table name.
#[derive(Debug, Clone)]
pub struct SchemaGroup<'a> {
    pub schema_name: &'a str,
    pub tables: Vec<TableRow<'a>>,
}

/// Case-insensitive ordering for schema object names.
///
/// Lowercases through Unicode case folding rather than byte comparison, so
/// "Orders" and "orders" sort together; ties fall back to the raw name to
/// keep the order total.
fn name_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Case-insensitive substring match. An empty needle matches everything.
fn matches(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Project the tree view: tab filter and search compose (AND), then tables
/// are grouped by schema name and sorted case-insensitively by table name.
pub fn table_tree<'a>(
    snapshot: &'a SchemaSnapshot,
    selection: &SelectedSchema,
    tab: SelectionTab,
    search: &str,
) -> Vec<SchemaGroup<'a>> {
    let mut rows: Vec<TableRow<'a>> = snapshot
        .tables
        .iter()
        .filter(|table| matches(&table.name, search))
        .filter_map(|table| {
            let full_name = snapshot.full_table_name(&table.name);
            let entry = selection.get(&full_name);

            if tab == SelectionTab::Selected
                && entry.map(|e| e.columns.is_empty()).unwrap_or(true)
            {
                return None;
            }

            Some(TableRow {
                state: TriState::of(table, entry),
                full_name,
                table,
            })
        })
        .collect();

    rows.sort_by(|a, b| name_cmp(&a.table.name, &b.table.name));

    if rows.is_empty() {
        return Vec::new();
    }

    // Single-schema snapshots produce one group; the shape stays grouped so
    // multi-schema sources project the same way.
    vec![SchemaGroup {
        schema_name: snapshot.schema_prefix(),
        tables: rows,
    }]
}

/// Project the detail view's column list for one table.
///
/// The search term matches the column name or its type, case-insensitively.
pub fn detail_columns<'a>(table: &'a TableInfo, search: &str) -> Vec<&'a ColumnInfo> {
    table
        .columns
        .iter()
        .filter(|col| matches(&col.name, search) || matches(&col.type_name, search))
        .collect()
}

/// Project the sample preview's column list.
///
/// Displayed columns are the sample's columns filtered to the selection,
/// preserving the sample's original order. An empty selection falls back to
/// all sample columns: the preview is informational and must not appear
/// broken while the user is still deciding what to pick.
pub fn sample_columns<'a>(
    sample: &'a SampleData,
    selection: &SelectedSchema,
    full_name: &str,
) -> Vec<&'a str> {
    let chosen = selection
        .get(full_name)
        .map(|e| &e.columns)
        .filter(|columns| !columns.is_empty());

    sample
        .columns
        .iter()
        .filter(|col| chosen.is_none_or(|set| set.contains(col.as_str())))
        .map(String::as_str)
        .collect()
}
