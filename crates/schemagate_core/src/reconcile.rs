use crate::{SchemaSnapshot, SelectedSchema, SelectionEntry};
use std::collections::BTreeSet;

/// Merge a fresh schema snapshot with a previously saved selection.
///
/// Every table in the snapshot gets an entry: prior entries are intersected
/// with the table's current columns, tables never seen before get an empty
/// entry. Prior entries whose table is gone from the snapshot are dropped.
///
/// Drift (renamed or dropped tables and columns) is expected input, not a
/// failure: stale references are resolved silently and logged for
/// diagnostics. The result satisfies the selection invariants and the
/// operation is idempotent.
pub fn reconcile(snapshot: &SchemaSnapshot, prior: &SelectedSchema) -> SelectedSchema {
    let mut result = SelectedSchema::new();

    for table in &snapshot.tables {
        let full_name = snapshot.full_table_name(&table.name);

        let entry = match prior.get(&full_name) {
            Some(prev) => {
                let kept: BTreeSet<String> = prev
                    .columns
                    .iter()
                    .filter(|c| table.has_column(c))
                    .cloned()
                    .collect();

                let dropped = prev.columns.len() - kept.len();
                if dropped > 0 {
                    log::debug!(
                        "Dropped {} stale column reference(s) from selection for {}",
                        dropped,
                        full_name
                    );
                }

                SelectionEntry::from_columns(kept)
            }
            None => SelectionEntry::empty(),
        };

        result.insert(full_name, entry);
    }

    for (full_name, entry) in prior.iter() {
        if !result.contains(full_name) && !entry.columns.is_empty() {
            log::debug!("Dropped selection for vanished table {}", full_name);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnInfo, TableInfo};

    fn column(name: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            type_name: "text".into(),
            nullable: true,
            ..ColumnInfo::default()
        }
    }

    fn snapshot(tables: &[(&str, &[&str])]) -> SchemaSnapshot {
        SchemaSnapshot {
            connection_id: "conn-1".into(),
            database: "appdb".into(),
            schema_name: Some("public".into()),
            tables: tables
                .iter()
                .map(|(name, cols)| TableInfo {
                    name: name.to_string(),
                    columns: cols.iter().map(|c| column(c)).collect(),
                    sample: None,
                })
                .collect(),
        }
    }

    fn entry(columns: &[&str]) -> SelectionEntry {
        SelectionEntry::from_columns(columns.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn fresh_connection_yields_all_none_entries() {
        let snap = snapshot(&[
            ("users", &["id", "name", "email"]),
            ("orders", &["id", "user_id", "total"]),
        ]);

        let result = reconcile(&snap, &SelectedSchema::new());

        assert_eq!(result.len(), 2);
        assert!(!result.get("public.users").unwrap().selected);
        assert!(result.get("public.orders").unwrap().columns.is_empty());
    }

    #[test]
    fn prior_selection_survives_when_columns_still_exist() {
        let snap = snapshot(&[("users", &["id", "name", "email"])]);
        let mut prior = SelectedSchema::new();
        prior.insert("public.users", entry(&["id", "name"]));

        let result = reconcile(&snap, &prior);
        let users = result.get("public.users").unwrap();
        assert!(users.selected);
        assert_eq!(users.columns.len(), 2);
    }

    #[test]
    fn stale_column_is_dropped_and_selected_recomputed() {
        let snap = snapshot(&[("users", &["id", "name"])]);
        let mut prior = SelectedSchema::new();
        prior.insert("public.users", entry(&["legacy_flag"]));

        let result = reconcile(&snap, &prior);
        let users = result.get("public.users").unwrap();
        assert!(users.columns.is_empty());
        assert!(!users.selected);
    }

    #[test]
    fn vanished_table_entry_is_dropped() {
        let snap = snapshot(&[("users", &["id"])]);
        let mut prior = SelectedSchema::new();
        prior.insert("public.users", entry(&["id"]));
        prior.insert("public.retired", entry(&["anything"]));

        let result = reconcile(&snap, &prior);
        assert_eq!(result.len(), 1);
        assert!(!result.contains("public.retired"));
    }

    #[test]
    fn schema_scope_change_drops_old_prefix() {
        let mut snap = snapshot(&[("users", &["id"])]);
        snap.schema_name = Some("sales".into());

        let mut prior = SelectedSchema::new();
        prior.insert("public.users", entry(&["id"]));

        let result = reconcile(&snap, &prior);
        assert!(result.contains("sales.users"));
        assert!(result.get("sales.users").unwrap().columns.is_empty());
        assert!(!result.contains("public.users"));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let snap = snapshot(&[("users", &["id", "name"]), ("orders", &["id", "total"])]);
        let mut prior = SelectedSchema::new();
        prior.insert("public.users", entry(&["id", "legacy_flag"]));
        prior.insert("public.gone", entry(&["x"]));

        let once = reconcile(&snap, &prior);
        let twice = reconcile(&snap, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn inconsistent_wire_entry_is_normalized() {
        let snap = snapshot(&[("users", &["id"])]);
        let prior: SelectedSchema =
            serde_json::from_str(r#"{"public.users": {"selected": true, "columns": []}}"#).unwrap();

        let result = reconcile(&snap, &prior);
        assert!(result.is_consistent());
        assert!(!result.get("public.users").unwrap().selected);
    }
}
