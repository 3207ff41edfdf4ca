use crate::{SelectedSchema, SelectionEntry};

/// Strip a working selection down to the minimal payload for persistence.
///
/// Only entries with at least one chosen column survive. This is the
/// data-minimization boundary: untouched and fully-deselected tables are
/// never part of the transmitted payload, even if stale in-memory state
/// still claims `selected: true` on an empty column set.
pub fn clean(selection: &SelectedSchema) -> SelectedSchema {
    selection
        .iter()
        .filter(|(_, entry)| is_transmittable(entry))
        .map(|(name, entry)| (name.to_string(), entry.clone()))
        .collect()
}

/// True when `clean` would return the entry unchanged.
pub fn is_transmittable(entry: &SelectionEntry) -> bool {
    entry.selected && !entry.columns.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entry(columns: &[&str]) -> SelectionEntry {
        SelectionEntry::from_columns(columns.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_entries_are_omitted() {
        let mut selection = SelectedSchema::new();
        selection.insert("public.users", entry(&["id", "name"]));
        selection.insert("public.orders", entry(&[]));

        let cleaned = clean(&selection);
        assert_eq!(cleaned.len(), 1);
        assert!(cleaned.contains("public.users"));
        assert!(!cleaned.contains("public.orders"));
    }

    #[test]
    fn inconsistent_selected_flag_does_not_leak() {
        // A raw wire payload can claim selected=true on an empty set; the
        // cleaner must not emit it.
        let selection: SelectedSchema =
            serde_json::from_str(r#"{"public.users": {"selected": true, "columns": []}}"#).unwrap();

        assert!(clean(&selection).is_empty());
    }

    #[test]
    fn cleaning_never_emits_empty_columns() {
        let mut selection = SelectedSchema::new();
        selection.insert("public.a", entry(&["x"]));
        selection.insert(
            "public.b",
            SelectionEntry {
                selected: true,
                columns: BTreeSet::new(),
            },
        );
        selection.insert("public.c", entry(&[]));

        for (_, e) in clean(&selection).iter() {
            assert!(!e.columns.is_empty());
            assert!(e.selected);
        }
    }
}
