use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-table selection record.
///
/// `selected` is derived from `columns`: a table counts as selected exactly
/// when at least one of its columns is chosen. The flag is kept on the wire
/// for compatibility with stored payloads, but it is always recomputed here,
/// never trusted from input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub selected: bool,

    #[serde(default)]
    pub columns: BTreeSet<String>,
}

impl SelectionEntry {
    /// Entry with no columns chosen (the NONE state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entry for the given columns, with `selected` derived.
    pub fn from_columns(columns: BTreeSet<String>) -> Self {
        Self {
            selected: !columns.is_empty(),
            columns,
        }
    }

    /// Recompute `selected` from `columns`.
    pub fn normalized(mut self) -> Self {
        self.selected = !self.columns.is_empty();
        self
    }

    /// True when `selected` agrees with the column set.
    pub fn is_consistent(&self) -> bool {
        self.selected == !self.columns.is_empty()
    }
}

/// Working map of which columns of which tables are chosen for export.
///
/// Keys are qualified `"{schema}.{table}"` names. Key order carries no
/// meaning; an `IndexMap` is used so iteration stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedSchema {
    entries: IndexMap<String, SelectionEntry>,
}

impl SelectedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, full_name: &str) -> Option<&SelectionEntry> {
        self.entries.get(full_name)
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.entries.contains_key(full_name)
    }

    /// Insert an entry, normalizing `selected` on the way in.
    pub fn insert(&mut self, full_name: impl Into<String>, entry: SelectionEntry) {
        self.entries.insert(full_name.into(), entry.normalized());
    }

    pub fn remove(&mut self, full_name: &str) -> Option<SelectionEntry> {
        self.entries.shift_remove(full_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectionEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Replace the entry for `full_name` with the result of `f`.
    ///
    /// Other entries are untouched; the absent case is passed as `None` so
    /// "no entry" and "empty entry" behave identically.
    pub fn update(
        &mut self,
        full_name: &str,
        f: impl FnOnce(Option<&SelectionEntry>) -> SelectionEntry,
    ) {
        let next = f(self.entries.get(full_name)).normalized();
        self.entries.insert(full_name.to_string(), next);
    }

    /// True when every entry satisfies the selected/columns invariant.
    pub fn is_consistent(&self) -> bool {
        self.entries.values().all(SelectionEntry::is_consistent)
    }
}

impl FromIterator<(String, SelectionEntry)> for SelectedSchema {
    fn from_iter<I: IntoIterator<Item = (String, SelectionEntry)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (name, entry) in iter {
            selection.insert(name, entry);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selected_is_derived_from_columns() {
        assert!(!SelectionEntry::empty().selected);
        assert!(SelectionEntry::from_columns(cols(&["id"])).selected);
        assert!(!SelectionEntry::from_columns(BTreeSet::new()).selected);
    }

    #[test]
    fn insert_normalizes_inconsistent_entries() {
        let mut selection = SelectedSchema::new();
        selection.insert(
            "public.users",
            SelectionEntry {
                selected: true,
                columns: BTreeSet::new(),
            },
        );
        assert!(!selection.get("public.users").unwrap().selected);
        assert!(selection.is_consistent());
    }

    #[test]
    fn wire_shape_is_a_plain_map() {
        let mut selection = SelectedSchema::new();
        selection.insert(
            "public.users",
            SelectionEntry::from_columns(cols(&["name", "id"])),
        );

        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "public.users": { "selected": true, "columns": ["id", "name"] }
            })
        );

        let back: SelectedSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, selection);
    }

    #[test]
    fn deserialized_duplicate_columns_collapse() {
        let back: SelectedSchema = serde_json::from_str(
            r#"{"public.users": {"selected": true, "columns": ["id", "id", "name"]}}"#,
        )
        .unwrap();
        assert_eq!(back.get("public.users").unwrap().columns.len(), 2);
    }

    #[test]
    fn update_treats_absent_as_empty() {
        let mut selection = SelectedSchema::new();
        selection.update("public.users", |prev| {
            assert!(prev.is_none());
            SelectionEntry::from_columns(cols(&["id"]))
        });
        assert!(selection.get("public.users").unwrap().selected);
    }
}
