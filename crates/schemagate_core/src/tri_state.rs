use crate::{SelectionEntry, TableInfo};

/// Aggregate selection state for one table's columns.
///
/// Drives both the per-table indicator in the tree view and the "select all
/// columns" header checkbox of the focused table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    None,
    Some,
    All,
}

impl TriState {
    /// Derive the state from a table and its (possibly absent) entry.
    ///
    /// No entry means nothing selected; an empty table can never be `All`.
    pub fn of(table: &TableInfo, entry: Option<&SelectionEntry>) -> TriState {
        let chosen = entry.map(|e| e.columns.len()).unwrap_or(0);

        if chosen == 0 {
            TriState::None
        } else if chosen == table.columns.len() {
            TriState::All
        } else {
            TriState::Some
        }
    }

    /// Whether a checkbox rendering this state shows as checked.
    pub fn is_checked(self) -> bool {
        matches!(self, TriState::All)
    }

    /// Whether a checkbox rendering this state shows the indeterminate mark.
    pub fn is_indeterminate(self) -> bool {
        matches!(self, TriState::Some)
    }
}
