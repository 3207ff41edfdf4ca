use crate::{
    SampleData, SchemaSnapshot, SelectedSchema, SelectionEntry, TriState, clean, reconcile,
};
use uuid::Uuid;

/// Identity of an in-flight fetch.
///
/// Responses carry the token issued when the request started; the store
/// discards any response whose token is no longer current (the user switched
/// connection or focus, or a newer request superseded it). The transport is
/// never aborted, the answer is just ignored on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(Uuid);

impl RequestToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Page-level lifecycle of the selection editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Schema fetch in flight. Entered on open, retry, and refresh.
    Loading,

    /// Schema present. `dirty` tracks unsaved edits.
    Loaded { dirty: bool },

    /// Save in flight. Toggles are ignored until it resolves.
    Saving,

    /// Schema fetch failed. Resolved only by an explicit retry; any
    /// previously held selection is kept.
    Error { message: String },
}

impl PageState {
    pub fn is_dirty(&self) -> bool {
        matches!(self, PageState::Loaded { dirty: true })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PageState::Loaded { .. })
    }
}

impl Default for PageState {
    fn default() -> Self {
        PageState::Loading
    }
}

/// Closed set of events the store reacts to.
///
/// Both UI entry points (tree checkbox and detail header checkbox) funnel
/// through `ToggleColumn`/`ToggleTableAll`, so the two views can never
/// disagree about an entry.
#[derive(Debug, Clone)]
pub enum SelectionAction {
    ToggleColumn {
        full_name: String,
        column: String,
    },
    ToggleTableAll {
        full_name: String,
    },
    SetFocusedTable {
        full_name: Option<String>,
    },
    StartLoading {
        token: RequestToken,
    },
    ReceiveSchema {
        token: RequestToken,
        snapshot: SchemaSnapshot,
    },
    ReceiveSavedSelection {
        token: RequestToken,
        selection: SelectedSchema,
    },
    ReceiveSamples {
        token: RequestToken,
        full_name: String,
        sample: SampleData,
    },
    FetchFailed {
        token: RequestToken,
        message: String,
    },
    SaveRequested,
    SaveSucceeded,
    SaveFailed {
        message: String,
    },
    SwitchConnection {
        connection_id: String,
        token: RequestToken,
    },
}

/// Single-writer state holder for the selection editor.
///
/// All mutation goes through `apply`; readers see a consistent value between
/// applications. The selected/columns invariant is enforced here centrally,
/// callers cannot construct an inconsistent entry through any action.
#[derive(Debug, Default)]
pub struct SelectionStore {
    connection_id: Option<String>,
    snapshot: Option<SchemaSnapshot>,
    selection: SelectedSchema,
    saved_selection: Option<SelectedSchema>,
    focused_table: Option<String>,
    focused_sample: Option<SampleData>,
    page: PageState,
    fetch_token: RequestToken,
    sample_token: RequestToken,
    last_save_error: Option<String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn snapshot(&self) -> Option<&SchemaSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn selection(&self) -> &SelectedSchema {
        &self.selection
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn focused_table(&self) -> Option<&str> {
        self.focused_table.as_deref()
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    /// Tri-state for a table, by qualified name. Unknown tables are `None`.
    pub fn tri_state(&self, full_name: &str) -> TriState {
        match self
            .snapshot
            .as_ref()
            .and_then(|s| s.table_by_full_name(full_name))
        {
            Some(table) => TriState::of(table, self.selection.get(full_name)),
            None => TriState::None,
        }
    }

    /// Sample data for the focused table: a separately fetched preview wins
    /// over whatever arrived embedded in the snapshot.
    pub fn focused_sample(&self) -> Option<&SampleData> {
        if self.focused_sample.is_some() {
            return self.focused_sample.as_ref();
        }
        let full_name = self.focused_table.as_deref()?;
        self.snapshot
            .as_ref()
            .and_then(|s| s.table_by_full_name(full_name))
            .and_then(|t| t.sample.as_ref())
    }

    /// Current fetch token, for pairing responses with requests.
    pub fn fetch_token(&self) -> RequestToken {
        self.fetch_token
    }

    /// Current sample-fetch token.
    pub fn sample_token(&self) -> RequestToken {
        self.sample_token
    }

    /// Issue a fresh sample-fetch token, invalidating any in-flight one.
    pub fn issue_sample_token(&mut self) -> RequestToken {
        self.sample_token = RequestToken::new();
        self.sample_token
    }

    /// Minimal payload for persistence.
    pub fn cleaned(&self) -> SelectedSchema {
        clean(&self.selection)
    }

    /// Apply one action. Mutations are synchronous; entries other than the
    /// targeted one are never rebuilt.
    pub fn apply(&mut self, action: SelectionAction) {
        match action {
            SelectionAction::ToggleColumn { full_name, column } => {
                self.toggle_column(&full_name, &column);
            }
            SelectionAction::ToggleTableAll { full_name } => {
                self.toggle_table_all(&full_name);
            }
            SelectionAction::SetFocusedTable { full_name } => {
                if self.focused_table != full_name {
                    self.focused_table = full_name;
                    self.focused_sample = None;
                    // Any preview still in flight is for the old table.
                    self.sample_token = RequestToken::new();
                }
            }
            SelectionAction::StartLoading { token } => {
                self.fetch_token = token;
                self.page = PageState::Loading;
            }
            SelectionAction::ReceiveSchema { token, snapshot } => {
                if token != self.fetch_token {
                    log::debug!("Discarding schema response for superseded request");
                    return;
                }

                let prior = self
                    .saved_selection
                    .take()
                    .unwrap_or_else(|| self.selection.clone());
                self.selection = reconcile(&snapshot, &prior);
                self.snapshot = Some(snapshot);
                self.focused_sample = None;
                self.page = PageState::Loaded { dirty: false };
            }
            SelectionAction::ReceiveSavedSelection { token, selection } => {
                if token != self.fetch_token {
                    log::debug!("Discarding saved selection for superseded request");
                    return;
                }

                match &self.snapshot {
                    // Schema already arrived for this load: reconcile now.
                    Some(snapshot) if self.page.is_loaded() => {
                        self.selection = reconcile(snapshot, &selection);
                    }
                    // Schema still in flight: hold until ReceiveSchema.
                    _ => self.saved_selection = Some(selection),
                }
            }
            SelectionAction::ReceiveSamples {
                token,
                full_name,
                sample,
            } => {
                if token != self.sample_token {
                    log::debug!("Discarding sample rows for superseded request");
                    return;
                }
                if self.focused_table.as_deref() != Some(full_name.as_str()) {
                    log::debug!("Discarding sample rows for no-longer-focused {}", full_name);
                    return;
                }
                self.focused_sample = Some(sample);
            }
            SelectionAction::FetchFailed { token, message } => {
                if token != self.fetch_token {
                    return;
                }
                // Non-destructive: keep snapshot and selection as they were.
                self.page = PageState::Error { message };
            }
            SelectionAction::SaveRequested => {
                if self.page.is_loaded() {
                    self.last_save_error = None;
                    self.page = PageState::Saving;
                }
            }
            SelectionAction::SaveSucceeded => {
                if self.page == PageState::Saving {
                    self.page = PageState::Loaded { dirty: false };
                }
            }
            SelectionAction::SaveFailed { message } => {
                if self.page == PageState::Saving {
                    // Local edits survive a failed save.
                    self.last_save_error = Some(message);
                    self.page = PageState::Loaded { dirty: true };
                }
            }
            SelectionAction::SwitchConnection {
                connection_id,
                token,
            } => {
                self.connection_id = Some(connection_id);
                self.snapshot = None;
                self.selection = SelectedSchema::new();
                self.saved_selection = None;
                self.focused_table = None;
                self.focused_sample = None;
                self.last_save_error = None;
                self.fetch_token = token;
                self.sample_token = RequestToken::new();
                self.page = PageState::Loading;
            }
        }

        debug_assert!(self.selection.is_consistent());
    }

    fn toggle_column(&mut self, full_name: &str, column: &str) {
        let Some(table) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.table_by_full_name(full_name))
        else {
            log::debug!("Ignoring column toggle for unknown table {}", full_name);
            return;
        };

        if !self.page.is_loaded() {
            return;
        }

        if !table.has_column(column) {
            log::debug!("Ignoring toggle for unknown column {}.{}", full_name, column);
            return;
        }

        self.selection.update(full_name, |prev| {
            let mut columns = prev.map(|e| e.columns.clone()).unwrap_or_default();
            if !columns.remove(column) {
                columns.insert(column.to_string());
            }
            SelectionEntry::from_columns(columns)
        });

        self.page = PageState::Loaded { dirty: true };
    }

    /// A partial selection resolves upward: NONE and SOME both toggle to ALL,
    /// only ALL toggles back to nothing.
    fn toggle_table_all(&mut self, full_name: &str) {
        let Some(table) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.table_by_full_name(full_name))
        else {
            log::debug!("Ignoring table toggle for unknown table {}", full_name);
            return;
        };

        if !self.page.is_loaded() {
            return;
        }

        let next = match TriState::of(table, self.selection.get(full_name)) {
            TriState::All => SelectionEntry::empty(),
            TriState::None | TriState::Some => {
                SelectionEntry::from_columns(table.column_names().map(str::to_string).collect())
            }
        };

        self.selection.update(full_name, |_| next);
        self.page = PageState::Loaded { dirty: true };
    }
}
