use crate::{
    PageState, RequestToken, SchemaFetcher, SelectionAction, SelectionError, SelectionPersister,
    SelectionStore,
};
use std::sync::Arc;

/// Default number of preview rows per table, matching the sync endpoint's
/// default.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 10;

/// Drives a `SelectionStore` against the fetch and persistence seams.
///
/// All store mutation funnels through this single owner, so reducer
/// applications are serialized; readers take the store by reference between
/// calls. The session never retries on its own and never saves implicitly.
pub struct SelectionSession {
    store: SelectionStore,
    fetcher: Arc<dyn SchemaFetcher>,
    persister: Arc<dyn SelectionPersister>,
    include_samples: bool,
    sample_limit: u32,
}

impl SelectionSession {
    pub fn new(fetcher: Arc<dyn SchemaFetcher>, persister: Arc<dyn SelectionPersister>) -> Self {
        Self {
            store: SelectionStore::new(),
            fetcher,
            persister,
            include_samples: true,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub fn with_samples(mut self, include_samples: bool, sample_limit: u32) -> Self {
        self.include_samples = include_samples;
        self.sample_limit = sample_limit;
        self
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn apply(&mut self, action: SelectionAction) {
        self.store.apply(action);
    }

    /// Open a connection: reset local state, load the saved selection, fetch
    /// the schema, reconcile.
    ///
    /// A missing or unreadable saved selection degrades to empty; only the
    /// schema fetch can put the page into the error state.
    pub async fn open(&mut self, connection_id: &str) -> Result<(), SelectionError> {
        let token = RequestToken::new();
        self.store.apply(SelectionAction::SwitchConnection {
            connection_id: connection_id.to_string(),
            token,
        });

        match self.persister.load(connection_id).await {
            Ok(saved) => self.store.apply(SelectionAction::ReceiveSavedSelection {
                token,
                selection: saved,
            }),
            Err(e) => {
                log::warn!(
                    "Failed to load saved selection for {}, starting empty: {}",
                    connection_id,
                    e
                );
            }
        }

        self.fetch_schema(token).await
    }

    /// Re-fetch the schema for the current connection, keeping local edits.
    ///
    /// The reconciler folds the existing selection into the new snapshot.
    pub async fn refresh(&mut self) -> Result<(), SelectionError> {
        let token = RequestToken::new();
        self.store.apply(SelectionAction::StartLoading { token });
        self.fetch_schema(token).await
    }

    /// Explicit retry after a failed fetch. No-op unless the page shows an
    /// error.
    pub async fn retry(&mut self) -> Result<(), SelectionError> {
        if !matches!(self.store.page(), PageState::Error { .. }) {
            return Ok(());
        }
        self.refresh().await
    }

    async fn fetch_schema(&mut self, token: RequestToken) -> Result<(), SelectionError> {
        let Some(connection_id) = self.store.connection_id().map(str::to_string) else {
            return Err(SelectionError::ConnectionNotFound(String::new()));
        };

        match self
            .fetcher
            .sync(&connection_id, self.include_samples, self.sample_limit)
            .await
        {
            Ok(snapshot) => {
                self.store
                    .apply(SelectionAction::ReceiveSchema { token, snapshot });
                Ok(())
            }
            Err(e) => {
                self.store.apply(SelectionAction::FetchFailed {
                    token,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Focus a table for detail viewing and make sure it has a preview.
    ///
    /// A preview fetch failure is logged and swallowed: the preview is
    /// informational and must not disturb the page state.
    pub async fn focus_table(&mut self, full_name: &str) {
        self.store.apply(SelectionAction::SetFocusedTable {
            full_name: Some(full_name.to_string()),
        });

        if self.store.focused_sample().is_some() {
            return;
        }

        let Some(connection_id) = self.store.connection_id().map(str::to_string) else {
            return;
        };
        let Some((schema_name, table)) = full_name
            .split_once('.')
            .map(|(s, t)| (s.to_string(), t.to_string()))
        else {
            return;
        };

        let token = self.store.issue_sample_token();
        match self
            .fetcher
            .sample(&connection_id, Some(&schema_name), &table, self.sample_limit)
            .await
        {
            Ok(sample) => self.store.apply(SelectionAction::ReceiveSamples {
                token,
                full_name: full_name.to_string(),
                sample,
            }),
            Err(e) => {
                log::warn!("Failed to fetch sample rows for {}: {}", full_name, e);
            }
        }
    }

    /// Save the cleaned selection. User-triggered only.
    ///
    /// On failure the page returns to dirty with local edits intact and the
    /// error is surfaced to the caller for the retry affordance.
    pub async fn save(&mut self) -> Result<(), SelectionError> {
        if !self.store.page().is_loaded() {
            return Err(SelectionError::InvalidSelection(
                "No loaded selection to save".into(),
            ));
        }

        let Some(connection_id) = self.store.connection_id().map(str::to_string) else {
            return Err(SelectionError::ConnectionNotFound(String::new()));
        };

        let payload = self.store.cleaned();
        self.store.apply(SelectionAction::SaveRequested);

        match self.persister.save(&connection_id, &payload).await {
            Ok(()) => {
                self.store.apply(SelectionAction::SaveSucceeded);
                Ok(())
            }
            Err(e) => {
                self.store.apply(SelectionAction::SaveFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
