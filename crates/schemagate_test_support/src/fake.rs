use crate::fixtures;
use async_trait::async_trait;
use schemagate_core::{
    SampleData, SchemaFetcher, SchemaSnapshot, SelectedSchema, SelectionError, SelectionPersister,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeFetcherState {
    snapshot: Mutex<SchemaSnapshot>,
    samples: Mutex<HashMap<String, SampleData>>,
    sync_failures: Mutex<u32>,
    sample_failures: Mutex<u32>,
    sync_calls: Arc<Mutex<usize>>,
    sample_calls: Arc<Mutex<usize>>,
}

/// In-memory `SchemaFetcher` with scriptable outcomes.
///
/// Failure counters burn down: `with_sync_failures(1)` fails the first sync
/// and succeeds afterwards, which is how the retry paths are exercised.
#[derive(Clone, Default)]
pub struct FakeSchemaFetcher {
    state: Arc<FakeFetcherState>,
}

impl FakeSchemaFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(self, snapshot: SchemaSnapshot) -> Self {
        *self.state.snapshot.lock().unwrap() = snapshot;
        self
    }

    /// Register a preview for a table (unqualified name).
    pub fn with_sample(self, table: &str, columns: Vec<&str>, rows: Vec<serde_json::Value>) -> Self {
        self.state
            .samples
            .lock()
            .unwrap()
            .insert(table.to_string(), fixtures::sample(columns, rows));
        self
    }

    pub fn with_sync_failures(self, count: u32) -> Self {
        *self.state.sync_failures.lock().unwrap() = count;
        self
    }

    pub fn with_sample_failures(self, count: u32) -> Self {
        *self.state.sample_failures.lock().unwrap() = count;
        self
    }

    pub fn sync_calls(&self) -> Arc<Mutex<usize>> {
        self.state.sync_calls.clone()
    }

    pub fn sample_calls(&self) -> Arc<Mutex<usize>> {
        self.state.sample_calls.clone()
    }
}

#[async_trait]
impl SchemaFetcher for FakeSchemaFetcher {
    async fn sync(
        &self,
        connection_id: &str,
        _include_samples: bool,
        _sample_limit: u32,
    ) -> Result<SchemaSnapshot, SelectionError> {
        *self.state.sync_calls.lock().unwrap() += 1;

        let mut failures = self.state.sync_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SelectionError::FetchFailed(format!(
                "injected sync failure for {}",
                connection_id
            )));
        }

        Ok(self.state.snapshot.lock().unwrap().clone())
    }

    async fn sample(
        &self,
        _connection_id: &str,
        _schema_name: Option<&str>,
        table: &str,
        _limit: u32,
    ) -> Result<SampleData, SelectionError> {
        *self.state.sample_calls.lock().unwrap() += 1;

        let mut failures = self.state.sample_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SelectionError::SampleFailed(format!(
                "injected sample failure for {}",
                table
            )));
        }

        self.state
            .samples
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .ok_or_else(|| SelectionError::SampleFailed(format!("no sample scripted for {}", table)))
    }
}

#[derive(Default)]
struct FakePersisterState {
    saved: Mutex<HashMap<String, SelectedSchema>>,
    save_failures: Mutex<u32>,
    saves: Arc<Mutex<Vec<(String, SelectedSchema)>>>,
}

/// In-memory `SelectionPersister` recording every save it accepts.
#[derive(Clone, Default)]
pub struct FakeSelectionPersister {
    state: Arc<FakePersisterState>,
}

impl FakeSelectionPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a saved selection from its wire JSON.
    pub fn with_saved(self, connection_id: &str, json: &str) -> Self {
        self.state
            .saved
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), fixtures::selection_from_json(json));
        self
    }

    pub fn with_save_failures(self, count: u32) -> Self {
        *self.state.save_failures.lock().unwrap() = count;
        self
    }

    /// Log of accepted saves, in order.
    pub fn saves(&self) -> Arc<Mutex<Vec<(String, SelectedSchema)>>> {
        self.state.saves.clone()
    }
}

#[async_trait]
impl SelectionPersister for FakeSelectionPersister {
    async fn load(&self, connection_id: &str) -> Result<SelectedSchema, SelectionError> {
        Ok(self
            .state
            .saved
            .lock()
            .unwrap()
            .get(connection_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(
        &self,
        connection_id: &str,
        selection: &SelectedSchema,
    ) -> Result<(), SelectionError> {
        let mut failures = self.state.save_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(SelectionError::PersistFailed(format!(
                "injected save failure for {}",
                connection_id
            )));
        }
        drop(failures);

        self.state
            .saved
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), selection.clone());
        self.state
            .saves
            .lock()
            .unwrap()
            .push((connection_id.to_string(), selection.clone()));
        Ok(())
    }
}
