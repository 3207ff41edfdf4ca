use crate::{SampleData, SchemaSnapshot, SelectedSchema, SelectionError};
use async_trait::async_trait;

/// Retrieves read-only schema snapshots for a connection.
///
/// The transport behind this (REST, gRPC, direct driver) is a collaborator's
/// concern; implementations return parsed, typed data or a typed failure.
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Fetch a full snapshot of the connection's schema.
    ///
    /// When `include_samples` is set, tables may carry a bounded preview of
    /// at most `sample_limit` rows each.
    async fn sync(
        &self,
        connection_id: &str,
        include_samples: bool,
        sample_limit: u32,
    ) -> Result<SchemaSnapshot, SelectionError>;

    /// Fetch a fresh preview for a single table.
    ///
    /// Used when the user focuses a table whose snapshot carries no sample.
    async fn sample(
        &self,
        connection_id: &str,
        schema_name: Option<&str>,
        table: &str,
        limit: u32,
    ) -> Result<SampleData, SelectionError>;
}

/// Loads and saves a connection's persisted selection.
#[async_trait]
pub trait SelectionPersister: Send + Sync {
    /// Load the saved selection. Empty on first use, never an error for
    /// "nothing saved yet".
    async fn load(&self, connection_id: &str) -> Result<SelectedSchema, SelectionError>;

    /// Save a cleaned selection. Resubmitting an identical payload is a
    /// no-op on the receiving side.
    async fn save(
        &self,
        connection_id: &str,
        selection: &SelectedSchema,
    ) -> Result<(), SelectionError>;
}
