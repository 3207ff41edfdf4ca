pub mod fake;
pub mod fixtures;

pub use fake::{FakeSchemaFetcher, FakeSelectionPersister};
pub use fixtures::{
    column, pk_column, sample, selection_from_json, snapshot, table, users_orders_snapshot,
};
