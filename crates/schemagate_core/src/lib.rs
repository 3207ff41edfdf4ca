mod clean;
mod error;
mod reconcile;
mod schema;
mod selection;
mod session;
mod store;
mod traits;
mod tri_state;
mod view;

pub use clean::{clean, is_transmittable};
pub use error::SelectionError;
pub use reconcile::reconcile;
pub use schema::{ColumnInfo, DEFAULT_SCHEMA, SampleData, SchemaSnapshot, TableInfo};
pub use selection::{SelectedSchema, SelectionEntry};
pub use session::{DEFAULT_SAMPLE_LIMIT, SelectionSession};
pub use store::{PageState, RequestToken, SelectionAction, SelectionStore};
pub use traits::{SchemaFetcher, SelectionPersister};
pub use tri_state::TriState;
pub use view::{SchemaGroup, SelectionTab, TableRow, detail_columns, sample_columns, table_tree};
