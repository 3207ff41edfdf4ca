mod selection_store;

pub use selection_store::SelectionFileStore;
