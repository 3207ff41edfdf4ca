use async_trait::async_trait;
use schemagate_core::{SelectedSchema, SelectionError, SelectionPersister};
use std::fs;
use std::path::PathBuf;

/// File-backed persistence for per-connection selections.
///
/// One JSON file per connection under `<config>/schemagate/selections/`.
/// A missing file means "nothing saved yet"; a corrupted file is logged and
/// treated the same, so a bad write can never block the selection editor.
pub struct SelectionFileStore {
    root: PathBuf,
}

impl SelectionFileStore {
    /// Creates a store rooted at the platform config directory.
    pub fn new() -> Result<Self, SelectionError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SelectionError::IoError(std::io::Error::other("Could not find config directory"))
        })?;

        let root = config_dir.join("schemagate").join("selections");
        fs::create_dir_all(&root).map_err(SelectionError::IoError)?;

        Ok(Self { root })
    }

    /// Creates a store rooted at an explicit directory. Used by tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self, SelectionError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(SelectionError::IoError)?;
        Ok(Self { root })
    }

    fn path_for(&self, connection_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(connection_id)))
    }
}

/// Map a connection id to a filesystem-safe file stem.
fn sanitize(connection_id: &str) -> String {
    connection_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SelectionPersister for SelectionFileStore {
    async fn load(&self, connection_id: &str) -> Result<SelectedSchema, SelectionError> {
        let path = self.path_for(connection_id);
        if !path.exists() {
            return Ok(SelectedSchema::new());
        }

        let content = fs::read_to_string(&path).map_err(SelectionError::IoError)?;

        match serde_json::from_str::<SelectedSchema>(&content) {
            Ok(selection) => Ok(selection),
            Err(e) => {
                log::warn!(
                    "Failed to parse saved selection for {} ({}), starting empty",
                    connection_id,
                    e
                );
                Ok(SelectedSchema::new())
            }
        }
    }

    async fn save(
        &self,
        connection_id: &str,
        selection: &SelectedSchema,
    ) -> Result<(), SelectionError> {
        let content = serde_json::to_string_pretty(selection)
            .map_err(|e| SelectionError::PersistFailed(e.to_string()))?;

        fs::write(self.path_for(connection_id), content).map_err(SelectionError::IoError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagate_core::SelectionEntry;

    fn temp_store() -> (tempfile::TempDir, SelectionFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SelectionFileStore::with_root(dir.path().join("selections")).unwrap();
        (dir, store)
    }

    fn selection() -> SelectedSchema {
        let mut sel = SelectedSchema::new();
        sel.insert(
            "public.users",
            SelectionEntry::from_columns(
                ["id".to_string(), "name".to_string()].into_iter().collect(),
            ),
        );
        sel
    }

    #[tokio::test]
    async fn roundtrip() {
        let (_dir, store) = temp_store();

        store.save("conn-1", &selection()).await.unwrap();
        let loaded = store.load("conn-1").await.unwrap();
        assert_eq!(loaded, selection());
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load("never-saved").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let (_dir, store) = temp_store();
        fs::write(store.path_for("conn-1"), "{not json").unwrap();

        assert!(store.load("conn-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn connections_are_isolated() {
        let (_dir, store) = temp_store();
        store.save("conn-1", &selection()).await.unwrap();

        assert!(store.load("conn-2").await.unwrap().is_empty());
        assert_eq!(store.load("conn-1").await.unwrap(), selection());
    }

    #[tokio::test]
    async fn hostile_connection_ids_stay_inside_the_root() {
        let (_dir, store) = temp_store();
        store.save("../escape", &selection()).await.unwrap();

        let path = store.path_for("../escape");
        assert!(path.starts_with(&store.root));
        assert_eq!(store.load("../escape").await.unwrap(), selection());
    }

    #[tokio::test]
    async fn resaving_identical_payload_is_a_noop() {
        let (_dir, store) = temp_store();
        store.save("conn-1", &selection()).await.unwrap();
        let first = fs::read_to_string(store.path_for("conn-1")).unwrap();

        store.save("conn-1", &selection()).await.unwrap();
        let second = fs::read_to_string(store.path_for("conn-1")).unwrap();
        assert_eq!(first, second);
    }
}
