use crate::error::AppError;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Key-value store kept in a single JSON file.
///
/// Every `get` reads the file and every `set` re-reads, updates one key and
/// writes it back, so several handles on the same path stay consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("tasklist").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tasklist")
            .join(STORE_FILE_NAME))
    }
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Opens the store at the default location (see [`store_path`]).
    pub fn open_default() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::persistence(format!("{}: {}", self.path.display(), err)))?;
        let stored: StoredEntries = serde_json::from_str(&content).map_err(|err| {
            AppError::invalid_data(format!("invalid JSON in {}: {}", self.path.display(), err))
        })?;

        if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
            return Err(AppError::invalid_data("schema_version mismatch"));
        }

        Ok(stored.entries)
    }

    fn save_entries(&self, entries: BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| AppError::persistence(err.to_string()))?;
        }

        let stored = StoredEntries {
            schema_version: SCHEMA_VERSION,
            entries,
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|err| AppError::persistence(err.to_string()))?;
        std::fs::write(&self.path, content).map_err(|err| AppError::persistence(err.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::persistence(err.to_string()))?;
        }

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.load_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.load_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.save_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileStore, SCHEMA_VERSION};
    use crate::storage::KeyValueStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let store = JsonFileStore::new(temp_path("missing.json"));
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn set_then_get_across_handles() {
        let path = temp_path("round-trip.json");
        let mut writer = JsonFileStore::new(&path);
        writer.set("tasks", "[]").unwrap();

        let mut other = JsonFileStore::new(&path);
        other.set("view", "{}").unwrap();

        let reader = JsonFileStore::new(&path);
        let tasks = reader.get("tasks").unwrap();
        let view = reader.get("view").unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(tasks.as_deref(), Some("[]"));
        assert_eq!(view.as_deref(), Some("{}"));
    }

    #[test]
    fn set_creates_parent_directories() {
        let dir = temp_path("nested-dir");
        let path = dir.join("inner").join("store.json");
        let mut store = JsonFileStore::new(&path);

        store.set("tasks", "[]").unwrap();
        let exists = path.exists();
        fs::remove_dir_all(&dir).ok();

        assert!(exists);
    }

    #[cfg(unix)]
    #[test]
    fn set_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("permissions.json");
        let mut store = JsonFileStore::new(&path);
        store.set("tasks", "[]").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        fs::remove_file(&path).ok();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn rejects_invalid_json() {
        let path = temp_path("bad-json.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).get("tasks").unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn set_refuses_to_overwrite_unreadable_data() {
        let path = temp_path("bad-overwrite.json");
        fs::write(&path, "garbage").unwrap();

        let err = JsonFileStore::new(&path).set("tasks", "[]").unwrap_err();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(content, "garbage");
    }

    #[test]
    fn schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"entries\": {{}}\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = JsonFileStore::new(&path).get("tasks").unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn write_failure_is_a_persistence_error() {
        let blocker = temp_path("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let mut store = JsonFileStore::new(blocker.join("store.json"));

        let err = store.set("tasks", "[]").unwrap_err();
        fs::remove_file(&blocker).ok();

        assert_eq!(err.code(), "persistence_error");
    }
}
