//! Persisted list of directories to organize.
//!
//! The registry is stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "paths": [
//!     "/home/user/Downloads"
//!   ]
//! }
//! ```
//!
//! Paths are compared as raw strings. `/a/b` and `/a/b/` are distinct entries.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Ordered, duplicate-free list of registered directory paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRegistry {
    #[serde(default)]
    paths: Vec<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry from `file`.
    ///
    /// A missing file is an empty registry, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigLoad` if the file exists but cannot be read
    /// or parsed.
    pub fn load(file: &Path) -> Result<Self, ConfigError> {
        if !file.exists() {
            return Ok(Self::new());
        }

        let load_error = |reason: String| ConfigError::ConfigLoad {
            origin: file.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(file).map_err(|e| load_error(e.to_string()))?;
        let registry: Self =
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;

        // Hand-edited files may carry duplicates; keep the first occurrence.
        let mut deduplicated = Self::new();
        for path in registry.paths {
            deduplicated.add(&path);
        }
        Ok(deduplicated)
    }

    /// Writes the registry to `file`, replacing any previous content.
    ///
    /// The JSON is written to a temporary file next to `file` and then renamed
    /// over it, so a crash mid-write never leaves a truncated registry. Missing
    /// parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigWrite` on any I/O or serialization failure.
    pub fn save(&self, file: &Path) -> Result<(), ConfigError> {
        let write_error = |reason: String| ConfigError::ConfigWrite {
            path: file.to_path_buf(),
            reason,
        };

        let parent = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;

        let json = serde_json::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| write_error(e.to_string()))?;
        writeln!(temp, "{}", json).map_err(|e| write_error(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| write_error(e.to_string()))?;
        temp.persist(file)
            .map_err(|e| write_error(e.error.to_string()))?;

        Ok(())
    }

    /// Appends `path` unless it is already registered.
    ///
    /// Returns `false` when the path was already present.
    pub fn add(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.paths.push(path.to_string());
        true
    }

    /// Removes every entry equal to `path` and returns how many were removed.
    pub fn remove(&mut self, path: &str) -> usize {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        before - self.paths.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Registered paths in insertion order.
    pub fn list(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let registry = PathRegistry::load(&temp_dir.path().join("paths.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = PathRegistry::new();
        assert!(registry.add("/home/ana/Downloads"));
        assert!(!registry.add("/home/ana/Downloads"));
        assert_eq!(registry.list(), ["/home/ana/Downloads"]);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut registry = PathRegistry::new();
        registry.add("/b");
        registry.add("/a");
        registry.add("/c");
        assert_eq!(registry.list(), ["/b", "/a", "/c"]);
    }

    #[test]
    fn test_paths_are_compared_literally() {
        let mut registry = PathRegistry::new();
        assert!(registry.add("/a/b"));
        assert!(registry.add("/a/b/"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_missing_path_leaves_registry_unchanged() {
        let mut registry = PathRegistry::new();
        registry.add("/a");
        let before = registry.clone();

        assert_eq!(registry.remove("/zzz"), 0);
        assert_eq!(registry, before);
    }

    #[test]
    fn test_remove_existing_path() {
        let mut registry = PathRegistry::new();
        registry.add("/a");
        registry.add("/b");
        assert_eq!(registry.remove("/a"), 1);
        assert_eq!(registry.list(), ["/b"]);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("nested").join("paths.json");

        let mut registry = PathRegistry::new();
        registry.add("/home/ana/Downloads");
        registry.add("C:\\Users\\ana\\Desktop");
        registry.add("/tmp/with space");
        registry.save(&file).unwrap();

        assert_eq!(PathRegistry::load(&file).unwrap(), registry);
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("paths.json");

        let mut registry = PathRegistry::new();
        registry.add("/one");
        registry.add("/two");
        registry.save(&file).unwrap();

        registry.remove("/one");
        registry.save(&file).unwrap();

        assert_eq!(PathRegistry::load(&file).unwrap().list(), ["/two"]);
        // Only the registry itself remains; the temporary file was renamed.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_reads_json_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("paths.json");
        fs::write(&file, r#"{"paths": ["/x", "/y", "/x"]}"#).unwrap();

        let registry = PathRegistry::load(&file).unwrap();
        assert_eq!(registry.list(), ["/x", "/y"]);
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("paths.json");
        fs::write(&file, "{\"paths\": [").unwrap();

        let result = PathRegistry::load(&file);
        assert!(matches!(result, Err(ConfigError::ConfigLoad { .. })));
    }

    #[test]
    fn test_save_into_unwritable_location_is_write_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A regular file where the parent directory should be.
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let result = PathRegistry::new().save(&blocker.join("paths.json"));
        assert!(matches!(result, Err(ConfigError::ConfigWrite { .. })));
    }
}
