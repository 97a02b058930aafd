//! Extension-based file categorization.
//!
//! This module maps file extensions to category names (e.g., "images",
//! "documents"). The default table is bundled into the binary from
//! `resources/categories.json` and can be extended through the settings file.
//!
//! # Examples
//!
//! ```
//! use gniphyl::file_category::{CategoryTable, OTHERS};
//!
//! let table = CategoryTable::load().unwrap();
//! assert_eq!(table.classify("jpg"), "images");
//! assert_eq!(table.classify(".PDF"), "documents");
//! assert_eq!(table.classify("unknownext"), OTHERS);
//! ```

use crate::config::ConfigError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

/// Catch-all category for extensions no other category claims.
pub const OTHERS: &str = "others";

const BUNDLED_CATEGORIES: &str = include_str!("../resources/categories.json");

/// Immutable mapping from category name to the extensions it claims.
///
/// Categories are kept in a `BTreeMap`, so lookups walk them in alphabetical
/// order and the first category containing an extension wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl CategoryTable {
    /// Loads the category table bundled with the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigLoad` if the bundled resource is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_json(BUNDLED_CATEGORIES)
    }

    /// Parses a table from JSON of the form `{"images": ["jpg", "png"], ...}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| ConfigError::ConfigLoad {
                origin: "bundled category table".to_string(),
                reason: e.to_string(),
            })?;

        let mut table = Self {
            categories: BTreeMap::new(),
        };
        for (name, extensions) in &raw {
            validate_category_name(name).map_err(|reason| ConfigError::ConfigLoad {
                origin: "bundled category table".to_string(),
                reason,
            })?;
            table.set_category(name, extensions);
        }
        Ok(table)
    }

    /// Adds a category or replaces the extension list of an existing one.
    ///
    /// `name` is used as a folder name as is; check untrusted names with
    /// [`validate_category_name`] first.
    pub fn set_category(&mut self, name: &str, extensions: &[String]) {
        let normalized = extensions.iter().map(|ext| normalize(ext)).collect();
        self.categories.insert(name.to_string(), normalized);
    }

    /// Returns the category an extension belongs to, or [`OTHERS`].
    ///
    /// The input is lower-cased and a leading dot is ignored, so `"JPG"`,
    /// `".jpg"` and `"jpg"` classify the same way.
    pub fn classify(&self, extension: &str) -> &str {
        let ext = normalize(extension);
        self.categories
            .iter()
            .find(|(_, extensions)| extensions.contains(&ext))
            .map(|(name, _)| name.as_str())
            .unwrap_or(OTHERS)
    }

    /// Iterates category names in lookup order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns the extensions claimed by a category.
    pub fn extensions(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Checks that a category name can be used as a category folder.
///
/// The name must be a single plain path component (not empty, `.`, `..`, and
/// without separators) and must not be the reserved [`OTHERS`] name.
pub fn validate_category_name(name: &str) -> Result<(), String> {
    if name == OTHERS {
        return Err(format!("category name '{}' is reserved", OTHERS));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None)
            if part == name && !name.contains(['/', '\\']) =>
        {
            Ok(())
        }
        _ => Err(format!(
            "category name '{}' must be a single folder name",
            name
        )),
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}
