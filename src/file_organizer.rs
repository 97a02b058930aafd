//! File organization system for moving files into category directories.
//!
//! Organizing a directory happens in two steps:
//! 1. [`FileOrganizer::plan`] lists the immediate files of the directory,
//!    applies the filters, and classifies each file by extension.
//! 2. [`FileOrganizer::apply`] creates the category folders, picks a free
//!    destination name, and moves each file.
//!
//! Failures in step 2 are isolated per file: a file that cannot be moved is
//! reported and skipped while the rest of the directory is still organized.

use crate::config::{CompiledFilters, ConfigError, Settings};
use crate::file_category::CategoryTable;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// A file selected for organization and the category it will move to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Full path of the file inside the organized directory.
    pub source: PathBuf,
    /// The file name as stored on disk, used to build the destination.
    pub file_name: OsString,
    /// Lower-cased extension without the dot (empty if none).
    pub extension: String,
    /// Name of the category subdirectory.
    pub category: String,
}

/// Everything [`FileOrganizer::plan`] found in a directory.
#[derive(Debug)]
pub struct OrganizePlan {
    /// The directory being organized.
    pub directory: PathBuf,
    /// Files to move, sorted by file name.
    pub moves: Vec<PlannedMove>,
    /// Directory entries that could not be read.
    pub rejected: Vec<FileOperationError>,
}

impl OrganizePlan {
    /// Number of planned moves per category, sorted by category name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        count_categories(self.moves.iter().map(|m| m.category.as_str()))
    }
}

/// A file that was successfully moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
}

/// Result of organizing one directory.
#[derive(Debug)]
pub struct OrganizeReport {
    pub directory: PathBuf,
    pub moved: Vec<MovedFile>,
    pub skipped: Vec<FileOperationError>,
}

impl OrganizeReport {
    /// Number of files successfully moved.
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Number of moved files per category, sorted by category name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        count_categories(self.moved.iter().map(|m| m.category.as_str()))
    }
}

/// Per-file progress reported by [`FileOrganizer::apply`].
#[derive(Debug, Clone, Copy)]
pub enum FileOutcome<'a> {
    Moved(&'a MovedFile),
    Skipped(&'a FileOperationError),
}

/// Errors that stop a whole directory from being organized.
#[derive(Debug)]
pub enum OrganizeError {
    /// The directory to organize does not exist.
    DirectoryNotFound(PathBuf),
    /// The directory exists but its entries cannot be listed.
    ReadDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotFound(path) => write!(f, "{} does not exist", path.display()),
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryNotFound(_) => None,
            Self::ReadDirFailed { source, .. } => Some(source),
        }
    }
}

/// Errors for a single file. These are collected, never propagated.
#[derive(Debug)]
pub enum FileOperationError {
    /// The category folder for a file could not be created.
    CreateFolderFailed {
        file: PathBuf,
        folder: PathBuf,
        source: std::io::Error,
    },
    /// The file could not be renamed into its category folder.
    MoveFailed {
        file: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },
    /// An entry of the organized directory could not be read.
    ReadEntryFailed {
        directory: PathBuf,
        source: std::io::Error,
    },
}

impl FileOperationError {
    /// The file this error is about.
    pub fn file(&self) -> &Path {
        match self {
            Self::CreateFolderFailed { file, .. } | Self::MoveFailed { file, .. } => file,
            Self::ReadEntryFailed { directory, .. } => directory,
        }
    }
}

impl std::fmt::Display for FileOperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateFolderFailed { file, folder, source } => write!(
                f,
                "Skipping {}: failed to create folder {}: {}",
                file.display(),
                folder.display(),
                source
            ),
            Self::MoveFailed {
                file,
                destination,
                source,
            } => write!(
                f,
                "Skipping {}: failed to move to {}: {}",
                file.display(),
                destination.display(),
                source
            ),
            Self::ReadEntryFailed { directory, source } => write!(
                f,
                "Skipping an entry of {}: {}",
                directory.display(),
                source
            ),
        }
    }
}

impl std::error::Error for FileOperationError {}

/// Result type for directory-level organization.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Splits a file name at its last dot.
///
/// Returns the base name and the suffix including the dot, or an empty
/// suffix when the name has no dot.
///
/// ```
/// use gniphyl::file_organizer::split_file_name;
///
/// assert_eq!(split_file_name("report.final.pdf"), ("report.final", ".pdf"));
/// assert_eq!(split_file_name("Makefile"), ("Makefile", ""));
/// ```
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) => file_name.split_at(index),
        None => (file_name, ""),
    }
}

/// Splits a file name as stored on disk at its last dot.
///
/// Behaves like [`split_file_name`] but keeps bytes that are not valid UTF-8.
pub fn split_os_file_name(file_name: &OsStr) -> (&OsStr, &OsStr) {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;

        let bytes = file_name.as_bytes();
        match bytes.iter().rposition(|&b| b == b'.') {
            Some(index) => (
                OsStr::from_bytes(&bytes[..index]),
                OsStr::from_bytes(&bytes[index..]),
            ),
            None => (file_name, OsStr::new("")),
        }
    }
    #[cfg(not(unix))]
    {
        match file_name.to_str() {
            Some(name) => {
                let (base_name, suffix) = split_file_name(name);
                (OsStr::new(base_name), OsStr::new(suffix))
            }
            None => (file_name, OsStr::new("")),
        }
    }
}

/// Lower-cased extension of a file name, without the dot.
pub fn extension_of(file_name: &str) -> String {
    let (_, suffix) = split_file_name(file_name);
    suffix.trim_start_matches('.').to_lowercase()
}

/// Picks the first free file name in `directory`.
///
/// Tries `<base_name><suffix>` first, then `<base_name>_1<suffix>`,
/// `<base_name>_2<suffix>`, and so on. `suffix` is the extension including its
/// dot (or empty). `exists` is asked about every candidate, which keeps the
/// function independent of the real filesystem.
///
/// ```
/// use gniphyl::file_organizer::next_available_name;
/// use std::path::Path;
///
/// let taken = |p: &Path| p == Path::new("docs/file.txt") || p == Path::new("docs/file_1.txt");
/// let name = next_available_name(Path::new("docs"), "file", ".txt", taken);
/// assert_eq!(name, "file_2.txt");
/// ```
pub fn next_available_name<F>(
    directory: &Path,
    base_name: impl AsRef<OsStr>,
    suffix: impl AsRef<OsStr>,
    exists: F,
) -> OsString
where
    F: Fn(&Path) -> bool,
{
    let (base_name, suffix) = (base_name.as_ref(), suffix.as_ref());
    let candidate_with = |counter: Option<u64>| {
        let mut candidate = base_name.to_os_string();
        if let Some(counter) = counter {
            candidate.push(format!("_{}", counter));
        }
        candidate.push(suffix);
        candidate
    };

    let mut candidate = candidate_with(None);
    let mut counter = 1u64;
    while exists(&directory.join(&candidate)) {
        candidate = candidate_with(Some(counter));
        counter += 1;
    }
    candidate
}

fn count_categories<'a>(categories: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for category in categories {
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Organizes files by moving them into category subdirectories.
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    table: CategoryTable,
    filters: CompiledFilters,
}

impl FileOrganizer {
    pub fn new(table: CategoryTable, filters: CompiledFilters) -> Self {
        Self { table, filters }
    }

    /// An organizer that considers every file in the directory.
    pub fn with_table(table: CategoryTable) -> Self {
        Self::new(table, CompiledFilters::default())
    }

    /// Builds an organizer from user settings: bundled categories plus
    /// overrides, and the compiled filters.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            settings.category_table()?,
            settings.compile_filters()?,
        ))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Lists and classifies the files of `directory` without touching them.
    ///
    /// Only regular files directly inside `directory` are considered;
    /// subdirectories are never moved or descended into. Files rejected by
    /// the filters are left out of the plan.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::DirectoryNotFound` if `directory` does not
    /// exist, or `OrganizeError::ReadDirFailed` if it cannot be listed.
    pub fn plan(&self, directory: &Path) -> OrganizeResult<OrganizePlan> {
        if !directory.exists() {
            return Err(OrganizeError::DirectoryNotFound(directory.to_path_buf()));
        }

        let entries = fs::read_dir(directory).map_err(|e| OrganizeError::ReadDirFailed {
            path: directory.to_path_buf(),
            source: e,
        })?;

        let mut moves = Vec::new();
        let mut rejected = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    rejected.push(FileOperationError::ReadEntryFailed {
                        directory: directory.to_path_buf(),
                        source: e,
                    });
                    continue;
                }
            };

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let source = entry.path();
            let file_name = entry.file_name();
            // Names that are not valid UTF-8 are still moved; only matching
            // and classification see the lossy form.
            let display_name = file_name.to_string_lossy();
            let extension = extension_of(&display_name);
            if !self.filters.should_include(&display_name, &extension) {
                continue;
            }

            let category = self.table.classify(&extension).to_string();
            moves.push(PlannedMove {
                source,
                file_name,
                extension,
                category,
            });
        }

        // Directory listing order is platform-dependent.
        moves.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(OrganizePlan {
            directory: directory.to_path_buf(),
            moves,
            rejected,
        })
    }

    /// Executes a plan, calling `on_outcome` after each file.
    ///
    /// Never fails as a whole: per-file errors end up in
    /// [`OrganizeReport::skipped`].
    pub fn apply<F>(&self, plan: OrganizePlan, mut on_outcome: F) -> OrganizeReport
    where
        F: FnMut(FileOutcome<'_>),
    {
        let mut report = OrganizeReport {
            directory: plan.directory,
            moved: Vec::new(),
            skipped: Vec::new(),
        };

        for error in plan.rejected {
            on_outcome(FileOutcome::Skipped(&error));
            report.skipped.push(error);
        }

        for planned in &plan.moves {
            match Self::move_to_category(&report.directory, planned) {
                Ok(moved) => {
                    on_outcome(FileOutcome::Moved(&moved));
                    report.moved.push(moved);
                }
                Err(error) => {
                    on_outcome(FileOutcome::Skipped(&error));
                    report.skipped.push(error);
                }
            }
        }

        report
    }

    /// Plans and applies in one go.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gniphyl::file_category::CategoryTable;
    /// use gniphyl::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::with_table(CategoryTable::load().unwrap());
    /// match organizer.organize(Path::new("/home/user/Downloads")) {
    ///     Ok(report) => println!("{} files organized", report.moved_count()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(&self, directory: &Path) -> OrganizeResult<OrganizeReport> {
        let plan = self.plan(directory)?;
        Ok(self.apply(plan, |_| {}))
    }

    fn move_to_category(
        directory: &Path,
        planned: &PlannedMove,
    ) -> Result<MovedFile, FileOperationError> {
        let folder = directory.join(&planned.category);
        fs::create_dir_all(&folder).map_err(|e| FileOperationError::CreateFolderFailed {
            file: planned.source.clone(),
            folder: folder.clone(),
            source: e,
        })?;

        let (base_name, suffix) = split_os_file_name(&planned.file_name);
        let name = next_available_name(&folder, base_name, suffix, |candidate| {
            candidate.symlink_metadata().is_ok()
        });
        let destination = folder.join(name);

        fs::rename(&planned.source, &destination).map_err(|e| {
            FileOperationError::MoveFailed {
                file: planned.source.clone(),
                destination: destination.clone(),
                source: e,
            }
        })?;

        Ok(MovedFile {
            source: planned.source.clone(),
            destination,
            category: planned.category.clone(),
        })
    }
}
