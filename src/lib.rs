//! gniphyl - keep registered folders tidy
//!
//! This library provides the pieces behind the `gniphyl` command: a category
//! table that maps file extensions to folder names, a persisted registry of
//! directories, and an organizer that moves each file of a directory into the
//! subfolder of its category.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod registry;

pub use config::{CompiledFilters, ConfigError, ConfigLocation, Settings};
pub use file_category::{CategoryTable, OTHERS, validate_category_name};
pub use file_organizer::{
    FileOperationError, FileOrganizer, OrganizeError, OrganizeReport, next_available_name,
};
pub use registry::PathRegistry;

pub use cli::{Cli, Command, run_command};
