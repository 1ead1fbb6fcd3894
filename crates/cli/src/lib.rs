//! Iconsmith CLI library.

pub mod cli;
pub mod commands;
pub mod io;
pub mod parallel;
pub mod project;

pub use project::{DEFAULT_CACHE_DIR, DEFAULT_PROJECT_FILE, Project, TargetEntry};
