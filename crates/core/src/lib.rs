//! Core types for status-tree construction
//!
//! This crate provides:
//! - Normalized, comparable path keys (`TreePath`)
//! - Working-tree status model (`StatusFlag`, `StatusSet`, `StatusEntry`)
//! - Shared build configuration (`TreeConfig`)

pub mod config;
pub mod path;
pub mod status;

// Re-exports
pub use config::TreeConfig;
pub use path::{CaseSensitivity, PathError, TreePath};
pub use status::{StatusEntry, StatusFlag, StatusPrecedence, StatusSet};
