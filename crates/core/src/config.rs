//! Build configuration

use crate::path::{CaseSensitivity, PathError, TreePath};
use crate::status::StatusPrecedence;
use serde::{Deserialize, Serialize};

/// Configuration shared by every build against the same working tree
///
/// Path keys from different case modes never mix: entries, fold policies, and
/// the commit-target table must all be built through the same config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Case mode for path keys (default: sensitive)
    pub case_sensitivity: CaseSensitivity,
    /// Display precedence for aggregated folder status
    pub precedence: StatusPrecedence,
}

impl TreeConfig {
    /// Build a path key under this config's case mode
    pub fn path(&self, raw: &str) -> Result<TreePath, PathError> {
        TreePath::new(raw, self.case_sensitivity)
    }
}
