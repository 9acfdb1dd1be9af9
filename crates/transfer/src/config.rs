//! Slice planning limits.
//!
//! Stored as JSON so deployments can tune slice geometry without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_SLICE_COUNT, DEFAULT_MIN_SLICE_SIZE, TransferError};

/// Limits used by [`plan_slices`](crate::plan_slices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    /// Smallest slice the planner will choose, in bytes.
    #[serde(default = "default_min_slice_size")]
    pub min_slice_size: i64,
    /// Upper bound on the number of slices for one file.
    #[serde(default = "default_max_slice_count")]
    pub max_slice_count: i64,
}

fn default_min_slice_size() -> i64 {
    DEFAULT_MIN_SLICE_SIZE
}

fn default_max_slice_count() -> i64 {
    DEFAULT_MAX_SLICE_COUNT
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            min_slice_size: DEFAULT_MIN_SLICE_SIZE,
            max_slice_count: DEFAULT_MAX_SLICE_COUNT,
        }
    }
}

impl PlanConfig {
    /// Rejects non-positive limits.
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.min_slice_size <= 0 {
            return Err(TransferError::InvalidInput(format!(
                "minSliceSize must be positive (got {})",
                self.min_slice_size
            )));
        }
        if self.max_slice_count <= 0 {
            return Err(TransferError::InvalidInput(format!(
                "maxSliceCount must be positive (got {})",
                self.max_slice_count
            )));
        }
        Ok(())
    }

    /// Loads limits from a JSON file.
    ///
    /// A missing file yields the defaults. A file that cannot be parsed is
    /// logged and ignored; individual non-positive values fall back to their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, TransferError> {
        let defaults = PlanConfig::default();
        if !path.exists() {
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(path)?;
        let file = match serde_json::from_str::<PlanConfig>(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse plan config, using defaults"
                );
                return Ok(defaults);
            }
        };

        let mut config = defaults;
        if file.min_slice_size > 0 {
            config.min_slice_size = file.min_slice_size;
        }
        if file.max_slice_count > 0 {
            config.max_slice_count = file.max_slice_count;
        }
        Ok(config)
    }

    /// Writes limits as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), TransferError> {
        sliceledger_file_ops::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!(path = %path.display(), "plan config saved");
        Ok(())
    }
}
