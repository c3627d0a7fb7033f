//! Configuration
//!
//! Runtime knobs for saving and diagnostics, loadable from JSON:
//!
//! ```json
//! {
//!   "save_mode": "strict",
//!   "diagnostics": { "clipping": "always", "out_of_range_read": "silent" }
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::diagnostics::{DiagnosticPolicy, Diagnostics};
use crate::error::{Result, WavError};

/// What the writer does with a buffer that is not canonical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Write anyway and report a diagnostic
    #[default]
    BestEffort,
    /// Refuse to write
    Strict,
}

/// Per-kind diagnostic policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub out_of_range_read: DiagnosticPolicy,
    pub out_of_range_write: DiagnosticPolicy,
    pub clipping: DiagnosticPolicy,
    pub save_invariant: DiagnosticPolicy,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            out_of_range_read: DiagnosticPolicy::Once,
            out_of_range_write: DiagnosticPolicy::Once,
            clipping: DiagnosticPolicy::Once,
            save_invariant: DiagnosticPolicy::Always,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub save_mode: SaveMode,
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| WavError::Config {
            reason: format!("cannot read '{}': {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }

    /// Build a fresh rate limiter from the configured policies
    pub fn diagnostics(&self) -> Diagnostics {
        let d = &self.diagnostics;
        Diagnostics::with_policies(
            d.out_of_range_read,
            d.out_of_range_write,
            d.clipping,
            d.save_invariant,
        )
    }
}
