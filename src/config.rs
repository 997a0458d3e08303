//! Batch sources file and environment overrides.
//!
//! ```json
//! {
//!   "sources": [
//!     { "type": "url", "path": "https://example.org/abi.xml" },
//!     { "type": "file", "path": "schemas/nft.xml", "outputDir": "out/nft" }
//!   ],
//!   "defaultOutputDir": "generated"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::SchemaSource;

pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Default HTTP timeout in seconds (can be overridden by env).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Output directory from `TON_ABI_OUTPUT_DIR`, if set and non-empty.
pub fn output_dir_override() -> Option<PathBuf> {
    std::env::var("TON_ABI_OUTPUT_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// HTTP timeout from `TON_ABI_HTTP_TIMEOUT_SECS`, falling back to the
/// default on absent or unparsable values.
pub fn http_timeout() -> Duration {
    let secs = std::env::var("TON_ABI_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Explicit flag, then environment, then the built-in default.
pub fn resolve_output_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(output_dir_override)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl SourceEntry {
    /// Relative file paths are taken relative to `base_dir`, normally the
    /// directory holding the sources file.
    pub fn source(&self, base_dir: &Path) -> SchemaSource {
        match self.kind {
            SourceKind::Url => SchemaSource::Url(self.path.clone()),
            SourceKind::File => {
                let path = PathBuf::from(&self.path);
                if path.is_absolute() {
                    SchemaSource::File(path)
                } else {
                    SchemaSource::File(base_dir.join(path))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesConfig {
    pub sources: Vec<SourceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_dir: Option<PathBuf>,
}

impl SourcesConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid sources config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sources config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Entry override, then the config default, then env and built-in
    /// defaults.
    pub fn output_dir_for(&self, entry: &SourceEntry) -> PathBuf {
        entry
            .output_dir
            .clone()
            .or_else(|| self.default_output_dir.clone())
            .unwrap_or_else(|| resolve_output_dir(None))
    }
}
