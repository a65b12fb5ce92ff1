//! Engine tuning knobs, loadable from TOML.
//!
//! ```toml
//! validation_debounce_ms = 300
//! ignored_paths = ["status", "metadata.resourceVersion"]
//!
//! [diff]
//! max_lines = 10000
//!
//! [highlight]
//! fade_ms = 1000
//! ```
//!
//! Every field is optional; missing fields keep their defaults.

use std::path::Path as FsPath;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::highlight::HighlightConfig;
use crate::line_diff::DiffLimits;
use crate::path_diff::{IgnoredPaths, DEFAULT_IGNORED_PATHS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub diff: DiffLimits,
    pub highlight: HighlightConfig,
    /// Delay between the last local edit and the validity check.
    pub validation_debounce_ms: u64,
    /// Server-managed path prefixes, dotted (`metadata.resourceVersion`).
    pub ignored_paths: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diff: DiffLimits::default(),
            highlight: HighlightConfig::default(),
            validation_debounce_ms: 500,
            ignored_paths: DEFAULT_IGNORED_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(src).map_err(|e| EngineError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<FsPath>) -> EngineResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&src)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    fn check(&self) -> EngineResult<()> {
        if self.diff.max_changed == 0 {
            return Err(EngineError::Config("diff.max_changed must be positive".into()));
        }
        if self.ignored_paths.iter().any(|p| p.is_empty()) {
            return Err(EngineError::Config("ignored_paths may not contain the root path".into()));
        }
        Ok(())
    }

    pub fn ignored(&self) -> IgnoredPaths {
        IgnoredPaths::from_dotted(self.ignored_paths.iter().map(String::as_str))
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.diff.max_lines, 20_000);
        assert_eq!(config.diff.max_ops, 250_000);
        assert_eq!(config.diff.lookahead, 40);
        assert_eq!(config.diff.max_changed, 1_000);
        assert_eq!(config.highlight.max_lines, 200);
        assert_eq!(config.highlight.fade_ms, 2_500);
        assert_eq!(config.ignored_paths.len(), 6);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            "validation_debounce_ms = 100\n[highlight]\nfade_ms = 10\n",
        )
        .unwrap();
        assert_eq!(config.validation_debounce(), Duration::from_millis(100));
        assert_eq!(config.highlight.fade_ms, 10);
        assert_eq!(config.highlight.max_lines, 200);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = EngineConfig::from_toml_str("bogus = 1").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn zero_changed_cap_rejected() {
        assert!(EngineConfig::from_toml_str("[diff]\nmax_changed = 0\n").is_err());
    }

    #[test]
    fn custom_ignored_paths() {
        let config = EngineConfig::from_toml_str("ignored_paths = [\"spec.paused\"]").unwrap();
        let ignored = config.ignored();
        assert!(ignored.contains(&livedoc_path::parse_dotted("spec.paused.x")));
        assert!(!ignored.contains(&livedoc_path::parse_dotted("status")));
    }
}
