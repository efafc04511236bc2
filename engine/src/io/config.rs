//! Engine configuration stored as TOML next to the slide documents.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::exec::InterpreterConfig;

/// Engine configuration (TOML).
///
/// Intended to be edited by humans; missing fields default to sensible
/// values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Truncate stored/printed failure traces beyond this many bytes.
    pub trace_limit_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trace_limit_bytes: 100_000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trace_limit_bytes == 0 {
            return Err(anyhow!("trace_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig {
            trace_limit_bytes: self.trace_limit_bytes,
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        let cfg = EngineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: EngineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = EngineConfig {
            trace_limit_bytes: 4_096,
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn zero_trace_limit_is_rejected() {
        let cfg = EngineConfig {
            trace_limit_bytes: 0,
        };
        assert!(cfg.validate().is_err());
    }
}
