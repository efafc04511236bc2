//! Slide document load/save with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

use crate::slide::{SlidePage, validate_invariants};

const SLIDE_SCHEMA: &str = include_str!("../../schemas/slide/v1.schema.json");

/// Load and validate a slide document from disk (schema + invariants).
pub fn load_slide(path: &Path) -> Result<SlidePage> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read slide {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse slide {}", path.display()))?;
    validate_schema(&value)?;
    let slide: SlidePage = serde_json::from_value(value)
        .with_context(|| format!("deserialize slide {}", path.display()))?;
    let errors = validate_invariants(&slide);
    if !errors.is_empty() {
        return Err(anyhow!("slide invariants failed: {}", errors.join("; ")));
    }
    Ok(slide)
}

/// Write a slide document to disk (temp file + rename).
pub fn write_slide(path: &Path, slide: &SlidePage) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(slide)?;
    buf.push('\n');
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp slide {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace slide {}", path.display()))?;
    Ok(())
}

fn validate_schema(slide: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(SLIDE_SCHEMA).context("parse embedded slide schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(slide) {
        let messages = compiled
            .iter_errors(slide)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "slide schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
