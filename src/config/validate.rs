// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawSwellConfig, SwellConfig};
use crate::errors::{Result, SwellError};

impl TryFrom<RawSwellConfig> for SwellConfig {
    type Error = crate::errors::SwellError;

    fn try_from(raw: RawSwellConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let run_timeout = match raw.run.timeout.as_deref() {
            Some(s) => Some(parse_duration(s).map_err(|e| {
                SwellError::ConfigError(format!("[run].timeout: {e}"))
            })?),
            None => None,
        };
        Ok(SwellConfig::new_unchecked(
            raw.model,
            raw.run,
            raw.build,
            run_timeout,
        ))
    }
}

fn validate_raw_config(cfg: &RawSwellConfig) -> Result<()> {
    validate_model_section(cfg)?;
    validate_run_section(cfg)?;
    validate_build_section(cfg)?;
    Ok(())
}

fn validate_model_section(cfg: &RawSwellConfig) -> Result<()> {
    let model = &cfg.model;
    for (field, value) in [
        ("dir", &model.dir),
        ("executable", &model.executable),
        ("env_script", &model.env_script),
        ("launcher", &model.launcher),
        ("logging_config", &model.logging_config),
    ] {
        ensure_single_line("model", field, value)?;
        if value.trim().is_empty() {
            return Err(SwellError::ConfigError(format!(
                "[model].{field} must not be empty"
            )));
        }
    }

    for (i, lib) in model.preload_libs.iter().enumerate() {
        if lib.trim().is_empty() {
            return Err(SwellError::ConfigError(format!(
                "[model].preload_libs[{i}] must not be empty"
            )));
        }
        // Entries are joined with ':' into LD_PRELOAD.
        if lib.contains(':') || lib.chars().any(char::is_whitespace) {
            return Err(SwellError::ConfigError(format!(
                "[model].preload_libs[{i}] ('{lib}') must not contain ':' or whitespace"
            )));
        }
    }

    Ok(())
}

fn validate_run_section(cfg: &RawSwellConfig) -> Result<()> {
    let run = &cfg.run;
    for (field, value) in [
        ("shell", &run.shell),
        ("run_control", &run.run_control),
        ("log_file", &run.log_file),
        ("restart_dir", &run.restart_dir),
    ] {
        ensure_single_line("run", field, value)?;
        if value.trim().is_empty() {
            return Err(SwellError::ConfigError(format!(
                "[run].{field} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_build_section(cfg: &RawSwellConfig) -> Result<()> {
    if cfg.build.cores_to_use_for_make == 0 {
        return Err(SwellError::ConfigError(
            "[build].cores_to_use_for_make must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn ensure_single_line(section: &str, field: &str, value: &str) -> Result<()> {
    if value.contains('\n') || value.contains('\r') || value.contains('\0') {
        return Err(SwellError::ConfigError(format!(
            "[{section}].{field} must not contain newlines"
        )));
    }
    Ok(())
}

/// Parse durations like `"500ms"`, `"30s"`, `"90m"` or `"12h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let seconds_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
