//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{DirectedVectorSpec, HarnessConfig, SampleMode};
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "parity.toml";

/// Largest admissible `fixed_point.tolerance`, in LSB units.
///
/// Twiddle rounding accounts for at most this much error per component;
/// anything looser would hide datapath defects.
pub const MAX_TOLERANCE: u32 = 2;

/// Loads and validates a `parity.toml` configuration from a directory.
pub fn load_config(dir: &Path) -> Result<HarnessConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a `parity.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(section: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        section,
        reason: reason.into(),
    }
}

/// Validates a configuration, whether parsed or built in code.
///
/// A failure here invalidates every later comparison, so callers must run
/// it before driving any vector.
pub fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    let fp = &config.fixed_point;
    if fp.width != 16 {
        return Err(invalid(
            "fixed_point",
            format!("width must be 16, got {}", fp.width),
        ));
    }
    if !fp.scale.is_power_of_two() || fp.scale > 1 << (fp.width - 1) {
        return Err(invalid(
            "fixed_point",
            format!(
                "scale must be a power of two no larger than {}, got {}",
                1u32 << (fp.width - 1),
                fp.scale
            ),
        ));
    }
    if fp.tolerance > MAX_TOLERANCE {
        return Err(invalid(
            "fixed_point",
            format!(
                "tolerance must be at most {MAX_TOLERANCE} LSB, got {}",
                fp.tolerance
            ),
        ));
    }

    let timing = &config.timing;
    if timing.latency == 0 {
        return Err(invalid("timing", "latency must be at least 1"));
    }
    if timing.reset_cycles <= timing.latency {
        return Err(invalid(
            "timing",
            format!(
                "reset_cycles ({}) must exceed latency ({})",
                timing.reset_cycles, timing.latency
            ),
        ));
    }
    if timing.sample == SampleMode::Handshake && timing.timeout_cycles < timing.latency {
        return Err(invalid(
            "timing",
            format!(
                "timeout_cycles ({}) must be at least latency ({})",
                timing.timeout_cycles, timing.latency
            ),
        ));
    }

    let lo = -(1i64 << (fp.width - 1));
    let hi = (1i64 << (fp.width - 1)) - 1;
    let stim = &config.stimulus;
    if stim.operand_min > stim.operand_max {
        return Err(invalid(
            "stimulus",
            format!(
                "operand_min ({}) exceeds operand_max ({})",
                stim.operand_min, stim.operand_max
            ),
        ));
    }
    if stim.operand_min < lo || stim.operand_max > hi {
        return Err(invalid(
            "stimulus",
            format!(
                "operand range [{}, {}] exceeds the {}-bit signed range",
                stim.operand_min, stim.operand_max, fp.width
            ),
        ));
    }

    let mem = &config.memory;
    if mem.depth == 0 {
        return Err(invalid("memory", "depth must be at least 1"));
    }
    if mem.ports != 2 {
        return Err(invalid("memory", format!("ports must be 2, got {}", mem.ports)));
    }
    if mem.data_width == 0 || mem.data_width > 64 {
        return Err(invalid(
            "memory",
            format!("data_width must be within 1..=64, got {}", mem.data_width),
        ));
    }

    for spec in &config.butterfly.directed {
        validate_directed(spec, lo..=hi, fp.width)?;
    }
    Ok(())
}

fn validate_directed(
    spec: &DirectedVectorSpec,
    range: std::ops::RangeInclusive<i64>,
    width: u32,
) -> Result<(), ConfigError> {
    let reject = |reason: String| ConfigError::Directed {
        name: spec.name.clone(),
        reason,
    };
    if spec.name.is_empty() {
        return Err(reject("name must not be empty".into()));
    }
    match (&spec.w, &spec.w_raw) {
        (Some(w), None) => {
            if w.iter().any(|c| !(-1.0..=1.0).contains(c)) {
                return Err(reject("w components must lie in [-1, 1]".into()));
            }
        }
        (None, Some(_)) => {}
        _ => return Err(reject("exactly one of w and w_raw is required".into())),
    }
    let ints = spec
        .a
        .iter()
        .chain(&spec.b)
        .chain(spec.w_raw.iter().flatten())
        .chain(spec.expect_a.iter().flatten())
        .chain(spec.expect_b.iter().flatten());
    for v in ints {
        if !range.contains(v) {
            return Err(reject(format!(
                "value {v} exceeds the {width}-bit signed range"
            )));
        }
    }
    Ok(())
}
