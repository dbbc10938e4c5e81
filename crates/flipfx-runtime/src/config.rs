#![forbid(unsafe_code)]

//! Toggle configuration from environment variables.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `FLIPFX_EFFECTS` | comma list of effects in the rotation, or `all` | `all` |
//! | `FLIPFX_WATCHDOG_MS` | safety timeout; must exceed the longest enabled effect | `3000` |
//! | `FLIPFX_REDUCED_MOTION` | force the no-animation path | `false` |
//! | `FLIPFX_SEED` | RNG seed, decimal or `0x` hex | built-in |
//!
//! Parsing never fails: each bad value is reported as a
//! [`ToggleConfigError`] and the field keeps its default.

use std::env;
use std::fmt;
use std::time::Duration;

use flipfx_effects::protocol::DEFAULT_SEED;
use flipfx_effects::{EffectKind, EffectSet};

pub const ENV_EFFECTS: &str = "FLIPFX_EFFECTS";
pub const ENV_WATCHDOG_MS: &str = "FLIPFX_WATCHDOG_MS";
pub const ENV_REDUCED_MOTION: &str = "FLIPFX_REDUCED_MOTION";
pub const ENV_SEED: &str = "FLIPFX_SEED";

/// Safety timeout used unless overridden.
pub const DEFAULT_WATCHDOG: Duration = Duration::from_millis(3000);

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleConfig {
    /// Effects in the rotation, in rotation order.
    pub effects: EffectSet,
    /// Safety timeout after which a session is force-finished.
    pub watchdog: Duration,
    /// Skip all animation regardless of the platform signal.
    pub force_reduced_motion: bool,
    /// Base seed; each session derives its own from it.
    pub seed: u32,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            effects: EffectSet::all(),
            watchdog: DEFAULT_WATCHDOG,
            force_reduced_motion: false,
            seed: DEFAULT_SEED,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct ToggleConfigParse {
    pub config: ToggleConfig,
    pub errors: Vec<ToggleConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ToggleConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ToggleConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ToggleConfigError {}

impl ToggleConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> ToggleConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ToggleConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ToggleConfigError>> {
        let mut errors = Vec::new();
        if self.effects.is_empty() {
            errors.push(ToggleConfigError::new(
                "effects",
                "",
                "at least one effect must be enabled",
            ));
        }
        let longest = self.effects.longest_duration();
        if self.watchdog <= longest {
            errors.push(ToggleConfigError::new(
                "watchdog_ms",
                self.watchdog.as_millis().to_string(),
                format!("must exceed the longest enabled effect ({} ms)", longest.as_millis()),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Replace invalid fields with their defaults, returning what was fixed.
    ///
    /// The effect set is repaired first, so the watchdog is checked against
    /// the set that will actually run.
    #[must_use]
    pub fn sanitize(mut self) -> (Self, Vec<ToggleConfigError>) {
        let mut errors = Vec::new();
        if self.effects.is_empty() {
            errors.push(ToggleConfigError::new(
                "effects",
                "",
                "at least one effect must be enabled",
            ));
            self.effects = EffectSet::all();
        }
        if let Err(mut rest) = self.validate() {
            if rest.iter().any(|e| e.field == "watchdog_ms") {
                self.watchdog = DEFAULT_WATCHDOG;
            }
            errors.append(&mut rest);
        }
        (self, errors)
    }

    /// Short human-readable summary for debug overlays.
    #[must_use]
    pub fn summary_short(&self) -> String {
        let effects: Vec<&str> = self.effects.kinds().map(EffectKind::token).collect();
        let motion = if self.force_reduced_motion { "reduced" } else { "full" };
        format!(
            "flipfx: {} · watchdog {}ms · motion {motion} · seed {:#x}",
            effects.join(","),
            self.watchdog.as_millis(),
            self.seed
        )
    }
}

fn from_env_with<F>(mut get: F) -> ToggleConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = ToggleConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_EFFECTS) {
        let (set, mut bad) = parse_effects(&value);
        errors.append(&mut bad);
        if set.is_empty() {
            errors.push(ToggleConfigError::new(
                "effects",
                value,
                "no known effects listed; using all",
            ));
        } else {
            config.effects = set;
        }
    }

    if let Some(value) = get(ENV_WATCHDOG_MS) {
        match value.trim().parse::<u64>() {
            Ok(ms) => config.watchdog = Duration::from_millis(ms),
            Err(_) => errors.push(ToggleConfigError::new(
                "watchdog_ms",
                value,
                "expected milliseconds (u64)",
            )),
        }
    }

    if let Some(value) = get(ENV_REDUCED_MOTION) {
        match parse_bool(&value) {
            Some(parsed) => config.force_reduced_motion = parsed,
            None => errors.push(ToggleConfigError::new(
                "reduced_motion",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Some(value) = get(ENV_SEED) {
        match parse_seed(&value) {
            Some(parsed) => config.seed = parsed,
            None => errors.push(ToggleConfigError::new(
                "seed",
                value,
                "expected u32 (decimal or 0x hex)",
            )),
        }
    }

    let (config, mut fixed) = config.sanitize();
    errors.append(&mut fixed);

    ToggleConfigParse { config, errors }
}

/// Parse a comma list of effect names. Unknown names are reported and skipped.
fn parse_effects(value: &str) -> (EffectSet, Vec<ToggleConfigError>) {
    if value.trim().eq_ignore_ascii_case("all") {
        return (EffectSet::all(), Vec::new());
    }
    let mut set = EffectSet::empty();
    let mut errors = Vec::new();
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match EffectKind::parse(token) {
            Some(kind) => set |= EffectSet::of(kind),
            None => errors.push(ToggleConfigError::new(
                "effects",
                token,
                "expected rain|blob|portal|glitch|explosion|all",
            )),
        }
    }
    (set, errors)
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_seed(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse::<u32>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> ToggleConfigParse {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        from_env_with(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_env_gives_defaults() {
        let parsed = parse(&[]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config, ToggleConfig::default());
        assert!(ToggleConfig::default().validate().is_ok());
    }

    #[test]
    fn effects_list_restricts_rotation() {
        let parsed = parse(&[(ENV_EFFECTS, "glitch, rain")]);
        assert!(parsed.errors.is_empty());
        let kinds: Vec<_> = parsed.config.effects.kinds().collect();
        assert_eq!(kinds, vec![EffectKind::Rain, EffectKind::Glitch]);
    }

    #[test]
    fn unknown_effect_is_reported_but_others_apply() {
        let parsed = parse(&[(ENV_EFFECTS, "rain,fireworks")]);
        assert_eq!(parsed.config.effects, EffectSet::RAIN);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].field, "effects");
        assert_eq!(parsed.errors[0].value, "fireworks");
    }

    #[test]
    fn all_unknown_falls_back_to_every_effect() {
        let parsed = parse(&[(ENV_EFFECTS, "nope")]);
        assert_eq!(parsed.config.effects, EffectSet::all());
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn watchdog_must_exceed_longest_effect() {
        let parsed = parse(&[(ENV_WATCHDOG_MS, "1500")]);
        assert_eq!(parsed.config.watchdog, DEFAULT_WATCHDOG);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].field, "watchdog_ms");

        // Without rain (2000 ms) the longest effect is 1800 ms.
        let parsed = parse(&[
            (ENV_EFFECTS, "glitch,explosion"),
            (ENV_WATCHDOG_MS, "1600"),
        ]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config.watchdog, Duration::from_millis(1600));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let parsed = parse(&[
            (ENV_WATCHDOG_MS, "soon"),
            (ENV_REDUCED_MOTION, "maybe"),
            (ENV_SEED, "-3"),
        ]);
        assert_eq!(parsed.config, ToggleConfig::default());
        let fields: Vec<_> = parsed.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["watchdog_ms", "reduced_motion", "seed"]);
    }

    #[test]
    fn seed_and_motion_parse() {
        let parsed = parse(&[(ENV_SEED, "0xBEEF"), (ENV_REDUCED_MOTION, "on")]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config.seed, 0xBEEF);
        assert!(parsed.config.force_reduced_motion);
        assert_eq!(parse(&[(ENV_SEED, "42")]).config.seed, 42);
    }

    #[test]
    fn sanitize_repairs_programmatic_config() {
        let config = ToggleConfig {
            effects: EffectSet::empty(),
            watchdog: Duration::from_millis(10),
            ..ToggleConfig::default()
        };
        let (fixed, errors) = config.sanitize();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["effects", "watchdog_ms"]);
        assert_eq!(fixed.effects, EffectSet::all());
        assert_eq!(fixed.watchdog, DEFAULT_WATCHDOG);
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn sanitize_checks_watchdog_against_repaired_set() {
        let config = ToggleConfig {
            effects: EffectSet::empty(),
            watchdog: Duration::from_millis(1600),
            ..ToggleConfig::default()
        };
        let (fixed, errors) = config.sanitize();
        assert!(errors.iter().any(|e| e.field == "watchdog_ms" && e.value == "1600"));
        assert_eq!(fixed.watchdog, DEFAULT_WATCHDOG);
    }

    #[test]
    fn sanitize_keeps_valid_config() {
        let (fixed, errors) = ToggleConfig::default().sanitize();
        assert!(errors.is_empty());
        assert_eq!(fixed, ToggleConfig::default());
    }

    #[test]
    fn error_display_names_field() {
        let err = ToggleConfigError::new("seed", "x", "expected u32");
        assert_eq!(err.to_string(), "seed=x (expected u32)");
    }

    #[test]
    fn summary_lists_effects() {
        let summary = ToggleConfig::default().summary_short();
        assert!(summary.contains("rain,blob,portal,glitch,explosion"));
        assert!(summary.contains("3000ms"));
    }
}
