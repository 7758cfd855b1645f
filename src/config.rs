//! Application configuration resolved from the environment
//!
//! | variable | meaning |
//! |---|---|
//! | `HAUNTED_HOUSE_ASSETS` | asset root, default `assets/haunted-house` |
//! | `HAUNTED_HOUSE_SEED` | u64 seed for the grave scatter |
//! | `HAUNTED_HOUSE_FRAGMENT` | location fragment, `#debug` shows the debug panel |
//! | `HAUNTED_HOUSE_VSYNC` | `0`/`false` to disable vsync |
//!
//! A process argument starting with `#` is treated as the fragment as well.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_ASSET_ROOT: &str = "assets/haunted-house";
pub const WINDOW_TITLE: &str = "Haunted House";
pub const WINDOW_SIZE: (u32, u32) = (1200, 800);

const ASSETS_VAR: &str = "HAUNTED_HOUSE_ASSETS";
const SEED_VAR: &str = "HAUNTED_HOUSE_SEED";
const FRAGMENT_VAR: &str = "HAUNTED_HOUSE_FRAGMENT";
const VSYNC_VAR: &str = "HAUNTED_HOUSE_VSYNC";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub asset_root: PathBuf,
    pub seed: Option<u64>,
    pub debug_panel: bool,
    pub vsync: bool,
    pub window_title: String,
    pub window_size: (u32, u32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            seed: None,
            debug_panel: false,
            vsync: true,
            window_title: WINDOW_TITLE.to_string(),
            window_size: WINDOW_SIZE,
        }
    }
}

impl AppConfig {
    /// Reads the process environment and arguments
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok(), std::env::args().skip(1))
    }

    /// Resolves the configuration from a variable lookup and argument list
    pub fn resolve<F, I>(lookup: F, args: I) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup(ASSETS_VAR).filter(|v| !v.is_empty()) {
            config.asset_root = PathBuf::from(root);
        }

        if let Some(seed) = lookup(SEED_VAR) {
            let parsed = seed
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: SEED_VAR,
                    value: seed.clone(),
                    reason: e.to_string(),
                })?;
            config.seed = Some(parsed);
        }

        if let Some(vsync) = lookup(VSYNC_VAR) {
            config.vsync = parse_flag(VSYNC_VAR, &vsync)?;
        }

        let fragment = args
            .into_iter()
            .find(|arg| arg.starts_with('#'))
            .or_else(|| lookup(FRAGMENT_VAR));
        config.debug_panel = fragment.as_deref().is_some_and(debug_requested);

        Ok(config)
    }
}

/// True when a location fragment asks for the debug panel
pub fn debug_requested(fragment: &str) -> bool {
    fragment.contains("debug")
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)], args: &[&str]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(
            |name| vars.get(name).cloned(),
            args.iter().map(|a| a.to_string()),
        )
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&[], &[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.asset_root, PathBuf::from("assets/haunted-house"));
        assert!(!config.debug_panel);
        assert!(config.vsync);
        assert_eq!(config.window_size, (1200, 800));
    }

    #[test]
    fn test_fragment_toggles_debug_panel() {
        assert!(resolve(&[], &["#debug"]).unwrap().debug_panel);
        assert!(resolve(&[("HAUNTED_HOUSE_FRAGMENT", "#debug")], &[]).unwrap().debug_panel);
        assert!(!resolve(&[], &["#orbit"]).unwrap().debug_panel);
        assert!(!resolve(&[], &["debug"]).unwrap().debug_panel);
    }

    #[test]
    fn test_seed_and_assets() {
        let config = resolve(
            &[("HAUNTED_HOUSE_SEED", "1234"), ("HAUNTED_HOUSE_ASSETS", "/srv/house")],
            &[],
        )
        .unwrap();
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.asset_root, PathBuf::from("/srv/house"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = resolve(&[("HAUNTED_HOUSE_SEED", "many")], &[]).unwrap_err();
        assert!(err.to_string().contains("HAUNTED_HOUSE_SEED"));

        assert!(resolve(&[("HAUNTED_HOUSE_VSYNC", "maybe")], &[]).is_err());
        assert!(!resolve(&[("HAUNTED_HOUSE_VSYNC", "0")], &[]).unwrap().vsync);
    }
}
