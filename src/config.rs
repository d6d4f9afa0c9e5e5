//! Generator settings.
//!
//! Settings for the generator itself, as opposed to the business being
//! generated. They live in an optional `sitesmith.toml` at the template
//! root, which is never copied into generated sites.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [assets]
//! check = true                       # Probe per-service images before generating
//! strict = false                     # Missing required images abort generation
//! dir = "public/images/services"     # Relative to the template root
//! url_prefix = "/images/services/"   # Prefix for image URLs in the SERVICES token
//!
//! [template]
//! exclude = [".git", "node_modules", ".next"]   # Names never copied
//! text_extensions = []               # Extra extensions treated as text
//! binary_extensions = []             # Extra extensions copied verbatim
//!
//! [processing]
//! max_processes = 4                  # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Stock defaults are merged underneath the user's file, so a file only
//! needs the keys it changes. Unknown keys are rejected to catch typos early.
//! Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the settings file looked up in the template root.
pub const SETTINGS_FILENAME: &str = "sitesmith.toml";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Settings validation error: {0}")]
    Validation(String),
}

/// Generator settings loaded from `sitesmith.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Per-service image checks.
    pub assets: AssetSettings,
    /// Template traversal rules.
    pub template: TemplateSettings,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Settings {
    /// Validate values are usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.assets.dir.trim().is_empty() {
            return Err(SettingsError::Validation(
                "assets.dir must not be empty".into(),
            ));
        }
        if Path::new(&self.assets.dir).is_absolute() {
            return Err(SettingsError::Validation(
                "assets.dir must be relative to the template root".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(SettingsError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        for ext in self
            .template
            .text_extensions
            .iter()
            .chain(&self.template.binary_extensions)
        {
            if ext.starts_with('.') || ext.is_empty() {
                return Err(SettingsError::Validation(format!(
                    "template extensions are bare names like \"astro\", got {ext:?}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetSettings {
    /// Run the asset validator before materializing.
    pub check: bool,
    /// Abort when a required image is missing.
    pub strict: bool,
    /// Asset directory, relative to the template root.
    pub dir: String,
    /// URL prefix used for service images in generated data.
    pub url_prefix: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            check: true,
            strict: false,
            dir: "public/images/services".to_string(),
            url_prefix: crate::tokens::DEFAULT_ASSET_URL_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSettings {
    /// File and directory names skipped during traversal.
    pub exclude: Vec<String>,
    /// Extra extensions treated as text (substituted).
    pub text_extensions: Vec<String>,
    /// Extra extensions treated as binary (copied verbatim).
    pub binary_extensions: Vec<String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            exclude: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                ".next".to_string(),
            ],
            text_extensions: Vec::new(),
            binary_extensions: Vec::new(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel file workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sitesmith.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_settings(dir: &Path) -> Result<Option<toml::Value>, SettingsError> {
    let path = dir.join(SETTINGS_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize, validate.
pub fn resolve_settings(overlay: Option<toml::Value>) -> Result<Settings, SettingsError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from the template root, falling back to stock defaults.
pub fn load_settings(template_root: &Path) -> Result<Settings, SettingsError> {
    resolve_settings(load_raw_settings(template_root)?)
}

/// A fully commented stock `sitesmith.toml`, printed by `gen-config`.
pub fn stock_settings_toml() -> &'static str {
    r##"# sitesmith settings
# ==================
# Place this file at the root of the site template. It is read by the
# generator and never copied into generated sites.
#
# All settings are optional; values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Per-service images
# ---------------------------------------------------------------------------
[assets]
# Check that every catalog service has an "{industry}-{service}.png" image.
check = true

# Abort generation (before writing anything) when a required image is missing.
# When false, missing images are reported as warnings.
strict = false

# Directory holding the service images, relative to the template root.
dir = "public/images/services"

# URL prefix for service images inside the SERVICES token.
url_prefix = "/images/services/"

# ---------------------------------------------------------------------------
# Template traversal
# ---------------------------------------------------------------------------
[template]
# File or directory names that are never copied.
exclude = [".git", "node_modules", ".next"]

# Extra extensions (without the dot) to substitute as text.
text_extensions = []

# Extra extensions (without the dot) to copy byte-for-byte.
binary_extensions = []

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel file workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
