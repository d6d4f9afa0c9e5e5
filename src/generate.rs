//! Site generation orchestrator.
//!
//! Drives one run from a business config to a materialized site directory
//! and reports what happened in a [`GenerationResult`].
//!
//! ## Stages
//!
//! ```text
//! Loaded → Validated → Materializing → Done
//!    ↓         ↓             ↓
//!  Failed    Failed        Failed
//! ```
//!
//! - **Loaded**: the business config is read, parsed, and validated. A bad
//!   config fails here and nothing touches the filesystem.
//! - **Validated**: the token map is built and, when asset checking is on,
//!   every catalog service image is probed. Missing images become warnings.
//!   In strict mode a missing *required* image fails the run here, again
//!   before anything is written.
//! - **Materializing**: the template tree is mirrored into the destination.
//!   An I/O failure ends the run with the list of files already written.
//! - **Done**: success. Unresolved placeholders are reported as warnings,
//!   one per (file, token).
//!
//! Warnings never abort a run. The result is serializable so a caller that
//! spawns the CLI can consume it as JSON.
//!
//! ## Dependencies
//!
//! The [`Catalog`] is injected at construction rather than read from a
//! global, so tests and operators can run against substitute catalogs.

use crate::assets;
use crate::business::{BusinessConfig, BusinessConfigError, load_business_config};
use crate::catalog::{Catalog, CatalogError};
use crate::config::{Settings, SettingsError};
use crate::materialize::{self, MaterializeError, MaterializeEvent, WalkOptions, WrittenFile};
use crate::tokens::TokenMapBuilder;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Lifecycle position of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loaded,
    Validated,
    Materializing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Validated => "validated",
            Stage::Materializing => "materializing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Non-fatal diagnostics attached to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    MissingAsset { filename: String },
    UnresolvedToken { file: PathBuf, token: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingAsset { filename } => write!(f, "missing service image {filename}"),
            Warning::UnresolvedToken { file, token } => {
                write!(f, "unresolved {{{{{token}}}}} in {}", file.display())
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] BusinessConfigError),
    #[error("{} required service image(s) missing: {}", .missing.len(), .missing.join(", "))]
    MissingAssets { missing: Vec<String> },
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error("invalid generator settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid industry catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Config(_)
            | GenerationError::Settings(_)
            | GenerationError::Catalog(_) => "config",
            GenerationError::MissingAssets { .. } => "missing_assets",
            GenerationError::Materialize(_) => "io",
        }
    }

    /// Offending config field, for config errors that name one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            GenerationError::Config(e) => e.field(),
            _ => None,
        }
    }

    /// Offending filesystem path, for I/O errors.
    pub fn path(&self) -> Option<&Path> {
        match self {
            GenerationError::Config(BusinessConfigError::Read { path, .. }) => Some(path.as_path()),
            GenerationError::Materialize(
                MaterializeError::Io { path, .. }
                | MaterializeError::DestinationNotEmpty(path)
                | MaterializeError::SourceNotDirectory(path),
            ) => Some(path.as_path()),
            _ => None,
        }
    }
}

impl Serialize for GenerationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("GenerationError", 4)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.serialize_field("field", &self.field())?;
        s.serialize_field("path", &self.path())?;
        s.end()
    }
}

/// Everything a caller needs to know about one run.
#[derive(Debug, Serialize)]
pub struct GenerationResult {
    pub destination: PathBuf,
    pub stage: Stage,
    /// Stage the run was in when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_during: Option<Stage>,
    pub success: bool,
    pub files: Vec<WrittenFile>,
    pub unresolved: BTreeMap<PathBuf, BTreeSet<String>>,
    pub unresolved_tokens: BTreeSet<String>,
    pub missing_assets: Vec<String>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GenerationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_fingerprint: Option<String>,
}

impl GenerationResult {
    fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            stage: Stage::Loaded,
            failed_during: None,
            success: false,
            files: Vec::new(),
            unresolved: BTreeMap::new(),
            unresolved_tokens: BTreeSet::new(),
            missing_assets: Vec::new(),
            warnings: Vec::new(),
            error: None,
            token_fingerprint: None,
        }
    }

    /// A run that never started, e.g. because the settings or the catalog
    /// could not be loaded.
    pub fn failed(destination: &Path, error: GenerationError) -> Self {
        Self::new(destination).fail(error)
    }

    fn fail(mut self, error: GenerationError) -> Self {
        tracing::error!(
            stage = %self.stage,
            kind = error.kind(),
            "generation failed: {error}"
        );
        self.failed_during = Some(self.stage);
        self.stage = Stage::Failed;
        self.success = false;
        self.error = Some(error);
        self
    }

    fn advance(&mut self, stage: Stage) {
        tracing::info!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }
}

/// Knobs for one generator instance.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub check_assets: bool,
    /// Fail before writing anything when a required image is missing.
    pub strict_assets: bool,
    /// Relative paths resolve against the template root.
    pub asset_dir: PathBuf,
    pub asset_url_prefix: String,
    pub walk: WalkOptions,
}

impl GenerateOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            check_assets: settings.assets.check,
            strict_assets: settings.assets.strict,
            asset_dir: PathBuf::from(&settings.assets.dir),
            asset_url_prefix: settings.assets.url_prefix.clone(),
            walk: WalkOptions::from_settings(&settings.template),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct Generator {
    catalog: Catalog,
    options: GenerateOptions,
    progress: Option<Sender<MaterializeEvent>>,
}

impl Generator {
    pub fn new(catalog: Catalog, options: GenerateOptions) -> Self {
        Self {
            catalog,
            options,
            progress: None,
        }
    }

    /// Forward per-file progress events to `tx`.
    pub fn with_progress(mut self, tx: Sender<MaterializeEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Asset directory for a template root.
    pub fn asset_dir(&self, source_root: &Path) -> PathBuf {
        source_root.join(&self.options.asset_dir)
    }

    /// Run the pipeline for the business config at `config_path`.
    pub fn generate(
        &self,
        config_path: &Path,
        source_root: &Path,
        dest_root: &Path,
    ) -> GenerationResult {
        tracing::info!(config = %config_path.display(), "loading business config");
        match load_business_config(config_path) {
            Ok(config) => self.generate_from_config(&config, source_root, dest_root),
            Err(e) => GenerationResult::new(dest_root).fail(e.into()),
        }
    }

    /// Run the pipeline for an already parsed config.
    pub fn generate_from_config(
        &self,
        config: &BusinessConfig,
        source_root: &Path,
        dest_root: &Path,
    ) -> GenerationResult {
        let mut result = GenerationResult::new(dest_root);
        if let Err(e) = config.validate() {
            return result.fail(e.into());
        }
        tracing::info!(
            company = %config.company.slug,
            industry = %config.industry.effective_slug(),
            "business config loaded"
        );

        let tokens = TokenMapBuilder::new(&self.catalog)
            .asset_url_prefix(self.options.asset_url_prefix.clone())
            .build(config);
        result.token_fingerprint = Some(tokens.fingerprint());
        tracing::debug!(tokens = tokens.len(), fingerprint = %tokens.fingerprint(), "token map built");

        if self.options.check_assets {
            let asset_dir = self.asset_dir(source_root);
            let report = assets::validate(&self.catalog, &asset_dir);
            tracing::info!(
                dir = %asset_dir.display(),
                existing = report.existing(),
                missing = report.missing(),
                "service images checked"
            );
            for filename in report.missing_files() {
                tracing::warn!(filename, "missing service image");
                result.missing_assets.push(filename.to_string());
                result.warnings.push(Warning::MissingAsset {
                    filename: filename.to_string(),
                });
            }
            let required: Vec<String> = report
                .required_missing()
                .iter()
                .map(|c| c.filename.clone())
                .collect();
            if self.options.strict_assets && !required.is_empty() {
                result.advance(Stage::Validated);
                return result.fail(GenerationError::MissingAssets { missing: required });
            }
        }
        result.advance(Stage::Validated);

        result.advance(Stage::Materializing);
        let outcome = materialize::materialize(
            source_root,
            dest_root,
            &tokens,
            &self.options.walk,
            self.progress.clone(),
        );
        let (materialized, error) = match outcome {
            Ok(m) => (m, None),
            Err(failure) => (failure.partial, Some(failure.error)),
        };

        result.unresolved_tokens = materialized.unresolved_tokens();
        for (file, names) in &materialized.unresolved {
            for token in names {
                tracing::warn!(file = %file.display(), token, "unresolved placeholder");
                result.warnings.push(Warning::UnresolvedToken {
                    file: file.clone(),
                    token: token.clone(),
                });
            }
        }
        result.files = materialized.files;
        result.unresolved = materialized.unresolved;

        if let Some(error) = error {
            return result.fail(error.into());
        }

        result.advance(Stage::Done);
        result.success = true;
        tracing::info!(
            files = result.files.len(),
            warnings = result.warnings.len(),
            destination = %dest_root.display(),
            "site generated"
        );
        result
    }
}
