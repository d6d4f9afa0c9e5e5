//! # Sitesmith
//!
//! Generates deployable marketing sites for small service businesses (HVAC,
//! plumbing, roofing, …) from one canonical site template. The template is a
//! complete web project whose text files contain `{{PLACEHOLDER}}` tokens; a
//! business config fills them in.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! business.json ─→ TokenMap ─→ asset check ─→ materialize ─→ site/
//!                     ↑             ↑              ↑
//!                  catalog       catalog        template/
//! ```
//!
//! 1. The business config is parsed into strongly typed structs and
//!    validated ([`business`]).
//! 2. It is flattened into a `PLACEHOLDER → text` map ([`tokens`]), with
//!    services falling back to the industry's catalog defaults.
//! 3. Every catalog service image is probed ([`assets`]). Missing images are
//!    warnings, or a hard failure in strict mode.
//! 4. The template tree is mirrored into a fresh destination
//!    ([`materialize`]): text files are substituted ([`substitute`]), binary
//!    files copied byte-for-byte.
//!
//! [`generate`] drives these steps as a small state machine and returns a
//! serializable [`generate::GenerationResult`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`business`] | Business config model, JSON loading, identity validation |
//! | [`catalog`] | Versioned industry/service preset table, embedded from `data/industries.toml` |
//! | [`tokens`] | Business config → token map, the template's vocabulary |
//! | [`substitute`] | Single-pass `{{TOKEN}}` replacement |
//! | [`assets`] | `{industry}-{service}.png` presence report |
//! | [`materialize`] | Template tree walk: classify, substitute, copy, in parallel |
//! | [`generate`] | Orchestrator: stages, warnings, result |
//! | [`config`] | Generator settings from `sitesmith.toml`, merged over stock defaults |
//! | [`naming`] | Slug derivation and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Strings All the Way Down
//!
//! Every token value is a string, including booleans and collections. The
//! template compares `"{{EMERGENCY_SERVICE}}" === "true"` and assigns
//! `const services = {{SERVICES}};`, so booleans must render as the literal
//! text `true`/`false` and collections as compact JSON. The template's
//! vocabulary is a fixed contract; the generator adapts to it.
//!
//! ## Fresh Destinations Only
//!
//! Generation never writes into a populated directory. There is no merge or
//! incremental mode: regenerating a site means generating into a new
//! directory and swapping it in. This keeps a failed run from leaving a
//! half-updated site behind.
//!
//! ## Injected Catalog
//!
//! The industry catalog is plain data compiled into the binary, but the
//! generator receives it as a value. Tests run against one-service catalogs;
//! operators can point `--catalog` at their own TOML file.

pub mod assets;
pub mod business;
pub mod catalog;
pub mod config;
pub mod generate;
pub mod materialize;
pub mod naming;
pub mod output;
pub mod substitute;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_helpers;
