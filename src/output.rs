//! CLI output formatting for every subcommand.
//!
//! # Information-First Display
//!
//! Output leads with what things *are* (industry, service, token) and shows
//! filenames as secondary, indented context. A catalog listing reads as an
//! inventory of offerings; an asset report reads as "which services still
//! need a picture".
//!
//! # Output Format
//!
//! ## Presets
//!
//! ```text
//! Catalog v3 (7 industries, 31 services)
//! 001 HVAC (hvac)
//!     Schema: HVACBusiness
//!     001 AC Repair (ac-repair)
//!     002 Furnace Repair (furnace-repair)
//! ```
//!
//! ## Asset report
//!
//! ```text
//! Service images in public/images/services
//! 001 hvac (4/5)
//!     missing: hvac-ac-repair.png
//! 002 plumbing (5/5)
//!
//! 30 of 31 present, 1 missing
//! ```
//!
//! ## Generate
//!
//! ```text
//! Generated site → sites/acme
//!     42 files (37 text, 5 binary)
//!     Tokens: 3f2a9c…
//!
//! Warnings
//!     missing service image hvac-ac-repair.png
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go through
//! `tracing` on stderr, so stdout stays clean for `--json`.

use crate::assets::AssetReport;
use crate::catalog::Catalog;
use crate::generate::{GenerationResult, Stage};
use crate::materialize::{FileKind, MaterializeEvent};
use crate::tokens::TokenMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + label, with a detail in
/// parentheses (a slug or a `present/total` count).
///
/// ```text
/// 001 HVAC (hvac)
/// 001 hvac (4/5)
/// ```
fn entity_header(index: usize, label: &str, detail: &str) -> String {
    format!("{} {} ({})", format_index(index), label, detail)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_value(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Presets
// ============================================================================

/// Format the industry preset catalog.
pub fn format_presets(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![format!(
        "Catalog v{} ({}, {})",
        catalog.version,
        plural(catalog.all().len(), "industry", "industries"),
        plural(catalog.service_count(), "service", "services")
    )];
    for (i, industry) in catalog.all().iter().enumerate() {
        lines.push(entity_header(i + 1, &industry.label, &industry.slug));
        lines.push(format!("{}Schema: {}", indent(1), industry.schema_type));
        for (j, service) in industry.services.iter().enumerate() {
            let optional = if service.requires_image {
                ""
            } else {
                " [image optional]"
            };
            lines.push(format!(
                "{}{}{}",
                indent(1),
                entity_header(j + 1, &service.name, &service.slug),
                optional
            ));
        }
    }
    lines
}

pub fn print_presets(catalog: &Catalog) {
    for line in format_presets(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Asset report
// ============================================================================

/// Format an asset report grouped by industry, in catalog order.
pub fn format_asset_report(report: &AssetReport, asset_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!("Service images in {}", asset_dir.display())];

    let mut order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&crate::assets::AssetCheck>> = BTreeMap::new();
    for check in &report.checks {
        if !groups.contains_key(check.industry.as_str()) {
            order.push(check.industry.as_str());
        }
        groups.entry(check.industry.as_str()).or_default().push(check);
    }

    for (i, industry) in order.iter().enumerate() {
        let checks = &groups[industry];
        let present = checks.iter().filter(|c| c.present).count();
        lines.push(entity_header(
            i + 1,
            industry,
            &format!("{}/{}", present, checks.len()),
        ));
        for check in checks.iter().filter(|c| !c.present) {
            let marker = if check.required { "missing" } else { "missing (optional)" };
            lines.push(format!("{}{}: {}", indent(1), marker, check.filename));
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "{} of {} present, {} missing",
        report.existing(),
        report.total(),
        report.missing()
    );
    let required = report.required_missing().len();
    if required != report.missing() {
        summary.push_str(&format!(" ({} required)", required));
    }
    lines.push(summary);
    lines
}

pub fn print_asset_report(report: &AssetReport, asset_dir: &Path) {
    for line in format_asset_report(report, asset_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Token map
// ============================================================================

/// Format a token map as `NAME = value`, one per line, values truncated.
pub fn format_token_map(tokens: &TokenMap) -> Vec<String> {
    let width = tokens.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    tokens
        .iter()
        .map(|(name, value)| {
            let shown = if value.is_empty() {
                "(empty)".to_string()
            } else {
                truncate_value(value, 60)
            };
            format!("{:<width$} = {}", name, shown, width = width)
        })
        .collect()
}

pub fn print_token_map(tokens: &TokenMap) {
    for line in format_token_map(tokens) {
        println!("{}", line);
    }
}

/// Format template placeholders with no token map entry.
///
/// ```text
/// Vocabulary gaps (1)
/// HERO_VIDEO
///     src/app/page.tsx
/// ```
pub fn format_vocabulary_gaps(gaps: &BTreeMap<String, BTreeSet<PathBuf>>) -> Vec<String> {
    if gaps.is_empty() {
        return vec!["No vocabulary gaps".to_string()];
    }
    let mut lines = vec![format!("Vocabulary gaps ({})", gaps.len())];
    for (token, files) in gaps {
        lines.push(token.clone());
        for file in files {
            lines.push(format!("{}{}", indent(1), file.display()));
        }
    }
    lines
}

pub fn print_vocabulary_gaps(gaps: &BTreeMap<String, BTreeSet<PathBuf>>) {
    for line in format_vocabulary_gaps(gaps) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single materialization progress event.
pub fn format_materialize_event(event: &MaterializeEvent) -> Vec<String> {
    match event {
        MaterializeEvent::Started { files } => {
            vec![format!("Materializing {}", plural(*files, "file", "files"))]
        }
        MaterializeEvent::FileWritten {
            path,
            kind,
            unresolved,
        } => {
            let mut line = format!("{}{}", indent(1), path.display());
            if *kind == FileKind::Binary {
                line.push_str(" (copied)");
            }
            if *unresolved > 0 {
                line.push_str(&format!(" [{} unresolved]", unresolved));
            }
            vec![line]
        }
    }
}

/// Format the final summary of a generation run.
pub fn format_generation_result(result: &GenerationResult) -> Vec<String> {
    let mut lines = Vec::new();
    let text = result
        .files
        .iter()
        .filter(|f| f.kind == FileKind::Text)
        .count();
    let binary = result.files.len() - text;

    if result.success {
        lines.push(format!("Generated site → {}", result.destination.display()));
    } else {
        let during = result.failed_during.unwrap_or(Stage::Failed);
        lines.push(format!(
            "Generation failed while {} → {}",
            during,
            result.destination.display()
        ));
    }
    lines.push(format!(
        "{}{} ({} text, {} binary)",
        indent(1),
        plural(result.files.len(), "file", "files"),
        text,
        binary
    ));
    if let Some(fingerprint) = &result.token_fingerprint {
        lines.push(format!(
            "{}Tokens: {}",
            indent(1),
            truncate_value(fingerprint, 12)
        ));
    }
    if let Some(error) = &result.error {
        lines.push(format!("{}Error: {}", indent(1), error));
    }

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings ({})", result.warnings.len()));
        for warning in &result.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

pub fn print_generation_result(result: &GenerationResult) {
    for line in format_generation_result(result) {
        println!("{}", line);
    }
}
