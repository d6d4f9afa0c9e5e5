//! Per-service image asset validation.
//!
//! Every service in the catalog is illustrated by an image named
//! `{industry}-{service}.png` in the template's asset directory. This module
//! probes the directory and reports which of those files exist. It never
//! writes anything and never fails: a missing or unreadable directory simply
//! reports every asset as missing. Whether missing assets block generation
//! is the generator's call, not this module's.

use crate::catalog::Catalog;
use serde::Serialize;
use std::path::Path;

/// One expected asset and whether it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCheck {
    pub industry: String,
    pub service: String,
    pub filename: String,
    pub present: bool,
    /// Mirrors `ServicePreset::requires_image`.
    pub required: bool,
}

/// Presence report for every (industry, service) pair in a catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetReport {
    pub checks: Vec<AssetCheck>,
}

impl AssetReport {
    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn existing(&self) -> usize {
        self.checks.iter().filter(|c| c.present).count()
    }

    pub fn missing(&self) -> usize {
        self.total() - self.existing()
    }

    /// Filenames of all missing assets, in catalog order.
    pub fn missing_files(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.present)
            .map(|c| c.filename.as_str())
            .collect()
    }

    /// Missing assets whose service requires an image.
    pub fn required_missing(&self) -> Vec<&AssetCheck> {
        self.checks
            .iter()
            .filter(|c| !c.present && c.required)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.checks.iter().all(|c| c.present)
    }
}

/// Expected filename for a service image.
pub fn expected_filename(industry_slug: &str, service_slug: &str) -> String {
    format!("{industry_slug}-{service_slug}.png")
}

/// Check every catalog service against `asset_dir`.
pub fn validate(catalog: &Catalog, asset_dir: &Path) -> AssetReport {
    let checks = catalog
        .all()
        .iter()
        .flat_map(|industry| {
            industry.services.iter().map(move |service| {
                let filename = expected_filename(&industry.slug, &service.slug);
                let present = asset_dir.join(&filename).is_file();
                AssetCheck {
                    industry: industry.slug.clone(),
                    service: service.slug.clone(),
                    filename,
                    present,
                    required: service.requires_image,
                }
            })
        })
        .collect();
    AssetReport { checks }
}
