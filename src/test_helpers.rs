//! Shared test utilities for the sitesmith test suite.
//!
//! Provides canned business configs, a minimal catalog, and helpers for
//! building template trees on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_tree(tmp.path(), &[("src/extra.ts", "{{COMPANY_NAME}}")]);
//! let tokens = crate::tokens::build(&acme_config(), &single_service_catalog());
//! ```

use std::fs;
use std::path::Path;

use crate::business::{BusinessConfig, Company, Industry};
use crate::catalog::{Catalog, IndustryPreset, ServicePreset};

// =========================================================================
// Template trees
// =========================================================================

/// Write `(relative path, content)` pairs under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}

// =========================================================================
// Canned inputs
// =========================================================================

/// Acme HVAC: emergency service on, explicitly no services, no tagline.
pub fn acme_config() -> BusinessConfig {
    BusinessConfig {
        company: Company {
            name: "Acme".into(),
            slug: "acme".into(),
            ..Company::default()
        },
        industry: Industry {
            kind: "HVAC".into(),
            slug: Some("hvac".into()),
            emergency_service: true,
            schema_type: None,
        },
        services: Some(vec![]),
        ..BusinessConfig::default()
    }
}

/// A catalog with one industry (`hvac`) and one service (`ac-repair`).
pub fn single_service_catalog() -> Catalog {
    Catalog::new(
        1,
        vec![IndustryPreset {
            slug: "hvac".into(),
            label: "HVAC".into(),
            schema_type: "HVACBusiness".into(),
            services: vec![ServicePreset {
                name: "AC Repair".into(),
                slug: "ac-repair".into(),
                short_description: "Fast cooling fixes".into(),
                description: "Diagnosis and repair of central air systems.".into(),
                requires_image: true,
            }],
        }],
    )
    .unwrap()
}
