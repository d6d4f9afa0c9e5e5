//! Industry preset catalog.
//!
//! A static, versioned registry of the business verticals the template
//! supports. Each [`IndustryPreset`] carries display metadata and an ordered
//! list of default services. The catalog has two consumers:
//!
//! - the token builder, which falls back to a preset's services when a
//!   business config omits its own list;
//! - the asset validator, which expects one image per (industry, service)
//!   pair.
//!
//! ## Data Source
//!
//! The built-in catalog is `data/industries.toml`, embedded at compile time.
//! Adding an industry or a service is an edit to that file, not a runtime
//! operation. Operators and tests can substitute their own catalog with
//! [`Catalog::load`] or [`Catalog::from_toml_str`]; the generator takes the
//! catalog as a constructor argument rather than reaching for a global.
//!
//! ```toml
//! version = 3
//!
//! [[industry]]
//! slug = "hvac"
//! label = "HVAC"
//! schema_type = "HVACBusiness"
//!
//! [[industry.services]]
//! name = "AC Repair"
//! slug = "ac-repair"
//! short_description = "Fast diagnosis and repair."
//! ```

use crate::naming::{self, SlugProblem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../data/industries.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("catalog has no industries")]
    Empty,
    #[error("duplicate industry slug: {0}")]
    DuplicateIndustry(String),
    #[error("duplicate service slug {service} in industry {industry}")]
    DuplicateService { industry: String, service: String },
    #[error("invalid slug {slug:?}: {problem}")]
    InvalidSlug { slug: String, problem: SlugProblem },
}

/// One supported business vertical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndustryPreset {
    pub slug: String,
    pub label: String,
    /// schema.org type used in the generated structured data.
    #[serde(default = "default_schema_type")]
    pub schema_type: String,
    #[serde(default)]
    pub services: Vec<ServicePreset>,
}

fn default_schema_type() -> String {
    "LocalBusiness".to_string()
}

/// A default service offered by an industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicePreset {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    /// Whether a missing image for this service blocks strict generation.
    #[serde(default = "default_requires_image")]
    pub requires_image: bool,
}

fn default_requires_image() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub version: u32,
    #[serde(rename = "industry", default)]
    industries: Vec<IndustryPreset>,
}

impl Catalog {
    /// The compiled-in catalog.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_CATALOG).expect("built-in industry catalog must be valid")
    }

    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build a catalog directly from presets (validated).
    pub fn new(version: u32, industries: Vec<IndustryPreset>) -> Result<Self, CatalogError> {
        let catalog = Self {
            version,
            industries,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn lookup(&self, industry_slug: &str) -> Option<&IndustryPreset> {
        self.industries.iter().find(|i| i.slug == industry_slug)
    }

    /// All presets in registry order.
    pub fn all(&self) -> &[IndustryPreset] {
        &self.industries
    }

    /// Total number of services across every industry.
    pub fn service_count(&self) -> usize {
        self.industries.iter().map(|i| i.services.len()).sum()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.industries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for industry in &self.industries {
            check_slug(&industry.slug)?;
            if !seen.insert(industry.slug.as_str()) {
                return Err(CatalogError::DuplicateIndustry(industry.slug.clone()));
            }
            let mut services = HashSet::new();
            for service in &industry.services {
                check_slug(&service.slug)?;
                if !services.insert(service.slug.as_str()) {
                    return Err(CatalogError::DuplicateService {
                        industry: industry.slug.clone(),
                        service: service.slug.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_slug(slug: &str) -> Result<(), CatalogError> {
    naming::validate_slug(slug).map_err(|problem| CatalogError::InvalidSlug {
        slug: slug.to_string(),
        problem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin();
        assert!(catalog.version >= 1);
        assert_eq!(catalog.all().len(), 7);
        assert_eq!(catalog.service_count(), 31);
    }

    #[test]
    fn builtin_has_hvac_ac_repair() {
        let catalog = Catalog::builtin();
        let hvac = catalog.lookup("hvac").unwrap();
        assert_eq!(hvac.label, "HVAC");
        assert_eq!(hvac.schema_type, "HVACBusiness");
        assert_eq!(hvac.services[0].slug, "ac-repair");
        assert!(hvac.services[0].requires_image);
    }

    #[test]
    fn lookup_unknown_industry() {
        assert!(Catalog::builtin().lookup("blacksmithing").is_none());
    }

    #[test]
    fn registry_order_preserved() {
        let catalog = Catalog::builtin();
        let slugs: Vec<&str> = catalog.all().iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs[0], "hvac");
        assert_eq!(slugs[1], "plumbing");
    }

    #[test]
    fn custom_catalog_defaults() {
        let catalog = Catalog::from_toml_str(
            r#"
version = 1

[[industry]]
slug = "bakery"
label = "Bakery"

[[industry.services]]
name = "Wedding Cakes"
slug = "wedding-cakes"
requires_image = false
"#,
        )
        .unwrap();
        let bakery = catalog.lookup("bakery").unwrap();
        assert_eq!(bakery.schema_type, "LocalBusiness");
        assert_eq!(bakery.services[0].short_description, "");
        assert!(!bakery.services[0].requires_image);
    }

    #[test]
    fn empty_catalog_rejected() {
        let result = Catalog::from_toml_str("version = 1\n");
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn duplicate_industry_rejected() {
        let result = Catalog::from_toml_str(
            r#"
version = 1
[[industry]]
slug = "hvac"
label = "HVAC"
[[industry]]
slug = "hvac"
label = "HVAC again"
"#,
        );
        assert!(matches!(result, Err(CatalogError::DuplicateIndustry(s)) if s == "hvac"));
    }

    #[test]
    fn duplicate_service_rejected() {
        let result = Catalog::from_toml_str(
            r#"
version = 1
[[industry]]
slug = "hvac"
label = "HVAC"
[[industry.services]]
name = "A"
slug = "a"
[[industry.services]]
name = "A again"
slug = "a"
"#,
        );
        assert!(matches!(result, Err(CatalogError::DuplicateService { .. })));
    }

    #[test]
    fn bad_slug_rejected() {
        let result = Catalog::from_toml_str(
            r#"
version = 1
[[industry]]
slug = "h/vac"
label = "HVAC"
"#,
        );
        assert!(matches!(result, Err(CatalogError::InvalidSlug { .. })));
    }

    #[test]
    fn unknown_key_rejected() {
        let result = Catalog::from_toml_str(
            r#"
version = 1
[[industry]]
slug = "hvac"
lable = "HVAC"
"#,
        );
        assert!(matches!(result, Err(CatalogError::Toml(_))));
    }
}
