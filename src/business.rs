//! Business configuration: the single input document of a generation run.
//!
//! The upstream application flattens a business profile (company record,
//! branding, industry, service area, reviews, collections) into one JSON
//! document. This module turns that document into a strongly typed
//! [`BusinessConfig`].
//!
//! ## Shape
//!
//! ```json
//! {
//!   "company":  { "name": "Acme Heating", "slug": "acme", "phone": "(555) 010-2000" },
//!   "branding": { "primaryColor": "#0b5fff", "tagline": "Comfort, on call" },
//!   "industry": { "type": "HVAC", "slug": "hvac", "emergencyService": true },
//!   "serviceArea": { "areas": ["Springfield", "Shelbyville"], "radius": 25 },
//!   "social":   { "facebook": "https://facebook.com/acme", "yelp": null },
//!   "reviews":  { "rating": 4.9, "count": 212 },
//!   "services": [ { "name": "AC Repair" } ]
//! }
//! ```
//!
//! Keys are camelCase. Every section is optional except `company`, and every
//! field is optional except `company.name` and `company.slug`. Unknown keys
//! are ignored because the upstream export carries record fields the
//! generator has no use for; values of the wrong type are rejected.
//!
//! `services` distinguishes absent from empty: an absent list means "use the
//! industry preset's defaults", an explicit `[]` means "no services".

use crate::naming::{self, SlugProblem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusinessConfigError {
    #[error("cannot read business config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed business config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid slug in `{field}`: {problem}")]
    InvalidSlug {
        field: &'static str,
        problem: SlugProblem,
    },
}

impl BusinessConfigError {
    /// Dotted path of the offending field, when the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            BusinessConfigError::MissingField(f) => Some(*f),
            BusinessConfigError::InvalidSlug { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessConfig {
    pub company: Company,
    pub branding: Branding,
    pub industry: Industry,
    pub service_area: ServiceArea,
    /// Platform → profile URL. `null` URLs are kept so the platform still
    /// gets an (empty) token.
    pub social: BTreeMap<String, Option<String>>,
    pub seo: Seo,
    pub reviews: Reviews,
    pub hours: Vec<OpeningHours>,
    /// `None` when the key is absent: fall back to the industry preset.
    pub services: Option<Vec<Service>>,
    pub testimonials: Vec<Testimonial>,
    pub faq: Vec<FaqItem>,
    pub gallery: Vec<GalleryImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Address,
    pub license: Option<String>,
    pub years_in_business: Option<u32>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl Address {
    /// `"12 Main St, Springfield, IL 62701"`, skipping absent parts.
    pub fn one_line(&self) -> String {
        let state_zip = [self.state.as_deref(), self.zip.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [self.street.as_deref(), self.city.as_deref(), Some(state_zip.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branding {
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub heading_font: Option<String>,
    pub body_font: Option<String>,
    pub icon: Option<String>,
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Industry {
    /// Display label, e.g. `"HVAC"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Derived from `type` when absent.
    pub slug: Option<String>,
    pub emergency_service: bool,
    pub schema_type: Option<String>,
}

impl Industry {
    /// The explicit slug, lower-cased, or one derived from the display label.
    pub fn effective_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_ascii_lowercase(),
            _ => naming::slugify(&self.kind),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceArea {
    pub areas: Vec<String>,
    pub radius: Option<u32>,
    pub primary_city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reviews {
    pub rating: Option<f64>,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpeningHours {
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub name: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BusinessConfig {
    /// Parse from JSON text and validate.
    pub fn from_json_str(json: &str) -> Result<Self, BusinessConfigError> {
        let mut config: BusinessConfig = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Check the identity invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), BusinessConfigError> {
        if self.company.name.trim().is_empty() {
            return Err(BusinessConfigError::MissingField("company.name"));
        }
        if self.company.slug.is_empty() {
            return Err(BusinessConfigError::MissingField("company.slug"));
        }
        naming::validate_slug(&self.company.slug).map_err(|problem| {
            BusinessConfigError::InvalidSlug {
                field: "company.slug",
                problem,
            }
        })?;

        let industry_slug = self.industry.effective_slug();
        if industry_slug.is_empty() {
            return Err(BusinessConfigError::MissingField("industry.slug"));
        }
        naming::validate_slug(&industry_slug).map_err(|problem| {
            BusinessConfigError::InvalidSlug {
                field: "industry.slug",
                problem,
            }
        })?;

        if let Some(services) = &self.services {
            for service in services {
                if service.name.trim().is_empty() {
                    return Err(BusinessConfigError::MissingField("services[].name"));
                }
                let slug = service
                    .slug
                    .clone()
                    .unwrap_or_else(|| naming::slugify(&service.name));
                naming::validate_slug(&slug).map_err(|problem| {
                    BusinessConfigError::InvalidSlug {
                        field: "services[].slug",
                        problem,
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Trim identity fields and drop blank service-area entries.
    fn normalize(&mut self) {
        self.company.name = self.company.name.trim().to_string();
        self.company.slug = self.company.slug.trim().to_string();
        self.service_area.areas = self
            .service_area
            .areas
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }
}

/// Load and validate a business config from a JSON file.
pub fn load_business_config(path: &Path) -> Result<BusinessConfig, BusinessConfigError> {
    let content = fs::read_to_string(path).map_err(|source| BusinessConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    BusinessConfig::from_json_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_config() {
        let config =
            BusinessConfig::from_json_str(r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"type": "HVAC"}}"#)
                .unwrap();
        assert_eq!(config.company.name, "Acme");
        assert_eq!(config.industry.effective_slug(), "hvac");
        assert!(!config.industry.emergency_service);
        assert!(config.services.is_none());
    }

    #[test]
    fn explicit_empty_services_is_not_absent() {
        let config = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"}, "services": []}"#,
        )
        .unwrap();
        assert_eq!(config.services, Some(vec![]));
    }

    #[test]
    fn camel_case_keys() {
        let config = BusinessConfig::from_json_str(
            r##"{
                "company": {"name": "Acme", "slug": "acme", "yearsInBusiness": 12},
                "branding": {"primaryColor": "#112233", "logoUrl": "/logo.svg"},
                "industry": {"type": "HVAC", "slug": "hvac", "emergencyService": true, "schemaType": "HVACBusiness"},
                "serviceArea": {"areas": ["Springfield"], "primaryCity": "Springfield", "radius": 30}
            }"##,
        )
        .unwrap();
        assert_eq!(config.company.years_in_business, Some(12));
        assert_eq!(config.branding.primary_color.as_deref(), Some("#112233"));
        assert!(config.industry.emergency_service);
        assert_eq!(config.industry.schema_type.as_deref(), Some("HVACBusiness"));
        assert_eq!(config.service_area.radius, Some(30));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = BusinessConfig::from_json_str(
            r#"{"id": 7, "company": {"name": "Acme", "slug": "acme", "ownerId": 3}, "industry": {"slug": "hvac"}}"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn malformed_json_is_error() {
        let result = BusinessConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(BusinessConfigError::Json(_))));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac", "emergencyService": "yes"}}"#,
        );
        assert!(matches!(result, Err(BusinessConfigError::Json(_))));
    }

    #[test]
    fn missing_company_name() {
        let err = BusinessConfig::from_json_str(r#"{"company": {"slug": "acme"}, "industry": {"slug": "hvac"}}"#)
            .unwrap_err();
        assert_eq!(err.field(), Some("company.name"));
    }

    #[test]
    fn missing_company_slug() {
        let err = BusinessConfig::from_json_str(r#"{"company": {"name": "Acme"}, "industry": {"slug": "hvac"}}"#)
            .unwrap_err();
        assert_eq!(err.field(), Some("company.slug"));
    }

    #[test]
    fn missing_industry_slug_and_type() {
        let err = BusinessConfig::from_json_str(r#"{"company": {"name": "Acme", "slug": "acme"}}"#).unwrap_err();
        assert_eq!(err.field(), Some("industry.slug"));
    }

    #[test]
    fn slug_with_path_separator_rejected() {
        let err = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "../acme"}, "industry": {"slug": "hvac"}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BusinessConfigError::InvalidSlug {
                field: "company.slug",
                ..
            }
        ));
    }

    #[test]
    fn service_slug_validated() {
        let err = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"},
                "services": [{"name": "AC", "slug": "a c"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("services[].slug"));
    }

    #[test]
    fn service_name_without_usable_slug_rejected() {
        let err = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"},
                "services": [{"name": "&&&"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BusinessConfigError::InvalidSlug {
                field: "services[].slug",
                problem: SlugProblem::Empty,
            }
        ));
    }

    #[test]
    fn blank_service_name_rejected() {
        let err = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"},
                "services": [{"name": "  ", "slug": "ac-repair"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("services[].name"));
    }

    #[test]
    fn service_slug_derived_from_name_is_accepted() {
        let config = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"},
                "services": [{"name": "AC Repair"}]}"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn explicit_industry_slug_is_lower_cased() {
        let config = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "HVAC"}}"#,
        )
        .unwrap();
        assert_eq!(config.industry.effective_slug(), "hvac");
    }

    #[test]
    fn areas_are_trimmed_and_blank_entries_dropped() {
        let config = BusinessConfig::from_json_str(
            r#"{"company": {"name": "Acme", "slug": "acme"}, "industry": {"slug": "hvac"},
                "serviceArea": {"areas": [" Springfield ", "", "  "]}}"#,
        )
        .unwrap();
        assert_eq!(config.service_area.areas, vec!["Springfield"]);
    }

    #[test]
    fn address_one_line() {
        let address = Address {
            street: Some("12 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            zip: Some("62701".into()),
        };
        assert_eq!(address.one_line(), "12 Main St, Springfield, IL 62701");
    }

    #[test]
    fn address_one_line_partial() {
        let address = Address {
            city: Some("Springfield".into()),
            ..Default::default()
        };
        assert_eq!(address.one_line(), "Springfield");
        assert_eq!(Address::default().one_line(), "");
    }

    #[test]
    fn load_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_business_config(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(BusinessConfigError::Read { .. })));
    }
}
