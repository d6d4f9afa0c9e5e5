//! Token map construction.
//!
//! Flattens a [`BusinessConfig`] into the flat `PLACEHOLDER → text` mapping
//! the substitution engine consumes. The map is built once per run and never
//! mutated afterwards.
//!
//! ## Coercion Rules
//!
//! | Source value | Token text |
//! |---|---|
//! | string | passed through unchanged |
//! | absent optional | `""` |
//! | bool | `"true"` / `"false"` |
//! | integer | decimal digits |
//! | rating (float) | one decimal place, `"4.9"` |
//! | list of names (areas, keywords) | `", "`-joined |
//! | collections (services, testimonials, …) | compact JSON array |
//!
//! Booleans are strings on purpose: the template compares
//! `"{{EMERGENCY_SERVICE}}" === "true"`, so the emitted text must be exactly
//! `true` or `false`. Collections are substituted wholesale into positions
//! like `const services = {{SERVICES}};`.
//!
//! ## Derived Tokens
//!
//! Some tokens are computed rather than copied: the industry slug falls back
//! to a slugified industry label, service slugs fall back to slugified names,
//! `COMPANY_PHONE_DIGITS` strips a phone number down for `tel:` links, and a
//! missing `services` list is filled from the industry preset catalog.
//!
//! ## Vocabulary
//!
//! [`VOCABULARY`] lists every token the canonical template may reference. The
//! builder emits every one of them, so a template that sticks to the
//! vocabulary never produces an unresolved token.

use crate::assets::expected_filename;
use crate::business::{BusinessConfig, Service};
use crate::catalog::{Catalog, IndustryPreset};
use crate::naming;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Social platforms that always get a `SOCIAL_<PLATFORM>_URL` token.
pub const SOCIAL_PLATFORMS: &[&str] = &[
    "facebook",
    "instagram",
    "twitter",
    "linkedin",
    "youtube",
    "google",
    "yelp",
    "nextdoor",
];

/// Every token the canonical template may reference.
pub const VOCABULARY: &[&str] = &[
    // company
    "COMPANY_NAME",
    "COMPANY_SLUG",
    "COMPANY_PHONE",
    "COMPANY_PHONE_DIGITS",
    "COMPANY_EMAIL",
    "COMPANY_WEBSITE",
    "COMPANY_STREET",
    "COMPANY_CITY",
    "COMPANY_STATE",
    "COMPANY_ZIP",
    "COMPANY_FULL_ADDRESS",
    "COMPANY_LICENSE",
    "YEARS_IN_BUSINESS",
    // branding
    "LOGO_URL",
    "FAVICON_URL",
    "PRIMARY_COLOR",
    "SECONDARY_COLOR",
    "ACCENT_COLOR",
    "HEADING_FONT",
    "BODY_FONT",
    "BRAND_ICON",
    "TAGLINE",
    // industry
    "INDUSTRY_TYPE",
    "INDUSTRY_SLUG",
    "EMERGENCY_SERVICE",
    "SCHEMA_TYPE",
    // service area
    "SERVICE_AREAS",
    "SERVICE_RADIUS",
    "PRIMARY_CITY",
    // social
    "SOCIAL_FACEBOOK_URL",
    "SOCIAL_INSTAGRAM_URL",
    "SOCIAL_TWITTER_URL",
    "SOCIAL_LINKEDIN_URL",
    "SOCIAL_YOUTUBE_URL",
    "SOCIAL_GOOGLE_URL",
    "SOCIAL_YELP_URL",
    "SOCIAL_NEXTDOOR_URL",
    "SOCIAL_LINKS",
    // seo
    "SEO_TITLE",
    "SEO_DESCRIPTION",
    "SEO_KEYWORDS",
    // reviews
    "REVIEW_RATING",
    "REVIEW_COUNT",
    // collections
    "BUSINESS_HOURS",
    "SERVICES",
    "TESTIMONIALS",
    "FAQ_ITEMS",
    "GALLERY_IMAGES",
    "HAS_TESTIMONIALS",
    "HAS_FAQ",
    "HAS_GALLERY",
];

/// Default URL prefix for service images referenced from generated pages.
pub const DEFAULT_ASSET_URL_PREFIX: &str = "/images/services/";

/// Immutable placeholder → replacement mapping for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenMap {
    entries: BTreeMap<String, String>,
}

impl TokenMap {
    /// Build a map from explicit entries (substitute vocabularies, tests).
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in token-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// SHA-256 over the sorted entries, as hex.
    ///
    /// Two runs with the same fingerprint substituted identical text.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.entries {
            hasher.update(name.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Referenced placeholders this map has no entry for, with the files
    /// that reference each one.
    pub fn gaps(
        &self,
        referenced: &BTreeMap<PathBuf, BTreeSet<String>>,
    ) -> BTreeMap<String, BTreeSet<PathBuf>> {
        let mut gaps: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        for (file, names) in referenced {
            for name in names.iter().filter(|n| !self.contains(n)) {
                gaps.entry(name.clone()).or_default().insert(file.clone());
            }
        }
        gaps
    }
}

/// Service entry as emitted into the `SERVICES` token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceToken<'a> {
    name: &'a str,
    slug: String,
    short_description: &'a str,
    description: &'a str,
    image: String,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    features: &'a [String],
}

/// Builds a [`TokenMap`] from a business config against a catalog.
pub struct TokenMapBuilder<'a> {
    catalog: &'a Catalog,
    asset_url_prefix: String,
}

impl<'a> TokenMapBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            asset_url_prefix: DEFAULT_ASSET_URL_PREFIX.to_string(),
        }
    }

    /// URL prefix prepended to derived service image filenames.
    pub fn asset_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_url_prefix = prefix.into();
        self
    }

    pub fn build(&self, config: &BusinessConfig) -> TokenMap {
        let mut t = BTreeMap::new();
        let mut put = |name: &str, value: String| {
            t.insert(name.to_string(), value);
        };
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let company = &config.company;
        put("COMPANY_NAME", company.name.clone());
        put("COMPANY_SLUG", company.slug.clone());
        put("COMPANY_PHONE", text(&company.phone));
        put(
            "COMPANY_PHONE_DIGITS",
            company.phone.as_deref().map(phone_digits).unwrap_or_default(),
        );
        put("COMPANY_EMAIL", text(&company.email));
        put("COMPANY_WEBSITE", text(&company.website));
        put("COMPANY_STREET", text(&company.address.street));
        put("COMPANY_CITY", text(&company.address.city));
        put("COMPANY_STATE", text(&company.address.state));
        put("COMPANY_ZIP", text(&company.address.zip));
        put("COMPANY_FULL_ADDRESS", company.address.one_line());
        put("COMPANY_LICENSE", text(&company.license));
        put(
            "YEARS_IN_BUSINESS",
            company
                .years_in_business
                .map(|y| y.to_string())
                .unwrap_or_default(),
        );

        let branding = &config.branding;
        put("LOGO_URL", text(&branding.logo_url));
        put("FAVICON_URL", text(&branding.favicon_url));
        put("PRIMARY_COLOR", text(&branding.primary_color));
        put("SECONDARY_COLOR", text(&branding.secondary_color));
        put("ACCENT_COLOR", text(&branding.accent_color));
        put("HEADING_FONT", text(&branding.heading_font));
        put("BODY_FONT", text(&branding.body_font));
        put("BRAND_ICON", text(&branding.icon));
        put("TAGLINE", text(&branding.tagline));

        let industry_slug = config.industry.effective_slug();
        let preset = self.catalog.lookup(&industry_slug);
        let industry_label = if config.industry.kind.is_empty() {
            preset.map(|p| p.label.clone()).unwrap_or_default()
        } else {
            config.industry.kind.clone()
        };
        put("INDUSTRY_TYPE", industry_label.clone());
        put("INDUSTRY_SLUG", industry_slug.clone());
        put(
            "EMERGENCY_SERVICE",
            bool_token(config.industry.emergency_service),
        );
        put(
            "SCHEMA_TYPE",
            config
                .industry
                .schema_type
                .clone()
                .or_else(|| preset.map(|p| p.schema_type.clone()))
                .unwrap_or_else(|| "LocalBusiness".to_string()),
        );

        let area = &config.service_area;
        put("SERVICE_AREAS", area.areas.join(", "));
        put(
            "SERVICE_RADIUS",
            area.radius.map(|r| r.to_string()).unwrap_or_default(),
        );
        put(
            "PRIMARY_CITY",
            area.primary_city
                .clone()
                .or_else(|| company.address.city.clone())
                .unwrap_or_default(),
        );

        for platform in SOCIAL_PLATFORMS {
            put(&social_token(platform), String::new());
        }
        let mut social_links = BTreeMap::new();
        for (platform, url) in &config.social {
            let url = url.clone().unwrap_or_default();
            if !url.is_empty() {
                social_links.insert(platform.as_str(), url.clone());
            }
            let suffix = naming::token_suffix(platform);
            if !suffix.is_empty() {
                put(&format!("SOCIAL_{suffix}_URL"), url);
            }
        }
        put("SOCIAL_LINKS", to_json(&social_links));

        let seo = &config.seo;
        put(
            "SEO_TITLE",
            seo.title.clone().unwrap_or_else(|| {
                if industry_label.is_empty() {
                    company.name.clone()
                } else {
                    format!("{} | {}", company.name, industry_label)
                }
            }),
        );
        put(
            "SEO_DESCRIPTION",
            seo.description
                .clone()
                .or_else(|| branding.tagline.clone())
                .unwrap_or_default(),
        );
        put("SEO_KEYWORDS", seo.keywords.join(", "));

        put(
            "REVIEW_RATING",
            config
                .reviews
                .rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_default(),
        );
        put(
            "REVIEW_COUNT",
            config
                .reviews
                .count
                .map(|c| c.to_string())
                .unwrap_or_default(),
        );

        put("BUSINESS_HOURS", to_json(&config.hours));
        put(
            "SERVICES",
            self.services_json(config.services.as_deref(), &industry_slug, preset),
        );
        put("TESTIMONIALS", to_json(&config.testimonials));
        put("FAQ_ITEMS", to_json(&config.faq));
        put("GALLERY_IMAGES", to_json(&config.gallery));
        put("HAS_TESTIMONIALS", bool_token(!config.testimonials.is_empty()));
        put("HAS_FAQ", bool_token(!config.faq.is_empty()));
        put("HAS_GALLERY", bool_token(!config.gallery.is_empty()));

        TokenMap { entries: t }
    }

    fn services_json(
        &self,
        services: Option<&[Service]>,
        industry_slug: &str,
        preset: Option<&IndustryPreset>,
    ) -> String {
        let image_url =
            |service_slug: &str| format!("{}{}", self.asset_url_prefix, expected_filename(industry_slug, service_slug));

        let tokens: Vec<ServiceToken> = match services {
            Some(services) => services
                .iter()
                .map(|s| {
                    let slug = s
                        .slug
                        .clone()
                        .unwrap_or_else(|| naming::slugify(&s.name));
                    ServiceToken {
                        name: &s.name,
                        image: s.image.clone().unwrap_or_else(|| image_url(&slug)),
                        slug,
                        short_description: s.short_description.as_deref().unwrap_or_default(),
                        description: s.description.as_deref().unwrap_or_default(),
                        features: &s.features,
                    }
                })
                .collect(),
            None => preset
                .map(|p| {
                    p.services
                        .iter()
                        .map(|s| ServiceToken {
                            name: &s.name,
                            slug: s.slug.clone(),
                            short_description: &s.short_description,
                            description: &s.description,
                            image: image_url(&s.slug),
                            features: &[],
                        })
                        .collect()
                })
                .unwrap_or_default(),
        };
        to_json(&tokens)
    }
}

/// Build a token map with the default asset URL prefix.
pub fn build(config: &BusinessConfig, catalog: &Catalog) -> TokenMap {
    TokenMapBuilder::new(catalog).build(config)
}

fn bool_token(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

fn social_token(platform: &str) -> String {
    format!("SOCIAL_{}_URL", naming::token_suffix(platform))
}

/// Keep digits and a leading `+`: `"+1 (555) 010-2000"` → `"+15550102000"`.
fn phone_digits(phone: &str) -> String {
    let trimmed = phone.trim();
    let mut digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.starts_with('+') {
        digits.insert(0, '+');
    }
    digits
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Plain data structs and string maps always serialize.
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}
