//! Slug derivation and validation.
//!
//! Slugs show up in two places at once: as token values inside generated
//! source files, and as fragments of asset filenames
//! (`{industry}-{service}.png`). Both uses need the same restricted alphabet,
//! so every slug that enters the pipeline passes through [`validate_slug`].
//!
//! ## Derived Slugs
//!
//! When a display name is all we have, [`slugify`] lower-cases it and turns
//! every run of non-alphanumeric characters into a single dash:
//! - `"AC Repair"` → `"ac-repair"`
//! - `"Heating & Cooling"` → `"heating-cooling"`
//! - `"  Drain--Cleaning  "` → `"drain-cleaning"`

/// Derive a URL-safe slug from a display name.
///
/// Returns an empty string when the name has no ASCII alphanumerics at all;
/// callers decide whether that is an error.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Why a candidate slug was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugProblem {
    Empty,
    /// First offending character.
    InvalidChar(char),
}

impl std::fmt::Display for SlugProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlugProblem::Empty => write!(f, "must not be empty"),
            SlugProblem::InvalidChar(c) => {
                write!(f, "contains '{c}' (allowed: A-Z, a-z, 0-9, '-', '_')")
            }
        }
    }
}

/// Check that a slug is non-empty and restricted to `[A-Za-z0-9_-]`.
///
/// This rules out path separators, dots, whitespace and the `{`/`}`
/// template delimiters.
pub fn validate_slug(slug: &str) -> Result<(), SlugProblem> {
    if slug.is_empty() {
        return Err(SlugProblem::Empty);
    }
    match slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(SlugProblem::InvalidChar(c)),
        None => Ok(()),
    }
}

/// Token-name form of a free-form key: `"google-business"` → `"GOOGLE_BUSINESS"`.
pub fn token_suffix(key: &str) -> String {
    slugify(key).replace('-', "_").to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_multi_word() {
        assert_eq!(slugify("AC Repair"), "ac-repair");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Heating & Cooling"), "heating-cooling");
    }

    #[test]
    fn slugify_trims_edges() {
        assert_eq!(slugify("  Drain--Cleaning  "), "drain-cleaning");
    }

    #[test]
    fn slugify_keeps_digits() {
        assert_eq!(slugify("24/7 Emergency"), "24-7-emergency");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Déco"), "caf-d-co");
    }

    #[test]
    fn slugify_nothing_usable() {
        assert_eq!(slugify("&&&"), "");
    }

    #[test]
    fn validate_accepts_plain_slug() {
        assert_eq!(validate_slug("hvac"), Ok(()));
        assert_eq!(validate_slug("ac-repair"), Ok(()));
        assert_eq!(validate_slug("Acme_2"), Ok(()));
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate_slug(""), Err(SlugProblem::Empty));
    }

    #[test]
    fn validate_rejects_path_separator() {
        assert_eq!(validate_slug("a/b"), Err(SlugProblem::InvalidChar('/')));
        assert_eq!(validate_slug("..\\b"), Err(SlugProblem::InvalidChar('.')));
    }

    #[test]
    fn validate_rejects_delimiters() {
        assert_eq!(validate_slug("{{X}}"), Err(SlugProblem::InvalidChar('{')));
    }

    #[test]
    fn token_suffix_uppercases() {
        assert_eq!(token_suffix("google-business"), "GOOGLE_BUSINESS");
        assert_eq!(token_suffix("TikTok"), "TIKTOK");
    }
}
