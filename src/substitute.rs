//! Placeholder substitution.
//!
//! A placeholder is an upper-case, underscore-separated identifier wrapped in
//! double braces: `{{COMPANY_NAME}}`, `{{SOCIAL_YELP_URL}}`. Anything else
//! between braces (`{{ color: x }}` in JSX, `{{name}}` in a mustache
//! snippet) is not a placeholder and is left alone.
//!
//! ## Single Pass
//!
//! The content is scanned once and every match is replaced from the original
//! text. Replacement values are never scanned again, so a value that happens
//! to contain `{{SOMETHING}}` is emitted literally. This rules out both
//! substitution injection and expansion loops.
//!
//! ## Matching
//!
//! Names match exactly. `{{COMPANY_NAME_SHORT}}` never picks up the value of
//! `COMPANY_NAME`; the full identifier between the delimiters is the key.
//!
//! ## Unresolved Tokens
//!
//! A placeholder with no entry in the token map is left in place verbatim
//! and its name is reported. That is a diagnostic, not an error.

use crate::tokens::TokenMap;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Z][A-Z0-9]*(?:_[A-Z0-9]+)*)\}\}").expect("placeholder pattern is valid")
});

/// Output of one substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub content: String,
    /// Placeholder names with no token map entry, left verbatim.
    pub unresolved: BTreeSet<String>,
}

impl Substitution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace every placeholder in `content` using `tokens`.
pub fn substitute(content: &str, tokens: &TokenMap) -> Substitution {
    let mut unresolved = BTreeSet::new();
    let replaced = PLACEHOLDER.replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        match tokens.get(name) {
            Some(value) => value.to_string(),
            None => {
                unresolved.insert(name.to_string());
                caps[0].to_string()
            }
        }
    });
    Substitution {
        content: replaced.into_owned(),
        unresolved,
    }
}

/// Distinct placeholder names appearing in `content`.
pub fn scan_tokens(content: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenMap {
        TokenMap::from_entries([
            ("COMPANY_NAME", "Acme"),
            ("COMPANY_NAME_SHORT", "AC"),
            ("EMERGENCY_SERVICE", "true"),
            ("SERVICES", r#"[{"name":"AC Repair"}]"#),
            ("EMPTY", ""),
        ])
    }

    #[test]
    fn replaces_every_occurrence() {
        let out = substitute("{{COMPANY_NAME}} and {{COMPANY_NAME}}", &tokens());
        assert_eq!(out.content, "Acme and Acme");
        assert!(out.is_complete());
    }

    #[test]
    fn string_boolean_idiom() {
        let out = substitute(
            r#"const emergency = "{{EMERGENCY_SERVICE}}" === "true";"#,
            &tokens(),
        );
        assert_eq!(out.content, r#"const emergency = "true" === "true";"#);
    }

    #[test]
    fn json_collection_in_array_position() {
        let out = substitute("const services = {{SERVICES}};", &tokens());
        assert_eq!(out.content, r#"const services = [{"name":"AC Repair"}];"#);
    }

    #[test]
    fn unresolved_left_in_place_and_reported() {
        let out = substitute("{{COMPANY_NAME}} {{HERO_VIDEO}} {{HERO_VIDEO}}", &tokens());
        assert_eq!(out.content, "Acme {{HERO_VIDEO}} {{HERO_VIDEO}}");
        assert_eq!(out.unresolved.into_iter().collect::<Vec<_>>(), vec!["HERO_VIDEO"]);
    }

    #[test]
    fn empty_value_is_resolved() {
        let out = substitute("[{{EMPTY}}]", &tokens());
        assert_eq!(out.content, "[]");
        assert!(out.is_complete());
    }

    #[test]
    fn value_containing_placeholder_not_resubstituted() {
        let tokens = TokenMap::from_entries([
            ("TAGLINE", "we love {{COMPANY_NAME}}"),
            ("COMPANY_NAME", "Acme"),
        ]);
        let out = substitute("{{TAGLINE}} / {{COMPANY_NAME}}", &tokens);
        assert_eq!(out.content, "we love {{COMPANY_NAME}} / Acme");
        assert!(out.is_complete());
    }

    #[test]
    fn self_referential_value_terminates() {
        let tokens = TokenMap::from_entries([("LOOP", "{{LOOP}}{{LOOP}}")]);
        let out = substitute("{{LOOP}}", &tokens);
        assert_eq!(out.content, "{{LOOP}}{{LOOP}}");
    }

    #[test]
    fn longest_exact_name_wins() {
        let out = substitute("{{COMPANY_NAME_SHORT}}|{{COMPANY_NAME}}", &tokens());
        assert_eq!(out.content, "AC|Acme");
    }

    #[test]
    fn prefix_of_known_token_is_not_partially_matched() {
        let out = substitute("{{COMPANY_NAME_LONG}}", &tokens());
        assert_eq!(out.content, "{{COMPANY_NAME_LONG}}");
        assert!(out.unresolved.contains("COMPANY_NAME_LONG"));
    }

    #[test]
    fn non_placeholder_braces_untouched() {
        let input = "<div style={{ color: 'red' }}>{{company_name}} {{ COMPANY_NAME }} {{_X}} {{A__B}}</div>";
        let out = substitute(input, &tokens());
        assert_eq!(out.content, input);
        assert!(out.is_complete());
    }

    #[test]
    fn triple_braces_keep_outer_brace() {
        let out = substitute("{{{COMPANY_NAME}}}", &tokens());
        assert_eq!(out.content, "{Acme}");
    }

    #[test]
    fn empty_content() {
        let out = substitute("", &tokens());
        assert_eq!(out.content, "");
        assert!(out.is_complete());
    }

    #[test]
    fn scan_lists_distinct_names() {
        let names = scan_tokens("{{B}} {{A}} {{B}} {{lower}} {{A_1}}");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["A", "A_1", "B"]);
    }
}
