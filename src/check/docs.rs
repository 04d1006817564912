//! Documentation links for analyzer diagnostics.
//!
//! Dart has two documentation taxonomies: lint rules (all-lowercase
//! identifiers such as `avoid_print`) and built-in diagnostics (upper-case
//! identifiers such as `DEPRECATED_MEMBER_USE`). The casing rule picks the
//! default page; `overrides` pins a URL for a specific identifier.

use std::collections::HashMap;

use crate::config::DocsConfig;

/// Placeholder substituted with the identifier in URL templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Which documentation page family an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    LintRule,
    Diagnostic,
}

impl DocKind {
    /// Classify an identifier by its casing.
    pub fn of(code: &str) -> Self {
        if code == code.to_lowercase() {
            DocKind::LintRule
        } else {
            DocKind::Diagnostic
        }
    }
}

/// Resolves analyzer identifiers to documentation URLs.
#[derive(Debug, Clone)]
pub struct DocsResolver {
    lint_url: String,
    diagnostic_url: String,
    overrides: HashMap<String, String>,
}

impl DocsResolver {
    pub fn new(config: &DocsConfig) -> Self {
        Self {
            lint_url: config.lint_url.clone(),
            diagnostic_url: config.diagnostic_url.clone(),
            overrides: config.overrides.clone(),
        }
    }

    /// Documentation URL for a lint or diagnostic identifier.
    pub fn url_for(&self, code: &str) -> String {
        if let Some(url) = self.overrides.get(code) {
            return url.clone();
        }
        match DocKind::of(code) {
            DocKind::LintRule => self.lint_url.replace(CODE_PLACEHOLDER, code),
            DocKind::Diagnostic => self
                .diagnostic_url
                .replace(CODE_PLACEHOLDER, &code.to_lowercase()),
        }
    }
}

impl Default for DocsResolver {
    fn default() -> Self {
        Self::new(&DocsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_is_lint_rule() {
        let docs = DocsResolver::default();
        assert_eq!(DocKind::of("avoid_print"), DocKind::LintRule);
        assert_eq!(
            docs.url_for("avoid_print"),
            "https://dart-lang.github.io/linter/lints/avoid_print.html"
        );
    }

    #[test]
    fn test_uppercase_is_diagnostic() {
        let docs = DocsResolver::default();
        assert_eq!(DocKind::of("DEPRECATED_MEMBER_USE"), DocKind::Diagnostic);
        assert_eq!(
            docs.url_for("DEPRECATED_MEMBER_USE"),
            "https://dart.dev/tools/diagnostic-messages#deprecated_member_use"
        );
    }

    #[test]
    fn test_mixed_case_is_diagnostic() {
        assert_eq!(DocKind::of("Unused_Import"), DocKind::Diagnostic);
    }

    #[test]
    fn test_override_wins() {
        let mut config = DocsConfig::default();
        config.overrides.insert(
            "unused_import".to_string(),
            "https://dart.dev/tools/diagnostic-messages#unused_import".to_string(),
        );
        let docs = DocsResolver::new(&config);
        assert_eq!(
            docs.url_for("unused_import"),
            "https://dart.dev/tools/diagnostic-messages#unused_import"
        );
        // Other identifiers still use the casing rule
        assert!(docs.url_for("avoid_print").ends_with("/avoid_print.html"));
    }

    #[test]
    fn test_custom_templates() {
        let config = DocsConfig {
            lint_url: "https://lints.internal/{code}".to_string(),
            diagnostic_url: "https://diag.internal/{code}".to_string(),
            ..DocsConfig::default()
        };
        let docs = DocsResolver::new(&config);
        assert_eq!(docs.url_for("avoid_print"), "https://lints.internal/avoid_print");
        assert_eq!(docs.url_for("DEAD_CODE"), "https://diag.internal/dead_code");
    }
}
