//! PII pattern registry.
//!
//! A fixed, ordered mapping from PII category to the regular expression that
//! recognizes it inside a cell's text. Registry order is the tie-break order
//! for name-based classification; content scanning reports every match.
//!
//! The rules are applied as partial (substring) matches and keep their
//! literal case behavior: the email rule accepts either case, while the PAN
//! rule only matches uppercase letters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A category of personally identifiable information.
///
/// Variant order is the registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiCategory {
    /// Email address
    Email,
    /// Ten-digit phone number
    Phone,
    /// Aadhaar number in `dddd dddd dddd` form
    Aadhaar,
    /// Indian Permanent Account Number
    Pan,
    /// Passport number
    Passport,
    /// US Social Security Number
    Ssn,
}

impl PiiCategory {
    /// All categories in registry order.
    pub const ALL: [Self; 6] = [
        Self::Email,
        Self::Phone,
        Self::Aadhaar,
        Self::Pan,
        Self::Passport,
        Self::Ssn,
    ];

    /// Identifier string, also used for name-based column classification.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Aadhaar => "aadhaar",
            Self::Pan => "pan",
            Self::Passport => "passport",
            Self::Ssn => "ssn",
        }
    }

    /// Source text of the matching rule.
    pub const fn rule(self) -> &'static str {
        match self {
            Self::Email => r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
            Self::Phone => r"\b\d{10}\b",
            Self::Aadhaar => r"\b\d{4}\s\d{4}\s\d{4}\b",
            Self::Pan => r"\b[A-Z]{5}[0-9]{4}[A-Z]{1}\b",
            Self::Passport => r"\b[A-PR-WYa-pr-wy][1-9]\d\s?\d{4}[1-9]\b",
            Self::Ssn => r"\b\d{3}-\d{2}-\d{4}\b",
        }
    }

    /// Tests this category's rule against a value's text.
    pub fn matches(self, text: &str) -> bool {
        patterns()
            .iter()
            .find(|(category, _)| *category == self)
            .is_some_and(|(_, regex)| regex.is_match(text))
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiCategory {
    type Err = crate::error::PiiScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::error::PiiScanError::configuration(format!("Unknown PII category '{}'", s))
            })
    }
}

/// Returns the compiled registry in registry order.
///
/// Compiled once on first use and read-only afterwards.
#[allow(clippy::expect_used)]
pub fn patterns() -> &'static [(PiiCategory, regex::Regex)] {
    static PATTERNS: OnceLock<Vec<(PiiCategory, regex::Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PiiCategory::ALL
            .into_iter()
            .map(|category| {
                let regex = regex::Regex::new(category.rule())
                    .expect("built-in PII pattern must compile");
                (category, regex)
            })
            .collect()
    })
}

/// Yields every category whose rule matches `text`, in registry order.
pub fn matching_categories(text: &str) -> impl Iterator<Item = PiiCategory> + '_ {
    patterns()
        .iter()
        .filter(move |(_, regex)| regex.is_match(text))
        .map(|(category, _)| *category)
}
