//! Keyword-overlap scoring used when the classifier is unavailable.
//!
//! Matching is plain substring containment on the lowercased
//! `title + " " + description`, so "hr" also matches inside "three".
//! Each keyword counts at most once per department.

use std::collections::BTreeMap;

use tracing::info;

use super::types::{CategorizationResult, CategorizationSource};
use super::Department;

/// Base confidence for a keyword match before density is added.
const BASE_CONFIDENCE: i64 = 50;
/// Confidence added per matched keyword.
const CONFIDENCE_PER_MATCH: i64 = 10;
/// Keyword scoring never claims more than this.
const MAX_KEYWORD_CONFIDENCE: i64 = 75;

const IT_SUPPORT_KEYWORDS: &[&str] = &[
    "computer",
    "laptop",
    "software",
    "hardware",
    "network",
    "internet",
    "email",
    "password",
    "login",
    "system",
    "application",
    "printer",
    "wifi",
    "server",
    "database",
    "access",
    "account",
];

const HR_KEYWORDS: &[&str] = &[
    "payroll",
    "salary",
    "benefits",
    "leave",
    "vacation",
    "sick",
    "employee",
    "hiring",
    "training",
    "performance",
    "hr",
    "human resources",
];

const FACILITIES_KEYWORDS: &[&str] = &[
    "building",
    "office",
    "room",
    "maintenance",
    "cleaning",
    "parking",
    "security",
    "temperature",
    "hvac",
    "desk",
    "chair",
    "facility",
    "repair",
];

const FINANCE_KEYWORDS: &[&str] = &[
    "budget",
    "expense",
    "invoice",
    "payment",
    "reimbursement",
    "purchase",
    "accounting",
    "financial",
    "cost",
    "money",
];

/// Trigger words for a department. General has none and only wins by default.
pub fn keywords_for(department: Department) -> &'static [&'static str] {
    match department {
        Department::ItSupport => IT_SUPPORT_KEYWORDS,
        Department::Hr => HR_KEYWORDS,
        Department::Facilities => FACILITIES_KEYWORDS,
        Department::Finance => FINANCE_KEYWORDS,
        Department::General => &[],
    }
}

/// Deterministic keyword scorer.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    fallback_confidence: u8,
}

impl KeywordScorer {
    /// Create a scorer that reports `fallback_confidence` when nothing matches.
    pub fn new(fallback_confidence: u8) -> Self {
        Self {
            fallback_confidence: fallback_confidence.min(100),
        }
    }

    /// Number of distinct keywords matched per department, General included at 0.
    pub fn match_counts(&self, title: &str, description: &str) -> BTreeMap<Department, usize> {
        let text = format!("{} {}", title, description).to_lowercase();

        Department::ALL
            .into_iter()
            .map(|department| {
                let count = keywords_for(department)
                    .iter()
                    .filter(|keyword| text.contains(*keyword))
                    .count();
                (department, count)
            })
            .collect()
    }

    /// Score a ticket. Never fails.
    pub fn score(&self, title: &str, description: &str) -> CategorizationResult {
        let counts = self.match_counts(title, description);

        // Strictly-greater comparison keeps the earliest department on ties.
        let mut best = (Department::General, 0usize);
        for department in Department::ALL {
            let count = counts.get(&department).copied().unwrap_or(0);
            if count > best.1 {
                best = (department, count);
            }
        }

        let result = match best {
            (_, 0) => CategorizationResult::new(
                Department::General,
                self.fallback_confidence as i64,
                CategorizationSource::Keywords,
            ),
            (department, count) => CategorizationResult::new(
                department,
                (BASE_CONFIDENCE + CONFIDENCE_PER_MATCH * count as i64).min(MAX_KEYWORD_CONFIDENCE),
                CategorizationSource::Keywords,
            ),
        };

        info!(
            department = %result.department,
            confidence = result.confidence,
            "Fallback categorization"
        );
        result
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FALLBACK_CONFIDENCE)
    }
}
