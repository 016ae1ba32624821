//! Categorization result types.

use serde::{Deserialize, Serialize};

use super::Department;

/// Which track of the pipeline produced a categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizationSource {
    /// The external classifier returned a usable answer.
    Classifier,
    /// Keyword scoring stood in for the classifier.
    Keywords,
}

impl CategorizationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategorizationSource::Classifier => "classifier",
            CategorizationSource::Keywords => "keywords",
        }
    }
}

/// A department assignment with a 0-100 confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub department: Department,
    pub confidence: u8,
    pub source: CategorizationSource,
}

impl CategorizationResult {
    /// Build a result, clamping confidence into 0..=100.
    pub fn new(department: Department, confidence: i64, source: CategorizationSource) -> Self {
        Self {
            department,
            confidence: clamp_confidence(confidence),
            source,
        }
    }
}

/// Clamp any integer into the 0..=100 confidence range.
pub fn clamp_confidence(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_confidence() {
        let high = CategorizationResult::new(Department::Hr, 250, CategorizationSource::Classifier);
        assert_eq!(high.confidence, 100);

        let low = CategorizationResult::new(Department::Hr, -4, CategorizationSource::Classifier);
        assert_eq!(low.confidence, 0);

        let ok = CategorizationResult::new(Department::Hr, 42, CategorizationSource::Keywords);
        assert_eq!(ok.confidence, 42);
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&CategorizationSource::Keywords).unwrap();
        assert_eq!(json, "\"keywords\"");
    }
}
