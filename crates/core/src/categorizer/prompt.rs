//! Classifier prompt and response parsing.

use std::num::IntErrorKind;

use tracing::warn;

use super::types::clamp_confidence;
use super::Department;

const DEPARTMENT_PREFIX: &str = "Department:";
const CONFIDENCE_PREFIX: &str = "Confidence:";

/// Build the instruction text sent to the classifier.
///
/// Title and description are embedded verbatim.
pub fn build_prompt(title: &str, description: &str) -> String {
    format!(
        "Categorize this support ticket into exactly one of these departments: IT Support, HR, Facilities, Finance, or General.

Ticket Title: {title}
Ticket Description: {description}

Respond in this exact format:
Department: [department name]
Confidence: [number from 0-100]

Rules:
- IT Support: Technical issues, software, hardware, network, passwords, computers, internet, email, applications
- HR: Employee relations, benefits, payroll, hiring, leave, training, performance reviews, workplace issues
- Facilities: Building maintenance, office space, equipment, cleaning, parking, security, temperature
- Finance: Budgets, expenses, invoicing, purchasing, reimbursements, accounting, financial reports
- General: Everything else that doesn't fit above categories"
    )
}

/// What could be extracted from a classifier response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    pub department: Option<Department>,
    pub confidence: Option<u8>,
}

/// Extract a department and confidence from free-text classifier output.
///
/// Lines are trimmed before prefix matching. A `Department:` line naming a
/// known department (case-insensitive) sets the department; an unknown name
/// leaves any earlier value in place. A `Confidence:` line sets the clamped
/// confidence, or clears it when the value is not an integer.
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    for line in text.lines() {
        let line = line.trim();

        if let Some(name) = line.strip_prefix(DEPARTMENT_PREFIX) {
            if let Some(department) = Department::from_name_ignore_case(name) {
                parsed.department = Some(department);
            }
        } else if let Some(value) = line.strip_prefix(CONFIDENCE_PREFIX) {
            match parse_integer(value.trim()) {
                Some(n) => parsed.confidence = Some(clamp_confidence(n)),
                None => {
                    warn!("Could not parse confidence value: {}", line);
                    parsed.confidence = None;
                }
            }
        }
    }

    parsed
}

/// Parse a signed decimal integer. Values beyond `i64` saturate, which
/// the later clamp maps to 0 or 100.
fn parse_integer(value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_ticket_verbatim() {
        let prompt = build_prompt("  VPN down ", "Cannot reach\nthe intranet");
        assert!(prompt.contains("Ticket Title:   VPN down \n"));
        assert!(prompt.contains("Ticket Description: Cannot reach\nthe intranet\n"));
        assert!(prompt.contains("Department: [department name]"));
        assert!(prompt.contains("Confidence: [number from 0-100]"));
        for name in Department::names() {
            assert!(prompt.contains(name));
        }
    }

    #[test]
    fn test_parse_well_formed() {
        let parsed = parse_response("Department: HR\nConfidence: 85");
        assert_eq!(parsed.department, Some(Department::Hr));
        assert_eq!(parsed.confidence, Some(85));
    }

    #[test]
    fn test_parse_case_insensitive_department() {
        let parsed = parse_response("Department: it support\nConfidence: 90");
        assert_eq!(parsed.department, Some(Department::ItSupport));
    }

    #[test]
    fn test_parse_indented_lines_and_noise() {
        let parsed = parse_response(
            "Sure! Here is my answer.\n   Department:   Facilities  \n\tConfidence: 64\nThanks",
        );
        assert_eq!(parsed.department, Some(Department::Facilities));
        assert_eq!(parsed.confidence, Some(64));
    }

    #[test]
    fn test_parse_missing_confidence() {
        let parsed = parse_response("Department: Finance");
        assert_eq!(parsed.department, Some(Department::Finance));
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn test_parse_unknown_department() {
        let parsed = parse_response("Department: Legal\nConfidence: 99");
        assert_eq!(parsed.department, None);
        assert_eq!(parsed.confidence, Some(99));
    }

    #[test]
    fn test_parse_clamps_confidence() {
        assert_eq!(parse_response("Confidence: 150").confidence, Some(100));
        assert_eq!(parse_response("Confidence: -20").confidence, Some(0));
    }

    #[test]
    fn test_parse_saturates_huge_confidence() {
        let parsed = parse_response("Department: HR\nConfidence: 99999999999999999999");
        assert_eq!(parsed.department, Some(Department::Hr));
        assert_eq!(parsed.confidence, Some(100));

        let parsed = parse_response("Confidence: -99999999999999999999");
        assert_eq!(parsed.confidence, Some(0));

        let parsed = parse_response("Confidence: +42");
        assert_eq!(parsed.confidence, Some(42));
    }

    #[test]
    fn test_parse_unparseable_confidence_is_absent() {
        let parsed = parse_response("Department: HR\nConfidence: very high");
        assert_eq!(parsed.department, Some(Department::Hr));
        assert_eq!(parsed.confidence, None);

        let parsed = parse_response("Department: HR\nConfidence: 80%");
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn test_parse_later_bad_confidence_clears_earlier() {
        let parsed = parse_response("Confidence: 80\nConfidence: n/a\nDepartment: HR");
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn test_parse_unknown_department_keeps_earlier_match() {
        let parsed = parse_response("Department: HR\nDepartment: Legal");
        assert_eq!(parsed.department, Some(Department::Hr));

        let parsed = parse_response("Department: HR\nDepartment: Finance");
        assert_eq!(parsed.department, Some(Department::Finance));
    }

    #[test]
    fn test_parse_prefix_is_case_sensitive() {
        let parsed = parse_response("department: HR\nconfidence: 50");
        assert_eq!(parsed, ParsedResponse::default());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_response(""), ParsedResponse::default());
    }
}
