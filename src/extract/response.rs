//! Parsing the extraction service's free-text reply.
//!
//! The model is asked for a clean JSON object but routinely wraps it in
//! prose or a markdown fence. The reply is scanned for the first balanced
//! JSON object and everything around it is ignored.

use serde_json::Value;

use crate::error::{IntakeError, Result};
use crate::schema::IntakeRecord;

/// Find the first balanced JSON object embedded in `text`.
///
/// Brace counting is string-aware: braces inside string literals (and
/// escaped quotes inside those strings) do not affect the balance, so a
/// damage description containing "{" cannot truncate the object.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a service reply into a partial intake record.
///
/// Fails when the reply contains no JSON object, when the object is not
/// valid JSON, or when it is empty. Fields whose values don't fit the
/// schema are dropped rather than failing the whole extraction.
pub fn parse_extraction(reply: &str) -> Result<IntakeRecord> {
    let raw = first_json_object(reply).ok_or_else(IntakeError::no_json_object)?;

    let value: Value =
        serde_json::from_str(raw).map_err(|e| IntakeError::parse_failed(e.to_string()))?;

    let keys = value.as_object().map(|o| o.len()).unwrap_or(0);
    if keys == 0 {
        return Err(IntakeError::nothing_extracted());
    }

    IntakeRecord::from_value(&value).ok_or_else(IntakeError::nothing_extracted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_object() {
        let record = parse_extraction(r#"{"first_name": "Jane"}"#).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_parses_object_after_leading_prose() {
        let reply = "Here you go: {\"first_name\":\"Jane\",\"last_name\":\"Doe\"}";
        let partial = parse_extraction(reply).unwrap();
        assert_eq!(partial.first_name.as_deref(), Some("Jane"));
        assert_eq!(partial.last_name.as_deref(), Some("Doe"));

        let mut record = IntakeRecord::default();
        record.merge(partial);
        assert_eq!(
            crate::schema::missing_fields(&record),
            vec![
                "date_of_birth",
                "phone_number",
                "email_address",
                "primary_language",
                "affected_address",
            ]
        );
    }

    #[test]
    fn test_parses_object_inside_markdown_fence() {
        let reply = "Here you go:\n```json\n{\"last_name\": \"Doe\"}\n```\nLet me know!";
        let record = parse_extraction(reply).unwrap();
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_parses_nested_object() {
        let reply = r#"{"needs_assessment": {"shelter_needed": true}}"#;
        let record = parse_extraction(reply).unwrap();
        assert_eq!(
            record.needs_assessment.unwrap().shelter_needed,
            Some(true)
        );
    }

    #[test]
    fn test_braces_inside_strings_do_not_truncate() {
        let reply = r#"{"damage_description": "wall tagged with {graffiti}", "first_name": "Jane"}"#;
        let record = parse_extraction(reply).unwrap();
        assert_eq!(
            record.damage_description.as_deref(),
            Some("wall tagged with {graffiti}")
        );
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let reply = r#"{"damage_description": "the \"good\" room { flooded"}"#;
        let record = parse_extraction(reply).unwrap();
        assert!(record.damage_description.is_some());
    }

    #[test]
    fn test_no_object_at_all() {
        let err = parse_extraction("I could not find any information.").unwrap_err();
        assert_eq!(err.to_string(), "No JSON object found in response");
    }

    #[test]
    fn test_unterminated_object() {
        let err = parse_extraction(r#"{"first_name": "Jane""#).unwrap_err();
        assert_eq!(err.to_string(), "No JSON object found in response");
    }

    #[test]
    fn test_invalid_json_reports_detail() {
        let err = parse_extraction(r#"{"first_name": Jane}"#).unwrap_err();
        let message = err.to_string();
        assert!(
            message.starts_with("Failed to parse response: "),
            "got: {}",
            message
        );
    }

    #[test]
    fn test_empty_object_is_nothing_extracted() {
        let err = parse_extraction("{}").unwrap_err();
        assert_eq!(err.to_string(), "No valid information extracted");
    }

    #[test]
    fn test_mismatched_values_drop_but_object_still_parses() {
        // An object with keys whose values all fail coercion still counts
        // as an extraction; completeness checking handles the absence.
        let record = parse_extraction(r#"{"household_members": "a few"}"#).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_first_object_wins() {
        let reply = r#"{"first_name": "Jane"} and also {"first_name": "Janet"}"#;
        let record = parse_extraction(reply).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
    }
}
