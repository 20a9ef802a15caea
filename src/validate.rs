//! Input validation for the analyze endpoint.
//!
//! Validation happens before anything else so that an invalid request
//! never reaches the completion provider.  The validated text is returned
//! exactly as submitted: no trimming or normalization, so the prompt sees
//! the caller's text byte for byte.

use serde::Serialize;

use crate::AnalyzeRequest;

/// Maximum accepted text length, counted in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// One concrete problem with the request body, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    fn text(message: &str) -> Self {
        Self {
            path: "text".to_string(),
            message: message.to_string(),
        }
    }
}

/// Check the raw request body against the `{ "text": string }` contract.
/// Pure function; returns the issues found or the request unchanged.
pub fn validate_body(body: &serde_json::Value) -> Result<AnalyzeRequest, Vec<FieldIssue>> {
    let text = match body.get("text") {
        Some(serde_json::Value::String(s)) => s,
        Some(_) => return Err(vec![FieldIssue::text("Text must be a string")]),
        None => return Err(vec![FieldIssue::text("Text is required")]),
    };
    if text.is_empty() {
        return Err(vec![FieldIssue::text("Text is required")]);
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(vec![FieldIssue::text(
            "Text must be less than 5000 characters",
        )]);
    }
    Ok(AnalyzeRequest {
        text: text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_missing_text_field() {
        let issues = validate_body(&json!({})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "text");
        assert_eq!(issues[0].message, "Text is required");
    }

    #[test]
    fn rejects_non_string_text() {
        let issues = validate_body(&json!({ "text": 42 })).unwrap_err();
        assert_eq!(issues[0].message, "Text must be a string");
    }

    #[test]
    fn rejects_empty_text() {
        let issues = validate_body(&json!({ "text": "" })).unwrap_err();
        assert_eq!(issues[0].message, "Text is required");
    }

    #[test]
    fn rejects_text_over_limit() {
        let long = "a".repeat(MAX_TEXT_CHARS + 1);
        let issues = validate_body(&json!({ "text": long })).unwrap_err();
        assert_eq!(
            issues[0].message,
            "Text must be less than 5000 characters"
        );
    }

    #[test]
    fn accepts_text_at_limit() {
        let exact = "a".repeat(MAX_TEXT_CHARS);
        let req = validate_body(&json!({ "text": exact })).unwrap();
        assert_eq!(req.text.len(), MAX_TEXT_CHARS);
    }

    #[test]
    fn accepts_single_character() {
        let req = validate_body(&json!({ "text": "x" })).unwrap();
        assert_eq!(req.text, "x");
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 5000 three-byte characters is 15000 bytes but still within bounds.
        let wide = "\u{6709}".repeat(MAX_TEXT_CHARS);
        assert!(validate_body(&json!({ "text": wide })).is_ok());
    }

    #[test]
    fn passes_text_through_without_trimming() {
        let spaced = "  you're overreacting  \n";
        let req = validate_body(&json!({ "text": spaced })).unwrap();
        assert_eq!(req.text, spaced);
    }

    #[test]
    fn rejects_non_object_body() {
        let issues = validate_body(&json!("just a string")).unwrap_err();
        assert_eq!(issues[0].message, "Text is required");
    }
}
