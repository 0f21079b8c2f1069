//! Token extraction from provisioning output.

use serde_json::Value;

/// Extract the platform API token from `terraform output -json` text.
///
/// Looks up the nested value at `result.value.token`. This is deliberately
/// lenient: malformed JSON, a missing path, an empty token, or the literal
/// string `"null"` all yield `None`. It never returns an error and never
/// panics.
pub fn extract_token(output_json: &str) -> Option<String> {
    let data: Value = serde_json::from_str(output_json).ok()?;
    let token = data.get("result")?.get("value")?.get("token")?.as_str()?;
    if token.is_empty() || token == "null" {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_present() {
        let json = r#"{"result":{"value":{"token":"tok-abc123","message":"done"}}}"#;
        assert_eq!(extract_token(json), Some("tok-abc123".to_string()));
    }

    #[test]
    fn test_extract_token_preserved_verbatim() {
        let json = r#"{"result":{"value":{"token":"sk.live/WEIRD==chars"}}}"#;
        assert_eq!(extract_token(json), Some("sk.live/WEIRD==chars".to_string()));
    }

    #[test]
    fn test_extract_token_missing_path() {
        assert_eq!(extract_token("{}"), None);
        assert_eq!(extract_token(r#"{"result":{}}"#), None);
        assert_eq!(extract_token(r#"{"result":{"value":{}}}"#), None);
        assert_eq!(extract_token(r#"{"other":{"value":{"token":"x"}}}"#), None);
    }

    #[test]
    fn test_extract_token_not_json() {
        assert_eq!(extract_token("not json"), None);
        assert_eq!(extract_token(""), None);
    }

    #[test]
    fn test_extract_token_rejects_empty_and_null() {
        assert_eq!(extract_token(r#"{"result":{"value":{"token":""}}}"#), None);
        assert_eq!(extract_token(r#"{"result":{"value":{"token":"null"}}}"#), None);
        // JSON null is not a string either
        assert_eq!(extract_token(r#"{"result":{"value":{"token":null}}}"#), None);
    }

    #[test]
    fn test_extract_token_non_string_value() {
        assert_eq!(extract_token(r#"{"result":{"value":{"token":42}}}"#), None);
    }
}
