use serde_json::Value;

use crate::error::WebError;

/// Decodes the `players` form field: a JSON array of names.
pub fn parse_players(raw: &str) -> Result<Vec<String>, WebError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|_| WebError::BadRequest("Invalid players JSON".to_string()))?;

    let Value::Array(items) = value else {
        return Err(WebError::BadRequest("Players must be an array".to_string()));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            _ => Err(WebError::BadRequest("Players must be strings".to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<Vec<String>, WebError>) -> String {
        match result {
            Err(WebError::BadRequest(msg)) => msg,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_players() {
        assert_eq!(
            parse_players(r#"["Mario", "Luigi"]"#).unwrap(),
            vec!["Mario".to_string(), "Luigi".to_string()]
        );
        assert_eq!(message(parse_players("not json")), "Invalid players JSON");
        assert_eq!(message(parse_players(r#"{"a": 1}"#)), "Players must be an array");
        assert_eq!(message(parse_players("[1, 2]")), "Players must be strings");
    }
}
