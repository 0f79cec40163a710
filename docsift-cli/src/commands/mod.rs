//! CLI command implementations.

pub mod documents;
pub mod dump;
pub mod fields;

use crate::error::{CliError, CliResult};
use docsift::Query;

/// Parse a query given on the command line as a JSON object.
pub fn parse_query(raw: &str) -> CliResult<Query> {
    let query: Query = raw
        .parse()
        .map_err(|e| CliError::InvalidArgument(format!("query is not valid JSON: {}", e)))?;

    if !query.as_json().is_object() {
        return Err(CliError::InvalidArgument(
            "query must be a JSON object".to_string(),
        ));
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_object() {
        let query = parse_query(r#"{"term": {"key1": 3}}"#).unwrap();
        assert_eq!(query.as_json()["term"]["key1"], 3);
    }

    #[test]
    fn test_parse_query_rejects_non_objects() {
        for raw in ["5", r#""match_all""#, "[]", "null"] {
            assert!(
                matches!(parse_query(raw), Err(CliError::InvalidArgument(_))),
                "{} was accepted",
                raw
            );
        }
    }

    #[test]
    fn test_parse_query_rejects_invalid_json() {
        assert!(matches!(
            parse_query("{match_all}"),
            Err(CliError::InvalidArgument(msg)) if msg.contains("not valid JSON")
        ));
    }
}
