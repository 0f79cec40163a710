//! Field listing command

use crate::error::CliResult;
use crate::output::print_json;
use docsift::OpenSearchClient;
use docsift::schema::field_paths;
use serde_json::Value;

/// Print every leaf field of an index, one dotted path per line.
///
/// With `json`, print the paths as arrays of segments instead, which keeps
/// field names containing `.` unambiguous.
pub async fn run(client: &OpenSearchClient, index: &str, json: bool) -> CliResult<()> {
    let paths = field_paths(client, index).await?;

    if json {
        let segments = paths
            .into_iter()
            .map(|p| Value::from(p.into_segments()))
            .collect();
        return print_json(&Value::Array(segments));
    }

    for path in &paths {
        println!("{}", path);
    }
    Ok(())
}
