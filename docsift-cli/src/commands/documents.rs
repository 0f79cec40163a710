//! Document commands
//!
//! Writes sample documents, looks documents up by ID and runs single-page
//! queries.

use super::parse_query;
use crate::error::CliResult;
use crate::output::{create_spinner, info, print_json, success};
use colored::Colorize;
use docsift::OpenSearchClient;
use docsift::documents;
use serde_json::Value;

/// Write `count` sample documents and make them searchable.
pub async fn inject(client: &OpenSearchClient, index: &str, count: usize) -> CliResult<()> {
    info(&format!("Injecting {} documents into {}", count, index.cyan()));

    let spinner = create_spinner("Writing documents...");
    let written = documents::inject(client, index, count).await;
    spinner.finish_and_clear();
    written?;

    client.refresh(index).await?;

    success(&format!("Injected {} documents", count));
    Ok(())
}

/// Print the source of the document with the given ID.
pub async fn get(client: &OpenSearchClient, index: &str, id: &str) -> CliResult<()> {
    let doc = documents::get_by_id(client, index, id).await?;
    print_json(&Value::Object(doc))
}

/// Print the first `size` documents matching a query.
pub async fn query(client: &OpenSearchClient, index: &str, raw: &str, size: usize) -> CliResult<()> {
    let query = parse_query(raw)?;
    let docs = documents::search(client, index, &query, size).await?;

    print_json(&Value::Array(docs.into_iter().map(Value::Object).collect()))
}
