//! Full-result dump command
//!
//! Reads every document matching a query with the chosen pagination
//! strategy.

use super::parse_query;
use crate::error::CliResult;
use crate::output::{create_spinner, print_json, print_lines, success};
use docsift::{ClientConfig, OpenSearchClient, Paginator, Query, Strategy};
use serde_json::Value;

/// Dump options.
pub struct DumpArgs {
    pub index: String,
    pub query: Option<String>,
    pub strategy: Strategy,
    pub lines: bool,
}

/// Run the dump command.
pub async fn run(client: &OpenSearchClient, config: &ClientConfig, args: DumpArgs) -> CliResult<()> {
    let query = match args.query.as_deref() {
        Some(raw) => parse_query(raw)?,
        None => Query::match_all(),
    };

    let paginator = Paginator::from_config(client, args.strategy, config);

    let spinner = create_spinner(&format!("Reading {} with {}...", args.index, args.strategy));
    let docs = paginator.fetch_all(&args.index, &query).await;
    spinner.finish_and_clear();

    let docs: Vec<Value> = docs?.into_iter().map(Value::Object).collect();
    let count = docs.len();

    if args.lines {
        print_lines(&docs)?;
    } else {
        print_json(&Value::Array(docs))?;
    }

    success(&format!("Read {} documents", count));
    Ok(())
}
