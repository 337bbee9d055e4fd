//! Shared runner for the four search subcommands.

use crate::client::{ClientConfig, SearchClient};
use crate::export;
use crate::paginate::{self, SearchOptions, SearchOutcome};
use crate::query::{CommonParams, SearchQuery};
use crate::session::SessionState;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the runner needs besides the query itself.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub domain: String,
    pub url: Option<String>,
    pub output: Option<PathBuf>,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_pages: Option<u32>,
    pub quiet: bool,
}

/// Run one search: init the session, drive pagination, save or summarize.
pub async fn run(query: SearchQuery, common: CommonParams, args: RunArgs) -> Result<()> {
    let client = SearchClient::new(ClientConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        user_agent: args.user_agent.clone(),
        ..Default::default()
    })?;

    let endpoint = SearchClient::resolve_endpoint(&args.domain, args.url.as_deref());
    let mut session = SessionState::initialize(&args.domain);

    if !args.quiet {
        println!("Starting search... (URL: {endpoint})");
    }

    let options = SearchOptions {
        max_pages: args.max_pages,
        show_progress: !args.quiet,
    };
    let outcome =
        paginate::run_search(&client, &mut session, &query, &common, &endpoint, &options).await;

    match outcome {
        SearchOutcome::Failed => {
            println!("Search failed - no response from server");
        }
        SearchOutcome::NoRecords => {
            println!("No tax records found");
        }
        SearchOutcome::Found(results) => {
            if let Some(path) = &args.output {
                match export::save(&results, path) {
                    Ok(()) => println!("Results saved to {}", path.display()),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to save results");
                        println!("Failed to save results: {e}");
                    }
                }
            } else {
                print_summary(&results, args.max_pages);
            }
        }
    }

    Ok(())
}

fn print_summary(results: &paginate::AggregateResult, max_pages: Option<u32>) {
    println!("Found {} records", results.data.len());

    let pagination = &results.pagination;
    if let Some(total) = pagination.total_pages {
        if total > 1 {
            println!("Showing page {} of {}", pagination.current_page, total);
            if let Some(cap) = max_pages {
                if pagination.current_page < total {
                    println!("Note: Only retrieved {cap} of {total} total pages");
                }
            }
        }
    }
}
