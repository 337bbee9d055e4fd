// Copyright 2026 Montax Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pagination driver: repeated fetch + extract until the result set is
//! exhausted.
//!
//! The portal paginates server-side through the session: page 1 is the
//! search submission itself, and every later page is requested with a bare
//! `TASK=NEXT` payload against the same session. The driver favors partial
//! results over losing fetched data — any failure after page 1 ends the loop
//! but keeps what was already aggregated. Only a failure on page 1 is
//! surfaced as a failed search.

use crate::client::SearchClient;
use crate::extract;
use crate::query::{next_page_payload, CommonParams, SearchQuery};
use crate::session::SessionState;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Fixed output columns, in order.
pub const HEADERS: [&str; 6] = [
    "Ticket",
    "Type",
    "Taxpayer Name",
    "Address",
    "Half Yr Tax",
    "Page",
];

/// Where the run ended relative to the server-reported total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Last page the driver attempted (1-based).
    pub current_page: u32,
    /// Server-reported total, `None` when no marker was ever seen.
    pub total_pages: Option<u32>,
}

/// All fetched records plus the header row and pagination summary.
///
/// Record order is page-major, then document order within a page.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub headers: Vec<String>,
    pub data: Vec<extract::Record>,
    pub pagination: Pagination,
}

/// Terminal state of one search run.
#[derive(Debug)]
pub enum SearchOutcome {
    /// At least one record was found.
    Found(AggregateResult),
    /// The search ran fine but matched nothing. Not a failure.
    NoRecords,
    /// Page 1 could not be fetched at all.
    Failed,
}

/// Driver knobs beyond what the client itself carries.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Stop after this many pages regardless of the server total.
    pub max_pages: Option<u32>,
    /// Draw an indicatif progress bar over the remaining pages.
    pub show_progress: bool,
}

/// Run one search end to end: build the query, fetch page 1, then advance
/// through the remaining pages.
pub async fn run_search(
    client: &SearchClient,
    session: &mut SessionState,
    query: &SearchQuery,
    common: &CommonParams,
    endpoint: &str,
    options: &SearchOptions,
) -> SearchOutcome {
    tracing::info!(max_pages = ?options.max_pages, "starting search with pagination");

    let payload = query.build(session);
    common.apply(session);

    let mut all_records = Vec::new();
    let mut current_page: u32 = 1;

    session.set("SPAGE", "1");
    tracing::info!(page = current_page, "processing page");

    let Some(body) = client.execute(session, &payload, endpoint).await else {
        tracing::error!("initial search failed");
        return SearchOutcome::Failed;
    };

    let first = extract::extract_page(&body, current_page);
    let total_pages = first.total_pages;

    if first.records.is_empty() {
        tracing::warn!("no results found on first page");
        return SearchOutcome::NoRecords;
    }
    all_records.extend(first.records);

    let progress = make_progress_bar(total_pages, options);

    // Keep going while more pages are known to exist, or while the total is
    // unknown — in that case only an empty page or the cap ends the loop.
    while total_pages.map_or(true, |total| current_page < total)
        && options.max_pages.map_or(true, |cap| current_page < cap)
    {
        current_page += 1;
        tracing::info!(page = current_page, total = ?total_pages, "processing page");

        if let Some(bar) = &progress {
            bar.inc(1);
        }

        session.set("SPAGE", &current_page.to_string());

        // Later pages use the NEXT directive, not the search fields.
        let Some(body) = client.execute(session, &next_page_payload(), endpoint).await else {
            tracing::error!(page = current_page, "failed to fetch page, keeping partial results");
            break;
        };

        let page = extract::extract_page(&body, current_page);
        if page.records.is_empty() {
            tracing::warn!(page = current_page, "no results on page, stopping");
            break;
        }
        all_records.extend(page.records);
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    tracing::info!(
        records = all_records.len(),
        pages = current_page,
        "search complete"
    );

    SearchOutcome::Found(AggregateResult {
        headers: HEADERS.iter().map(|h| h.to_string()).collect(),
        data: all_records,
        pagination: Pagination {
            current_page,
            total_pages,
        },
    })
}

fn make_progress_bar(total_pages: Option<u32>, options: &SearchOptions) -> Option<ProgressBar> {
    let total = total_pages?;
    if !options.show_progress || total <= 1 {
        return None;
    }

    let mut remaining = total - 1;
    if let Some(cap) = options.max_pages {
        remaining = remaining.min(cap.saturating_sub(1));
    }
    if remaining == 0 {
        return None;
    }

    let bar = ProgressBar::new(u64::from(remaining));
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len} pages")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Fetching pages");
    Some(bar)
}
