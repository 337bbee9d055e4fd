//! HTML result extraction for one portal response page.
//!
//! The portal renders results as a fixed table shape that has not changed in
//! years, so extraction is regex-based, anchored on the stable pieces of the
//! markup: the `TICKET.html?TPTYR=...` link target, the `tdtext` font class,
//! and the nested amount divs. Attribute ordering and whitespace vary between
//! responses; the patterns tolerate both. Malformed rows simply fail to
//! match — extraction never errors, it just yields fewer records.

use regex::Regex;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::sync::LazyLock;

/// "Page X of &nbsp; Y" — the form the portal actually emits, with an HTML
/// entity between "of" and the total.
static PAGE_MARKER_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Page\s+\d+\s+of\s+&nbsp;\s*(\d+)").expect("static pattern")
});

/// Plain-spaced fallback for the page marker.
static PAGE_MARKER_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page\s+\d+\s+of\s+(\d+)").expect("static pattern"));

/// One result row. Nine captures: ticket year, ticket number, suffix (from
/// the link target), the display label, the type field (linked or plain),
/// taxpayer name, address, and the half-year amount.
static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)<tr class="[^"]*">\s*"#,
        r#"<TD class=left[^>]*>.*?"#,
        r#"<A href="TICKET\.html\?TPTYR=(\d+)&amp;TPTICK=(\d+)&amp;TPSX=([^"]*)"[^>]*>"#,
        r#"(\d+ -\s*\d+\s*[^<]*)</a>.*?</TD>\s*"#,
        r#"<td>.*?(?:<A[^>]*>([^<]*)</A>|([^<]*)).*?</td>\s*"#,
        r#"<td>.*?<font class="tdtext">([^<]*)</font></td>\s*"#,
        r#"<td>.*?<font class="tdtext">([^<]*)</font></td>\s*"#,
        r#"<td[^>]*>.*?<div[^>]*>.*?<div[^>]*>.*?</div>\s*([^<]*)</div>\s*</td>\s*"#,
        r#"</tr>"#,
    ))
    .expect("static pattern")
});

/// One extracted tax record. All fields are trimmed display text; amounts
/// are not parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Display label of the ticket, e.g. "2024 - 12345 REAL".
    pub ticket: String,
    /// Record type, empty when the portal leaves the cell blank.
    pub record_type: String,
    pub taxpayer_name: String,
    pub address: String,
    /// Half-year tax amount as displayed.
    pub amount: String,
    /// Which results page this record came from (1-based).
    pub page: u32,
}

impl Record {
    /// Render as one output row matching [`crate::paginate::HEADERS`].
    pub fn as_row(&self) -> [String; 6] {
        [
            self.ticket.clone(),
            self.record_type.clone(),
            self.taxpayer_name.clone(),
            self.address.clone(),
            self.amount.clone(),
            format!("Page {}", self.page),
        ]
    }
}

// Records serialize as flat 6-cell rows so the JSON export is a plain
// headers + rows table, not a list of objects.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let row = self.as_row();
        let mut seq = serializer.serialize_seq(Some(row.len()))?;
        for cell in &row {
            seq.serialize_element(cell)?;
        }
        seq.end()
    }
}

/// Everything recovered from one response page.
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    /// Server-reported total page count, `None` when the marker is absent.
    pub total_pages: Option<u32>,
    /// Records in document order.
    pub records: Vec<Record>,
}

/// Parse one HTML page into a page-count hint and its records.
///
/// Zero matched rows is not an error; the pagination driver treats it as
/// end-of-results.
pub fn extract_page(html: &str, page_number: u32) -> PageResult {
    let total_pages = find_total_pages(html);
    if let Some(total) = total_pages {
        tracing::info!(total, "total pages reported by server");
    }

    let records: Vec<Record> = ROW
        .captures_iter(html)
        .map(|caps| {
            // Type is in capture 5 (linked) or 6 (plain), whichever matched.
            let record_type = caps
                .get(5)
                .or_else(|| caps.get(6))
                .map(|m| m.as_str().trim())
                .unwrap_or("");

            Record {
                ticket: caps[4].trim().to_string(),
                record_type: record_type.to_string(),
                taxpayer_name: caps[7].trim().to_string(),
                address: caps[8].trim().to_string(),
                amount: caps[9].trim().to_string(),
                page: page_number,
            }
        })
        .collect();

    tracing::info!(
        count = records.len(),
        page = page_number,
        "extracted records from page"
    );

    PageResult {
        total_pages,
        records,
    }
}

/// Find the server-reported total page count, entity-spaced form first.
pub fn find_total_pages(html: &str) -> Option<u32> {
    PAGE_MARKER_ENTITY
        .captures(html)
        .or_else(|| PAGE_MARKER_PLAIN.captures(html))
        .and_then(|caps| caps[1].parse().ok())
}
