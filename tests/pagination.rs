//! End-to-end pagination tests against a mock portal.
//!
//! The mock serves canned HTML in the portal's table shape. Page 1 is the
//! search submission; later pages answer only to the `TASK=NEXT` directive,
//! exactly like the real backend.

use montax::client::{ClientConfig, SearchClient};
use montax::paginate::{run_search, SearchOptions, SearchOutcome};
use montax::query::{CommonParams, SearchQuery};
use montax::session::SessionState;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn row(year: &str, num: &str, name: &str, addr: &str, amount: &str) -> String {
    format!(
        concat!(
            "<tr class=\"rowalt\">\n",
            "<TD class=left nowrap>",
            "<A href=\"TICKET.html?TPTYR={y}&amp;TPTICK={n}&amp;TPSX=\">{y} - {n} REAL</a>",
            "</TD>\n",
            "<td><A href=\"#\">R</A></td>\n",
            "<td><font class=\"tdtext\">{name}</font></td>\n",
            "<td><font class=\"tdtext\">{addr}</font></td>\n",
            "<td align=right><div class=\"amt\"><div class=\"lbl\">Half Year</div> {amt}</div></td>\n",
            "</tr>"
        ),
        y = year,
        n = num,
        name = name,
        addr = addr,
        amt = amount,
    )
}

fn page(marker: Option<(u32, u32)>, rows: &[String]) -> String {
    let mut html = String::from("<html><body><table>\n");
    if let Some((current, total)) = marker {
        html.push_str(&format!("<b>Page {current} of &nbsp; {total}</b>\n"));
    }
    for r in rows {
        html.push_str(r);
        html.push('\n');
    }
    html.push_str("</table></body></html>");
    html
}

fn test_client() -> SearchClient {
    SearchClient::new(ClientConfig {
        artifact_dir: None,
        ..Default::default()
    })
    .expect("client")
}

fn name_query() -> SearchQuery {
    SearchQuery::Name {
        name: "DOE JOHN".to_string(),
    }
}

async fn drive(server: &MockServer, options: &SearchOptions) -> SearchOutcome {
    let client = test_client();
    let mut session = SessionState::initialize("127.0.0.1");
    let endpoint = format!("{}/SEARCH.html", server.uri());
    run_search(
        &client,
        &mut session,
        &name_query(),
        &CommonParams::default(),
        &endpoint,
        options,
    )
    .await
}

#[tokio::test]
async fn two_page_run_aggregates_in_page_major_order() {
    let server = MockServer::start().await;

    let page1 = page(
        Some((1, 2)),
        &[
            row("2024", "100", "AARON A", "1 A ST", "1.00"),
            row("2024", "101", "BAKER B", "2 B ST", "2.00"),
        ],
    );
    // Page 2 carries no further marker, like the real portal's last page.
    let page2 = page(None, &[row("2024", "102", "CARSON C", "3 C ST", "3.00")]);

    Mock::given(method("POST"))
        .and(path("/SEARCH.html"))
        .and(body_string_contains("SBYNAME"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/SEARCH.html"))
        .and(body_string_contains("TASK=NEXT"))
        .and(header_regex("cookie", "SPAGE=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page2))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = drive(&server, &SearchOptions::default()).await;

    let SearchOutcome::Found(results) = outcome else {
        panic!("expected records");
    };
    assert_eq!(results.headers.len(), 6);
    assert_eq!(results.data.len(), 3);
    assert_eq!(results.pagination.current_page, 2);
    assert_eq!(results.pagination.total_pages, Some(2));

    // Page-major, then document order.
    let names: Vec<&str> = results
        .data
        .iter()
        .map(|r| r.taxpayer_name.as_str())
        .collect();
    assert_eq!(names, ["AARON A", "BAKER B", "CARSON C"]);
    assert_eq!(results.data[0].page, 1);
    assert_eq!(results.data[2].page, 2);
    assert_eq!(results.data[2].as_row()[5], "Page 2");
}

#[tokio::test]
async fn empty_first_page_is_no_records_not_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(Some((1, 1)), &[])))
        .mount(&server)
        .await;

    let outcome = drive(&server, &SearchOptions::default()).await;
    assert!(matches!(outcome, SearchOutcome::NoRecords));
}

#[tokio::test]
async fn transport_failure_on_page_one_is_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = drive(&server, &SearchOptions::default()).await;
    assert!(matches!(outcome, SearchOutcome::Failed));
}

#[tokio::test]
async fn page_cap_stops_after_exactly_that_many_pages() {
    let server = MockServer::start().await;

    let filler = |n: u32| page(None, &[row("2024", &n.to_string(), "X Y", "Z", "1.00")]);

    Mock::given(method("POST"))
        .and(body_string_contains("SBYNAME"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(page(
                Some((1, 5)),
                &[row("2024", "1", "X Y", "Z", "1.00")],
            )),
        )
        .expect(1)
        .mount(&server)
        .await;
    // The cap allows exactly one advance request.
    Mock::given(method("POST"))
        .and(body_string_contains("TASK=NEXT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(filler(2)))
        .expect(1)
        .mount(&server)
        .await;

    let options = SearchOptions {
        max_pages: Some(2),
        ..Default::default()
    };
    let outcome = drive(&server, &options).await;

    let SearchOutcome::Found(results) = outcome else {
        panic!("expected records");
    };
    assert_eq!(results.pagination.current_page, 2);
    assert_eq!(results.pagination.total_pages, Some(5));
    assert_eq!(results.data.len(), 2);
}

#[tokio::test]
async fn unknown_total_terminates_on_first_empty_page() {
    let server = MockServer::start().await;

    // No "Page X of Y" marker anywhere.
    Mock::given(method("POST"))
        .and(body_string_contains("SBYNAME"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page(None, &[row("2024", "1", "A A", "1 ST", "1.00")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("TASK=NEXT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page(None, &[row("2024", "2", "B B", "2 ST", "2.00")])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("TASK=NEXT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(None, &[])))
        .mount(&server)
        .await;

    // Cap is a safety net only; the empty page must end the loop first.
    let options = SearchOptions {
        max_pages: Some(10),
        ..Default::default()
    };
    let outcome = drive(&server, &options).await;

    let SearchOutcome::Found(results) = outcome else {
        panic!("expected records");
    };
    assert_eq!(results.data.len(), 2);
    assert_eq!(results.pagination.total_pages, None);
    assert_eq!(results.pagination.current_page, 3);
}

#[tokio::test]
async fn midloop_transport_failure_keeps_partial_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("SBYNAME"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(page(
                Some((1, 3)),
                &[
                    row("2024", "1", "A A", "1 ST", "1.00"),
                    row("2024", "2", "B B", "2 ST", "2.00"),
                ],
            )),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("TASK=NEXT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = drive(&server, &SearchOptions::default()).await;

    // Page 2 failed, but page 1's records survive and nothing panics.
    let SearchOutcome::Found(results) = outcome else {
        panic!("expected partial records");
    };
    assert_eq!(results.data.len(), 2);
    assert!(results.data.iter().all(|r| r.page == 1));
    assert_eq!(results.pagination.current_page, 2);
    assert_eq!(results.pagination.total_pages, Some(3));
}
