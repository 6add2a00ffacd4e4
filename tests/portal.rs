//! Integration tests running complete scrapes against a mocked portal.

use chrono::NaiveDate;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pa_docket_scraper::config::{ScrapePlan, ScraperConfig};
use pa_docket_scraper::session::SessionBootstrapper;
use pa_docket_scraper::transport::RetryingTransport;
use pa_docket_scraper::{DocketScraper, ScrapeError};

const TOKEN: &str = "tok-abc";

fn test_config(server: &MockServer) -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.portal.base_url = server.uri();
    config.retry.max_attempts = 3;
    config.retry.initial_backoff_ms = 1;
    config.retry.max_backoff_ms = 5;
    config
}

fn plan(counties: &[&str]) -> ScrapePlan {
    ScrapePlan {
        counties: counties.iter().map(|c| c.to_string()).collect(),
        filed_start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        filed_end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        concurrency: 2,
    }
}

fn landing_page() -> String {
    format!(
        "<html><body><form><input name=\"__RequestVerificationToken\" type=\"hidden\" value=\"{}\" /></form></body></html>",
        TOKEN
    )
}

fn landing_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("set-cookie", "ASP.NET_SessionId=abc; path=/; HttpOnly")
        .append_header("set-cookie", "portal-affinity=xyz; path=/")
        .set_body_string(landing_page())
}

/// One results row in the portal's 20-cell layout.
fn results_row(docket_id: &str, court: &str, participants: &str) -> String {
    let mut cells = vec![String::new(); 20];
    cells[2] = docket_id.to_string();
    cells[3] = court.to_string();
    cells[4] = format!("Comm. v. {}", participants);
    cells[5] = "Active".to_string();
    cells[6] = "03/01/2024".to_string();
    cells[7] = participants.to_string();
    cells[8] = "01/15/1990".to_string();
    cells[9] = "Erie".to_string();
    cells[10] = "MDJ-06-1-01".to_string();
    cells[13] = "2024-0001".to_string();

    let mut html = String::from("<tr>");
    for (index, content) in cells.iter().enumerate() {
        if index == 18 {
            html.push_str(&format!(
                "<td><div><a href=\"/Report/{}\">Sheet</a></div></td>",
                docket_id
            ));
        } else {
            html.push_str(&format!("<td>{}</td>", content));
        }
    }
    html.push_str("</tr>");
    html
}

fn results_page(rows: &[String]) -> String {
    format!(
        "<html><body><div class=\"table-wrapper\"><table><tbody>{}</tbody></table></div></body></html>",
        rows.concat()
    )
}

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/CaseSearch"))
        .respond_with(landing_response())
        .mount(server)
        .await;
}

#[tokio::test]
async fn bootstrap_collects_cookies_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/CaseSearch"))
        .respond_with(landing_response())
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let bootstrapper = SessionBootstrapper::new(
        reqwest::Client::new(),
        RetryingTransport::new(config.retry.clone()),
        config.search_url(),
    );
    let session = bootstrapper.bootstrap().await.unwrap();
    assert_eq!(
        session.cookie_header,
        "ASP.NET_SessionId=abc; portal-affinity=xyz"
    );
    assert_eq!(session.verification_token, TOKEN);
}

#[tokio::test]
async fn bootstrap_fails_when_token_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/CaseSearch"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "ASP.NET_SessionId=abc; path=/")
                .set_body_string("<html><body><p>maintenance window</p></body></html>"),
        )
        .mount(&server)
        .await;

    let config = test_config(&server);
    let bootstrapper = SessionBootstrapper::new(
        reqwest::Client::new(),
        RetryingTransport::new(config.retry.clone()),
        config.search_url(),
    );
    let err = bootstrapper.bootstrap().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Session { .. }));
}

#[tokio::test]
async fn full_run_filters_sorts_and_posts_session_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/CaseSearch"))
        .respond_with(landing_response())
        .expect(1) // bootstrap runs exactly once regardless of county count
        .mount(&server)
        .await;

    let rows = vec![
        results_row("MJ-51301-CR-0000201-2024", "Magisterial District", "Young, Zoe"),
        results_row("CP-51-CR-0000202-2024", "Common Pleas", "Nolan, Ned"),
        results_row("MJ-51301-CR-0000203-2024", "Magisterial District", "Abbot, Amy"),
    ];
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .and(header("cookie", "ASP.NET_SessionId=abc; portal-affinity=xyz"))
        .and(body_string_contains(TOKEN))
        .and(body_string_contains("DateFiled"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&rows)))
        .expect(3)
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let dockets = scraper
        .scrape(&plan(&["Erie", "Adams", "York"]))
        .await
        .unwrap();

    // Same page served for every county: cross-county dedup leaves two
    // records, ordered by participants.
    assert_eq!(dockets.len(), 2);
    assert_eq!(dockets[0].primary_participants, "Abbot, Amy");
    assert_eq!(dockets[1].primary_participants, "Young, Zoe");
    assert!(dockets.iter().all(|d| d.court == "Magisterial District"));
    assert!(dockets[0].docket_url.starts_with(&server.uri()));
}

#[tokio::test]
async fn transient_failure_recovers_within_retry_budget() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let rows = vec![results_row(
        "MJ-51301-CR-0000301-2024",
        "Magisterial District",
        "Baker, Bob",
    )];
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&rows)))
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let dockets = scraper.scrape(&plan(&["Erie"])).await.unwrap();
    assert_eq!(dockets.len(), 1);
    assert_eq!(dockets[0].docket_id, "MJ-51301-CR-0000301-2024");
}

#[tokio::test]
async fn persistent_error_status_surfaces_after_configured_attempts() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // the full retry budget, then the job fails
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let err = scraper.scrape(&plan(&["Erie"])).await.unwrap_err();
    let ScrapeError::Job { county, source } = err else {
        panic!("expected job error, got {err:?}");
    };
    assert_eq!(county, "Erie");
    assert!(matches!(*source, ScrapeError::Http { status_code: 503, .. }));
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let err = scraper.scrape(&plan(&["Erie"])).await.unwrap_err();
    let ScrapeError::Job { source, .. } = err else {
        panic!("expected job error, got {err:?}");
    };
    assert!(matches!(*source, ScrapeError::Http { status_code: 404, .. }));
}

#[tokio::test]
async fn fail_fast_aborts_the_run_on_one_bad_county() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let rows = vec![results_row(
        "MJ-51301-CR-0000401-2024",
        "Magisterial District",
        "Clark, Carol",
    )];
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .and(body_string_contains("Greene"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&rows)))
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let err = scraper
        .scrape(&plan(&["Erie", "Greene", "York"]))
        .await
        .unwrap_err();
    let ScrapeError::Job { county, source } = err else {
        panic!("expected job error, got {err:?}");
    };
    assert_eq!(county, "Greene");
    assert!(matches!(*source, ScrapeError::Http { status_code: 400, .. }));
}

#[tokio::test]
async fn missing_results_table_fails_the_job() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>unexpected layout</p></body></html>"),
        )
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let err = scraper.scrape(&plan(&["Erie"])).await.unwrap_err();
    let ScrapeError::Job { source, .. } = err else {
        panic!("expected job error, got {err:?}");
    };
    assert!(matches!(*source, ScrapeError::Extraction { .. }));
}

#[tokio::test]
async fn run_with_no_qualifying_rows_succeeds_empty() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let rows = vec![
        results_row("CP-51-CR-0000501-2024", "Common Pleas", "Davis, Dan"),
        "<tr><td colspan=\"20\">No Results Found</td></tr>".to_string(),
    ];
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&rows)))
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let dockets = scraper.scrape(&plan(&["Erie", "Adams"])).await.unwrap();
    assert!(dockets.is_empty());
}

#[tokio::test]
async fn unreachable_landing_page_aborts_before_county_work() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/CaseSearch"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0) // no county fetch may happen without a session
        .mount(&server)
        .await;

    let scraper = DocketScraper::new(test_config(&server)).unwrap();
    let err = scraper.scrape(&plan(&["Erie"])).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Http { status_code: 503, .. }));
}
