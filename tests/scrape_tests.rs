//! Integration tests for the crawl pipeline
//!
//! These use wiremock to stand in for the judge site and exercise the full
//! login + listing + enrichment flow end-to-end.

use kattrack::config::{CacheConfig, Config, PacingConfig, SiteConfig, UserConfig};
use kattrack::notify::{log_notifier, Notifier};
use kattrack::scrape::Scraper;
use kattrack::session::SessionManager;
use kattrack::TrackerError;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MARKER: &str = r#"<a href="/logout">Log out</a>"#;

fn test_config(base_url: &str) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
        },
        user: UserConfig {
            username: "tester".to_string(),
            password: "hunter2".to_string(),
            full_name: "Test Person".to_string(),
        },
        pacing: PacingConfig {
            // Very short for testing
            listing_delay_ms: 5,
            enrich_delay_min_ms: 1,
            enrich_delay_max_ms: 3,
        },
        cache: CacheConfig {
            database_path: ":memory:".to_string(),
        },
    }
}

fn login_page() -> String {
    r#"<html><body><form><input type="hidden" name="csrf_token" value="tok123"></form></body></html>"#
        .to_string()
}

fn listing_html(rows: &[(&str, &str)], next: Option<&str>, logged_in: bool) -> String {
    let mut body = String::from("<html><body><table><tbody>");
    for (name, href) in rows {
        body.push_str(&format!(
            r#"<tr><td class="name_column"><a href="{}">{}</a></td></tr>"#,
            href, name
        ));
    }
    body.push_str("</tbody></table>");
    if let Some(href) = next {
        body.push_str(&format!(
            r##"<a id="problem_list_next" href="{}">Next</a>"##,
            href
        ));
    }
    if logged_in {
        body.push_str(MARKER);
    }
    body.push_str("</body></html>");
    body
}

fn toplist_html(rows: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(r#"<html><body><table class="toplist"><tbody>"#);
    for (rank, name, runtime) in rows {
        body.push_str(&format!(
            r#"<tr><td class="rank">{}</td><td class="name">{}</td><td class="runtime">{}</td></tr>"#,
            rank, name, runtime
        ));
    }
    body.push_str("</tbody></table>");
    body.push_str(MARKER);
    body.push_str("</body></html>");
    body
}

fn submissions_html(rows: &[(&str, &str)]) -> String {
    let mut body = String::from(r#"<html><body><table class="submissions"><tbody>"#);
    for (status, cpu) in rows {
        body.push_str(&format!(
            r#"<tr><td class="status">{}</td><td class="runtime">{}</td></tr>"#,
            status, cpu
        ));
    }
    body.push_str("</tbody></table>");
    body.push_str(MARKER);
    body.push_str("</body></html>");
    body
}

/// Mounts the login flow: GET serves the CSRF form, POST hands out a cookie
async fn mount_login(server: &MockServer, expected_posts: u64) {
    Mock::given(method("GET"))
        .and(path("/login/email"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_page()))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/email"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("set-cookie", "EduSiteCookie=cookie1; Path=/; HttpOnly"),
        )
        .expect(expected_posts)
        .mount(server)
        .await;
}

async fn scraper_for(server: &MockServer) -> Scraper {
    let config = test_config(&server.uri());
    let session = Arc::new(SessionManager::new(&config, log_notifier()).unwrap());
    Scraper::new(&config, session).unwrap()
}

#[tokio::test]
async fn test_full_crawl_fast_path_and_fallback() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    // Two listing pages; the second has no next control
    Mock::given(method("GET"))
        .and(path("/problems"))
        .and(query_param("show_solved", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha")],
            Some("/problems/solved/2"),
            true,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems/solved/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Beta", "/problems/beta")],
            None,
            true,
        )))
        .mount(&server)
        .await;

    // Alpha: the user is on the leaderboard, no submissions fetch may happen
    Mock::given(method("GET"))
        .and(path("/problems/alpha/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(toplist_html(&[
            ("1", "Speedy Gonzales", "0.01s"),
            ("4", "Test Person", "0.33s"),
        ])))
        .mount(&server)
        .await;

    // Beta: not on the leaderboard, exactly one submissions fetch
    Mock::given(method("GET"))
        .and(path("/problems/beta/statistics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(toplist_html(&[("1", "Speedy Gonzales", "0.02s")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems/beta"))
        .and(query_param("tab", "submissions"))
        .and(query_param("user", "tester"))
        .respond_with(ResponseTemplate::new(200).set_body_string(submissions_html(&[
            ("Accepted", "1.23s"),
            ("Accepted", "0.87s"),
            ("Wrong Answer", "0.01s"),
            ("Accepted", "2.00s"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = scraper_for(&server).await;
    let records = scraper.run().await.unwrap();

    // Sorted by name
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Alpha");
    assert_eq!(records[1].name, "Beta");

    // Fast path: rank and own time from the leaderboard, one request total
    let alpha = &records[0];
    assert_eq!(alpha.fastest_global, "0.01s");
    assert_eq!(alpha.mine, "0.33s");
    let top = alpha.top.as_ref().unwrap();
    assert_eq!(top.rank, "4");
    assert!(top.href.ends_with("/problems/alpha/statistics"));

    // Fallback: minimum accepted CPU time, no top placement
    let beta = &records[1];
    assert_eq!(beta.fastest_global, "0.02s");
    assert_eq!(beta.mine, "0.87s");
    assert!(beta.top.is_none());
}

#[tokio::test]
async fn test_enrichment_is_idempotent() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha")],
            None,
            true,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems/alpha/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(toplist_html(&[(
            "2",
            "Test Person",
            "0.50s",
        )])))
        .mount(&server)
        .await;

    let scraper = scraper_for(&server).await;
    let first = scraper.run().await.unwrap();
    let second = scraper.run().await.unwrap();

    // Unchanged pages yield identical records
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_logged_out_page_triggers_one_renewal() {
    let server = MockServer::start().await;
    // Initial login plus exactly one renewal
    mount_login(&server, 2).await;

    // First listing response is missing the logged-in marker
    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha")],
            None,
            false,
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha")],
            None,
            true,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems/alpha/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(toplist_html(&[(
            "1",
            "Test Person",
            "0.10s",
        )])))
        .mount(&server)
        .await;

    let scraper = scraper_for(&server).await;
    let records = scraper.run().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_persistently_logged_out_is_fatal() {
    let server = MockServer::start().await;
    // One initial login, one renewal; a third attempt must not happen
    mount_login(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha")],
            None,
            false,
        )))
        .mount(&server)
        .await;

    let scraper = scraper_for(&server).await;
    let result = scraper.run().await;
    assert!(matches!(result, Err(TrackerError::Auth(_))));
}

#[tokio::test]
async fn test_fetch_error_aborts_crawl() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Alpha", "/problems/alpha"), ("Beta", "/problems/beta")],
            None,
            true,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/problems/alpha/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(toplist_html(&[(
            "1",
            "Test Person",
            "0.10s",
        )])))
        .mount(&server)
        .await;

    // Beta's statistics page is broken; the whole attempt must fail
    Mock::given(method("GET"))
        .and(path("/problems/beta/statistics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = scraper_for(&server).await;
    let result = scraper.run().await;
    assert!(matches!(
        result,
        Err(TrackerError::Fetch { status: 500, .. })
    ));
}

/// Notifier that records messages for assertions
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, body: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("{}: {}", subject, body));
    }
}

#[tokio::test]
async fn test_cookie_rotation_notifies_operator() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    // The listing response silently rotates the session cookie
    Mock::given(method("GET"))
        .and(path("/problems"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&[], None, true))
                .insert_header("set-cookie", "EduSiteCookie=rotated99; Path=/"),
        )
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier {
        messages: Mutex::new(Vec::new()),
    });
    let config = test_config(&server.uri());
    let session = Arc::new(SessionManager::new(&config, notifier.clone()).unwrap());
    let scraper = Scraper::new(&config, session).unwrap();

    let records = scraper.run().await.unwrap();
    assert!(records.is_empty());

    let messages = notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("EduSiteCookie=rotated99"));
}
