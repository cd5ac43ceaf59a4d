//! Integration tests for navigation and classification
//!
//! These tests use wiremock to create mock HTTP servers and drive a real
//! reqwest-backed session end-to-end.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use std::sync::Arc;
use sumi_navigator::config::{parse_config, Config};
use sumi_navigator::{
    HttpTransport, NavigationSession, NavigatorError, Transport, Verdict,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given redirect limit
fn create_test_config(max_redirects: usize, click_refreshes_metadata: bool) -> Config {
    parse_config(&format!(
        r#"
[navigator]
request-timeout = 5
connect-timeout = 2
max-redirects = {}
click-refreshes-metadata = {}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"
"#,
        max_redirects, click_refreshes_metadata
    ))
    .expect("Failed to parse test config")
}

fn create_session() -> NavigationSession {
    NavigationSession::from_config(&create_test_config(5, false)).expect("Failed to build session")
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap()
}

/// Session whose clock is pinned to [`fixed_now`]
fn create_clocked_session() -> NavigationSession {
    create_session().with_clock(Arc::new(fixed_now))
}

/// Builds a raw HTTP/1.1 response; header values are written byte for byte
fn raw_response(status_line: &str, headers: &[(&str, &[u8])], body: &str) -> Vec<u8> {
    let mut response = format!("HTTP/1.1 {}\r\n", status_line).into_bytes();
    for (name, value) in headers {
        response.extend_from_slice(name.as_bytes());
        response.extend_from_slice(b": ");
        response.extend_from_slice(value);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(
        format!(
            "content-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .as_bytes(),
    );
    response
}

/// Serves canned responses keyed by request target, for statuses and header
/// bytes that wiremock cannot produce. Unknown targets get a 404.
async fn spawn_raw_server(routes: Vec<(&'static str, Vec<u8>)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = routes
                    .iter()
                    .find(|(route, _)| *route == target)
                    .map(|(_, response)| response.clone())
                    .unwrap_or_else(|| raw_response("404 Not Found", &[], ""));

                let _ = stream.write_all(&response).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, route: &str, status: u16, location: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).insert_header("location", location))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_navigate_success_page() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        200,
        r#"<html><head><title>Home</title></head><body><a href="/next">Next</a></body></html>"#,
    )
    .await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/", mock_server.uri()))
        .await
        .expect("Navigation failed");

    assert_eq!(session.status_code().unwrap(), 200);
    assert!(session.is_success().unwrap());
    assert_eq!(session.verdict().unwrap(), Verdict::Success);
    assert!(!session.uses_temporary_redirect());
    assert_eq!(session.permanent_redirect_url(), None);
    assert_eq!(session.retry_at_timestamp(), 0);

    let document = session.document().unwrap();
    assert_eq!(document.title(), Some("Home".to_string()));
    assert_eq!(document.links().len(), 1);
    assert_eq!(session.transport().last_status_code(), Some(200));
}

#[tokio::test]
async fn test_permanent_redirect_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_redirect(&mock_server, "/a", 301, "/b").await;
    mount_page(&mock_server, "/b", 200, "<html><body>moved</body></html>").await;

    let mut session = create_session();
    session.navigate(&format!("{}/a", base_url)).await.unwrap();

    assert_eq!(session.status_code().unwrap(), 200);
    assert!(!session.is_permanent_error().unwrap());
    assert!(!session.uses_temporary_redirect());
    assert_eq!(
        session.permanent_redirect_url().map(Url::as_str),
        Some(format!("{}/b", base_url).as_str())
    );
    assert_eq!(session.verdict().unwrap(), Verdict::Redirect);
    assert_eq!(
        session.document().unwrap().url().as_str(),
        format!("{}/b", base_url)
    );
    assert_eq!(session.transport().redirect_chain().len(), 1);
}

#[tokio::test]
async fn test_temporary_redirect_makes_result_temporary() {
    let mock_server = MockServer::start().await;
    mount_redirect(&mock_server, "/a", 302, "/maintenance").await;
    mount_page(&mock_server, "/maintenance", 200, "<p>back soon</p>").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/a", mock_server.uri()))
        .await
        .unwrap();

    assert!(session.uses_temporary_redirect());
    assert!(session.is_temporary_result().unwrap());
    assert!(session.is_success().unwrap());
    assert_eq!(session.verdict().unwrap(), Verdict::TemporaryResult);
}

#[tokio::test]
async fn test_redirect_chain_resets_between_navigations() {
    let mock_server = MockServer::start().await;
    mount_redirect(&mock_server, "/a", 307, "/b").await;
    mount_page(&mock_server, "/b", 200, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/a", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(session.transport().redirect_chain().len(), 1);

    session
        .navigate(&format!("{}/b", mock_server.uri()))
        .await
        .unwrap();
    assert!(session.transport().redirect_chain().is_empty());
    assert!(!session.uses_temporary_redirect());
}

#[tokio::test]
async fn test_redirect_without_location_stops() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&mock_server)
        .await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/odd", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(session.status_code().unwrap(), 302);
    assert!(!session.uses_temporary_redirect());
    assert_eq!(session.verdict().unwrap(), Verdict::Redirect);
}

#[tokio::test]
async fn test_rate_limit_with_retry_after_seconds() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "120"))
        .mount(&mock_server)
        .await;

    let mut session = create_clocked_session();
    session
        .navigate(&format!("{}/limited", mock_server.uri()))
        .await
        .unwrap();

    assert!(session.is_temporary_result().unwrap());
    assert!(session.is_client_error().unwrap());
    assert!(!session.is_permanent_error().unwrap());
    assert_eq!(session.retry_at_timestamp(), fixed_now().timestamp() + 120);
}

#[tokio::test]
async fn test_rate_limit_without_retry_after_leaves_retry_unset() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/limited", 429, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/limited", mock_server.uri()))
        .await
        .unwrap();

    assert!(session.is_temporary_result().unwrap());
    assert_eq!(session.retry_at_timestamp(), 0);
}

#[tokio::test]
async fn test_bandwidth_limit_retries_next_month() {
    let base = spawn_raw_server(vec![(
        "/quota",
        raw_response("509 Bandwidth Limit Exceeded", &[], ""),
    )])
    .await;

    let mut session = create_clocked_session();
    session.navigate(&format!("{}/quota", base)).await.unwrap();

    assert_eq!(session.status_code().unwrap(), 509);
    assert_eq!(
        session.retry_at(),
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    );
    assert!(session.is_permanent_error().unwrap());
    assert!(!session.is_temporary_result().unwrap());
    assert!(session.is_server_error().unwrap());
}

#[tokio::test]
async fn test_bandwidth_limit_keeps_server_retry_after() {
    let base = spawn_raw_server(vec![(
        "/quota",
        raw_response("509 Bandwidth Limit Exceeded", &[("retry-after", &b"3600"[..])], ""),
    )])
    .await;

    let mut session = create_clocked_session();
    session.navigate(&format!("{}/quota", base)).await.unwrap();

    assert_eq!(session.retry_at_timestamp(), fixed_now().timestamp() + 3600);
}

#[tokio::test]
async fn test_nonstandard_transient_status_is_temporary() {
    let base = spawn_raw_server(vec![(
        "/origin",
        raw_response("520 Unknown Error", &[], "<p>origin error</p>"),
    )])
    .await;

    let mut session = create_session();
    session.navigate(&format!("{}/origin", base)).await.unwrap();

    assert_eq!(session.status_code().unwrap(), 520);
    assert!(session.is_temporary_result().unwrap());
    assert!(session.is_server_error().unwrap());
    assert!(!session.is_permanent_error().unwrap());
    assert_eq!(session.verdict().unwrap(), Verdict::TemporaryResult);
    assert_eq!(session.retry_at(), None);
}

#[tokio::test]
async fn test_redirect_to_utf8_location_is_followed() {
    let base = spawn_raw_server(vec![
        (
            "/old",
            raw_response("301 Moved Permanently", &[("location", "/café".as_bytes())], ""),
        ),
        ("/caf%C3%A9", raw_response("200 OK", &[], "<title>Café</title>")),
    ])
    .await;

    let mut session = create_session();
    session.navigate(&format!("{}/old", base)).await.unwrap();

    let expected = format!("{}/caf%C3%A9", base);
    assert_eq!(session.status_code().unwrap(), 200);
    assert_eq!(
        session.permanent_redirect_url().map(Url::as_str),
        Some(expected.as_str())
    );
    assert_eq!(session.verdict().unwrap(), Verdict::Redirect);
    assert_eq!(session.document().unwrap().title(), Some("Café".to_string()));
}

#[tokio::test]
async fn test_gone_is_permanent() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/old", 410, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();

    assert!(session.is_gone().unwrap());
    assert!(session.is_permanent_error().unwrap());
    assert_eq!(session.verdict().unwrap(), Verdict::Gone);
}

#[tokio::test]
async fn test_service_unavailable_is_temporary() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/busy", 503, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/busy", mock_server.uri()))
        .await
        .unwrap();

    assert!(session.is_temporary_result().unwrap());
    assert!(session.is_server_error().unwrap());
    assert!(!session.is_permanent_error().unwrap());
}

#[tokio::test]
async fn test_redirect_loop_is_transport_failure() {
    let mock_server = MockServer::start().await;
    mount_redirect(&mock_server, "/x", 302, "/y").await;
    mount_redirect(&mock_server, "/y", 302, "/x").await;

    let mut session = create_session();
    let err = session
        .navigate(&format!("{}/x", mock_server.uri()))
        .await
        .err()
        .expect("Loop should fail");

    assert!(matches!(err, NavigatorError::RedirectLoop { .. }));
    assert!(err.is_transport_failure());
    assert!(matches!(session.status_code(), Err(NavigatorError::PrematureAccess)));
}

#[tokio::test]
async fn test_redirect_limit() {
    let mock_server = MockServer::start().await;
    mount_redirect(&mock_server, "/r1", 301, "/r2").await;
    mount_redirect(&mock_server, "/r2", 301, "/r3").await;
    mount_redirect(&mock_server, "/r3", 301, "/r4").await;
    mount_page(&mock_server, "/r4", 200, "").await;

    let mut session =
        NavigationSession::from_config(&create_test_config(2, false)).unwrap();
    let err = session
        .navigate(&format!("{}/r1", mock_server.uri()))
        .await
        .err()
        .expect("Chain should exceed the limit");

    assert!(matches!(err, NavigatorError::RedirectLimit { .. }));
}

#[tokio::test]
async fn test_connection_failure_is_not_a_status() {
    // Bind and drop a listener to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut session = create_session();
    let err = session
        .navigate(&format!("http://127.0.0.1:{}/", port))
        .await
        .err()
        .expect("Connection should fail");

    assert!(err.is_transport_failure());
    assert!(matches!(session.is_server_error(), Err(NavigatorError::PrematureAccess)));
    assert!(session.document().is_none());
}

#[tokio::test]
async fn test_click_link_through_document() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        200,
        r#"<html><body><a href="/archive" title="Archive">Older posts</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/archive", 404, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/", mock_server.uri()))
        .await
        .unwrap()
        .click_link("Older posts")
        .await
        .unwrap();

    assert!(session.is_not_found().unwrap());
    assert!(session.is_client_error().unwrap());
    assert_eq!(session.document().unwrap().url().path(), "/archive");

    let err = session.click_link("Archive").await.err().unwrap();
    assert!(matches!(err, NavigatorError::LinkNotFound { .. }));
}

#[tokio::test]
async fn test_click_keeps_or_refreshes_metadata() {
    let mock_server = MockServer::start().await;
    mount_redirect(&mock_server, "/start", 307, "/index").await;
    mount_page(
        &mock_server,
        "/index",
        200,
        r#"<a href="/plain">Plain</a>"#,
    )
    .await;
    mount_page(&mock_server, "/plain", 200, "").await;

    let start = format!("{}/start", mock_server.uri());

    let mut keeping = create_session();
    keeping.navigate(&start).await.unwrap();
    keeping.click_link("Plain").await.unwrap();
    assert!(keeping.uses_temporary_redirect());

    let mut refreshing = NavigationSession::from_config(&create_test_config(5, true)).unwrap();
    refreshing.navigate(&start).await.unwrap();
    refreshing.click_link("Plain").await.unwrap();
    assert!(!refreshing.uses_temporary_redirect());
    assert_eq!(refreshing.verdict().unwrap(), Verdict::Success);
}

#[tokio::test]
async fn test_fetch_asset_leaves_document_alone() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/page/", 200, "<title>Page</title>").await;
    Mock::given(method("GET"))
        .and(path("/page/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/missing.png", 404, "").await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/page/", mock_server.uri()))
        .await
        .unwrap();

    let bytes = session.fetch_asset("logo.png").await.unwrap();
    assert_eq!(&bytes[..], &[0x89u8, 0x50, 0x4e, 0x47]);

    let err = session.fetch_asset("/missing.png").await.err().unwrap();
    assert!(matches!(err, NavigatorError::AssetStatus { status: 404, .. }));

    assert_eq!(session.status_code().unwrap(), 200);
    assert_eq!(session.document().unwrap().title(), Some("Page".to_string()));
}

#[tokio::test]
async fn test_set_content_preserves_navigation_metadata() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "60"))
        .mount(&mock_server)
        .await;

    let mut session = create_session();
    session
        .navigate(&format!("{}/limited", mock_server.uri()))
        .await
        .unwrap();
    let retry_at = session.retry_at_timestamp();
    assert!(retry_at > 0);

    session
        .set_content("https://x/", "<html><title>Cached</title></html>")
        .unwrap();

    assert_eq!(session.retry_at_timestamp(), retry_at);
    assert_eq!(session.status_code().unwrap(), 503);
    assert_eq!(session.document().unwrap().title(), Some("Cached".to_string()));
}

#[tokio::test]
async fn test_see_other_switches_to_get() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .respond_with(ResponseTemplate::new(303).insert_header("location", "/done"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/done", 200, "done").await;

    let config = create_test_config(5, false);
    let mut transport = HttpTransport::from_config(&config).unwrap();
    transport.start_exchange();
    let exchange = transport
        .request(
            Method::POST,
            &Url::parse(&format!("{}/form", mock_server.uri())).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(exchange.status, 200);
    assert_eq!(exchange.body, "done");
    assert!(exchange.uses_temporary_redirect());
    assert_eq!(transport.last_status_code(), Some(200));
}
