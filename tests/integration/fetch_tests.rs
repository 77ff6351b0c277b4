//! Fetch pipeline against a mock server

use baks::config::FetchConfig;
use baks::{FetchError, Fetcher};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Ownership in Rust  </title>
  <meta property="og:description" content="From Open Graph">
  <meta name="description" content="How the borrow checker works">
</head>
<body><p>Body text</p></body>
</html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html")
        .set_body_string(body)
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn fetcher() -> Fetcher {
    Fetcher::new(FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_html_page() {
    let server = MockServer::start().await;
    mount(&server, "/article", html(ARTICLE)).await;

    let url = format!("{}/article", server.uri());
    let outcome = fetcher().fetch(&url, false, false).await.unwrap();
    assert_eq!(outcome.bytes_read, ARTICLE.len());
    assert!(!outcome.is_partial());
    let page = outcome.page;

    assert_eq!(page.url, url);
    assert_eq!(page.url_original, url);
    assert_eq!(page.host, "127.0.0.1");
    assert!(!page.is_root_page);
    assert!(page.is_html());
    assert_eq!(page.title, "Ownership in Rust");
    assert_eq!(page.description, "How the borrow checker works");
    assert!(page.added_at.is_none());
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/missing",
        ResponseTemplate::new(404).set_body_string("<html><title>Not here</title></html>"),
    )
    .await;

    let url = format!("{}/missing", server.uri());
    let err = fetcher().fetch(&url, false, false).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    assert_eq!(err.to_string(), format!("visit: {}: HTTP status 404", url));

    let outcome = fetcher().fetch(&url, true, false).await.unwrap();
    assert_eq!(outcome.page.title, "Not here");
}

#[tokio::test]
async fn test_redirect_to_host_root_is_rejected() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/members/only",
        ResponseTemplate::new(302).insert_header("Location", format!("{}/", server.uri()).as_str()),
    )
    .await;
    mount(&server, "/", html(ARTICLE)).await;

    let url = format!("{}/members/only", server.uri());
    let err = fetcher().fetch(&url, false, false).await.unwrap_err();
    match err {
        FetchError::RedirectToRoot {
            url: asked,
            location,
        } => {
            assert_eq!(asked, url);
            assert_eq!(location, format!("{}/", server.uri()));
        }
        other => panic!("expected redirect to root, got {other:?}"),
    }

    // the root itself is fine
    let root = fetcher()
        .fetch(&format!("{}/", server.uri()), false, false)
        .await
        .unwrap();
    assert!(root.page.is_root_page);
}

#[tokio::test]
async fn test_redirect_records_final_url() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("Location", "/new"),
    )
    .await;
    mount(&server, "/new", html(ARTICLE)).await;

    let requested = format!("{}/old", server.uri());
    let page = fetcher().fetch(&requested, false, false).await.unwrap().page;
    assert_eq!(page.url, format!("{}/new", server.uri()));
    assert_eq!(page.url_original, requested);
    assert_eq!(page.title, "Ownership in Rust");
}

#[tokio::test]
async fn test_skip_content() {
    let server = MockServer::start().await;
    mount(&server, "/article", html(ARTICLE)).await;

    let url = format!("{}/article", server.uri());
    let outcome = fetcher().fetch(&url, false, true).await.unwrap();
    assert_eq!(outcome.bytes_read, 0);
    assert_eq!(outcome.page.url, url);
    assert_eq!(outcome.page.mime_type, "");
    assert_eq!(outcome.page.title, "");
    assert_eq!(outcome.page.description, "");
}

#[tokio::test]
async fn test_body_over_cap_is_truncated() {
    let server = MockServer::start().await;
    let body = format!(
        "<!DOCTYPE html><html><head>{}<title>Past the cap</title></head></html>",
        " ".repeat(4096)
    );
    mount(&server, "/big", html(&body)).await;

    let config = FetchConfig {
        max_body_bytes: 1024,
        ..FetchConfig::default()
    };
    let url = format!("{}/big", server.uri());
    let outcome = Fetcher::new(config)
        .unwrap()
        .fetch(&url, false, false)
        .await
        .unwrap();

    assert_eq!(outcome.bytes_read, 1024);
    assert!(outcome.page.is_html());
    assert_eq!(outcome.page.title, "");
}

#[tokio::test]
async fn test_content_type_is_sniffed_not_trusted() {
    let server = MockServer::start().await;
    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec();
    mount(
        &server,
        "/logo",
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "text/html")
            .set_body_bytes(png),
    )
    .await;

    let url = format!("{}/logo", server.uri());
    let page = fetcher().fetch(&url, false, false).await.unwrap().page;
    assert_eq!(page.mime_type, "image/png");
    assert!(!page.is_html());
    assert_eq!(page.title, "");
}

#[tokio::test]
async fn test_deadline_is_a_timeout_not_a_network_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        html(ARTICLE).set_delay(Duration::from_secs(5)),
    )
    .await;

    let config = FetchConfig {
        timeout_ms: 300,
        connect_timeout_ms: 300,
        ..FetchConfig::default()
    };
    let url = format!("{}/slow", server.uri());
    let started = Instant::now();
    let err = Fetcher::new(config)
        .unwrap()
        .fetch(&url, false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_anchors_from_url() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/links",
        html(r#"<html><body><a href="/one">One</a> <a href="https://other.example/two">Two</a></body></html>"#),
    )
    .await;

    let url = format!("{}/links", server.uri());
    let anchors = fetcher().anchors_from_url(&url, true).await.unwrap();
    let urls: Vec<&str> = anchors.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/one", server.uri()).as_str(),
            "https://other.example/two"
        ]
    );

    let raw = fetcher().anchors_from_url(&url, false).await.unwrap();
    assert_eq!(raw[0].url, "/one");
    assert_eq!(raw[0].text, "One");
}
