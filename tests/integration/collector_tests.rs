//! Fetch, tag and store against a mock server and an in-memory database

use baks::config::FetchConfig;
use baks::storage::{SqliteStorage, Storage, TagCount};
use baks::{AddOptions, AddSummary, BaksError, Collector};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, title: &str, description: &str) {
    let body = format!(
        r#"<html><head><title>{title}</title><meta name="description" content="{description}"></head></html>"#
    );
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn collector_with_rules(rules: &[(&str, &str)]) -> Collector {
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    for (suffix, tag) in rules {
        storage.add_tag_rule(suffix, tag).unwrap();
    }
    Collector::new(FetchConfig::default(), storage).unwrap()
}

#[tokio::test]
async fn test_add_fetches_tags_and_stores() {
    let server = MockServer::start().await;
    mount_page(&server, "/post", "Async traits", "Stabilised at last").await;

    let mut collector = collector_with_rules(&[("0.0.1", "loopback"), ("127.0.0.1", "local")]);
    let options = AddOptions {
        referrer: "newsletter".to_string(),
        ..AddOptions::default()
    };
    let url = format!("{}/post", server.uri());
    let stored = collector.add(&url, &options).await.unwrap();

    // the longer suffix is the more specific rule
    assert_eq!(stored.tag, "local");
    assert_eq!(stored.referrer, "newsletter");
    assert!(stored.added_at.is_some());

    let storage = collector.storage();
    let found = storage.search("stabilised").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].url, url);
    assert_eq!(storage.list_by_referrer("newsletter").unwrap().len(), 1);
}

#[tokio::test]
async fn test_explicit_tag_wins_over_rules() {
    let server = MockServer::start().await;
    mount_page(&server, "/post", "Tagged", "By hand").await;

    let mut collector = collector_with_rules(&[("127.0.0.1", "local")]);
    let options = AddOptions {
        tag: "reading".to_string(),
        ..AddOptions::default()
    };
    let stored = collector
        .add(&format!("{}/post", server.uri()), &options)
        .await
        .unwrap();
    assert_eq!(stored.tag, "reading");
}

#[tokio::test]
async fn test_duplicate_add_is_reported() {
    let server = MockServer::start().await;
    mount_page(&server, "/post", "Once", "Only once").await;

    let mut collector = collector_with_rules(&[]);
    let url = format!("{}/post", server.uri());
    collector.add(&url, &AddOptions::default()).await.unwrap();

    let err = collector
        .add(&url, &AddOptions::default())
        .await
        .unwrap_err();
    match err {
        BaksError::Storage(e) => assert!(e.is_duplicate()),
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(collector.storage().count_pages().unwrap(), 1);
    assert_eq!(collector.storage().search_count("once").unwrap(), 1);
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "First page", "alpha").await;
    mount_page(&server, "/c", "Third page", "gamma").await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut collector = collector_with_rules(&[]);
    let urls: Vec<String> = ["/a", "/b", "/c", "/a"]
        .iter()
        .map(|p| format!("{}{}", server.uri(), p))
        .collect();

    let summary = collector.add_all(&urls, &AddOptions::default()).await;
    assert_eq!(summary, AddSummary { added: 2, failed: 2 });

    let recent = collector.storage().recent(10).unwrap();
    let paths: Vec<&str> = recent
        .iter()
        .map(|p| p.url.rsplit('/').next().unwrap())
        .collect();
    assert_eq!(paths, vec!["c", "a"]);

    assert_eq!(
        collector.storage().tag_counts().unwrap(),
        vec![TagCount {
            tag: None,
            count: 2
        }]
    );
}
