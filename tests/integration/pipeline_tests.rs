use crate::common::{fast_config, product_page, search_page, MockRenderer};
use listing_harvester::crawler::{
    enrich, search_pages, DetailSettings, Fetcher, Harvest, HarvestRequest,
};
use listing_harvester::delay::DelayRange;
use listing_harvester::output::RunStatus;
use listing_harvester::{FailureReason, SearchResultItem};
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|n| format!("A{}", n)).collect()
}

/// Page 1 serves twenty cards, page 2 always fails
async fn mount_two_page_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "wireless mouse"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(&ids(1..=20))))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "wireless mouse"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_failed_second_page_keeps_first_page_items() {
    let server = MockServer::start().await;
    mount_two_page_search(&server).await;

    let config = fast_config(&server.uri());
    let fetcher = Fetcher::new(
        config.identity_pool(),
        config.search.retry_policy(),
        config.search.request_timeout(),
    )
    .unwrap();

    let mut items = Vec::new();
    let report = search_pages(
        &fetcher,
        &config.search.settings(&server.uri()),
        "wireless mouse",
        2,
        &mut items,
    )
    .await;

    assert_eq!(items.len(), 20);
    assert_eq!(report.pages_fetched, vec![1]);
    assert_eq!(report.pages_skipped, vec![2]);
    assert_eq!(items[0].id, "A1");
    assert_eq!(items[19].id, "A20");
    assert_eq!(items[4].title.as_deref(), Some("Wireless Mouse A5"));
    assert_eq!(items[4].price.as_deref(), Some("$19.99"));
    assert_eq!(items[4].url, format!("{}/dp/A5", server.uri()));
}

#[tokio::test]
async fn test_full_run_with_failed_page_saves_enriched_records() {
    let server = MockServer::start().await;
    mount_two_page_search(&server).await;
    let base = server.uri();

    let pages = ids(1..=20)
        .into_iter()
        .map(|id| {
            let html = product_page(&format!("Ergonomic Mouse {}", id));
            (format!("{}/dp/{}", base, id), html)
        })
        .collect();
    let renderer = MockRenderer::new(pages);
    let shut_down = renderer.shutdown_flag();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("mice.json");
    let harvest = Harvest::new(&fast_config(&base), renderer).unwrap();
    let summary = harvest
        .run(
            HarvestRequest {
                query: "wireless mouse".to_string(),
                pages: 2,
                out: out.clone(),
            },
            std::future::pending(),
        )
        .await;

    assert_eq!(summary.status, RunStatus::Partial);
    assert_eq!(summary.summaries, 20);
    assert_eq!(summary.enriched, 20);
    assert_eq!(summary.pages_skipped, vec![2]);
    assert_eq!(summary.saved_path, Some(out.clone()));
    assert!(shut_down.load(Ordering::SeqCst));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let records = saved.as_array().unwrap();
    assert_eq!(records.len(), 20);

    let first = records.iter().find(|r| r["asin"] == "A1").unwrap();
    assert_eq!(first["title"], "Ergonomic Mouse A1");
    assert_eq!(first["price"], "$24.99");
    assert_eq!(first["rating"], "4.5 out of 5 stars");
    assert_eq!(first["review_count"], "1,234 ratings");
    assert_eq!(first["availability"], "In Stock");
    assert_eq!(
        first["images"],
        serde_json::json!([
            "https://m.media-amazon.com/images/I/71a.jpg",
            "https://m.media-amazon.com/images/I/71b.jpg"
        ])
    );
    assert_eq!(first["error"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_five_items_one_without_url() {
    let renderer = MockRenderer::new(vec![
        ("https://shop.test/dp/B1".to_string(), product_page("One")),
        ("https://shop.test/dp/B3".to_string(), product_page("Three")),
    ]);
    let items: Vec<SearchResultItem> = ["B1", "B2", "B3", "B4", "B5"]
        .iter()
        .map(|id| SearchResultItem {
            id: id.to_string(),
            title: None,
            url: if *id == "B4" {
                String::new()
            } else {
                format!("https://shop.test/dp/{}", id)
            },
            price: None,
        })
        .collect();
    let settings = DetailSettings {
        concurrency: 3,
        dwell: DelayRange::none(),
        render_timeout: None,
    };

    let mut records = Vec::new();
    let report = enrich(&renderer, items, &settings, &mut records).await;

    assert!(records.len() <= 5);
    assert_eq!(report.no_url, 1);
    let no_url: Vec<_> = records
        .iter()
        .filter(|r| r.failure() == Some(FailureReason::NoUrl))
        .collect();
    assert_eq!(no_url.len(), 1);
    assert_eq!(no_url[0].item.id, "B4");

    for record in records.iter().filter(|r| r.item.id != "B4") {
        match record.item.id.as_str() {
            "B1" | "B3" => assert!(record.is_enriched()),
            _ => assert_eq!(record.failure(), Some(FailureReason::Failed)),
        }
    }
}

#[tokio::test]
async fn test_locked_output_falls_back_to_numbered_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(search_page(&ids(1..=3))),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let requested = dir.path().join("results.csv");
    std::fs::create_dir(&requested).unwrap();

    let harvest = Harvest::new(&fast_config(&server.uri()), MockRenderer::default()).unwrap();
    let summary = harvest
        .run(
            HarvestRequest {
                query: "usb cable".to_string(),
                pages: 1,
                out: requested,
            },
            std::future::pending(),
        )
        .await;

    let fallback = dir.path().join("results_1.csv");
    assert_eq!(summary.saved_path, Some(fallback.clone()));

    let mut reader = csv::Reader::from_path(&fallback).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["asin", "title", "url", "price", "error"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| &row[4] == "failed"));
}
