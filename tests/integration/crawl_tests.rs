//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages and images and run the
//! full crawl cycle end-to-end against in-memory or file-backed sinks.

use shop_ripple::cache::{MemoryCache, PriceCache, SqliteCache};
use shop_ripple::config::Settings;
use shop_ripple::crawler::Coordinator;
use shop_ripple::notify::MemoryNotifier;
use shop_ripple::storage::{JsonStorage, MemoryStorage, Storage};
use shop_ripple::{ScrapeConfig, ShopError};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates settings pointing at the mock server with no delays
fn create_test_settings(server: &MockServer, dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.listing.base_url = format!("{}/shop/", server.uri());
    settings.retry.attempts = 3;
    settings.retry.delay_secs = 0;
    settings.crawler.page_delay_ms = 0;
    settings.output.images_dir = dir.path().join("images").to_string_lossy().into_owned();
    settings.output.products_path = dir
        .path()
        .join("products.json")
        .to_string_lossy()
        .into_owned();
    settings
}

/// Renders one product list item
fn product_item(title: &str, price: &str, image: Option<&str>) -> String {
    let img = image
        .map(|src| {
            format!(
                r#"<img class="attachment-woocommerce_thumbnail" src="data:image/svg+xml,%3Csvg%3E%3C/svg%3E" data-lazy-src="{}">"#,
                src
            )
        })
        .unwrap_or_default();

    format!(
        r#"<li class="product">
            {img}
            <h2 class="woo-loop-product__title"><a href="/p">{title}</a></h2>
            <span class="price"><span class="woocommerce-Price-amount amount"><bdi><span class="woocommerce-Price-currencySymbol">₹</span>{price}</bdi></span></span>
            <a class="button add_to_cart_button" data-title="{title}">Add to cart</a>
        </li>"#
    )
}

fn listing(items: &[String]) -> String {
    format!(
        r#"<html><head><title>Shop</title></head><body><ul class="products">{}</ul></body></html>"#,
        items.join("\n")
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

struct Harness {
    storage: Arc<MemoryStorage>,
    cache: Arc<MemoryCache>,
    notifier: Arc<MemoryNotifier>,
    coordinator: Coordinator,
}

fn harness(settings: Settings, cache: MemoryCache) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let cache = Arc::new(cache);
    let notifier = Arc::new(MemoryNotifier::new());
    let coordinator = Coordinator::new(
        settings,
        storage.clone(),
        cache.clone(),
        notifier.clone(),
    );
    Harness {
        storage,
        cache,
        notifier,
        coordinator,
    }
}

#[tokio::test]
async fn test_full_crawl_until_404() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/shop/",
        listing(&[
            product_item("Dental Mirror", "1,299.50", Some("/img/mirror.jpg")),
            product_item("Explorer", "45.00", None),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/shop/page/2/",
        listing(&[product_item("Scaler", "2,000.00", Some("/img/scaler.jpg"))]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/mirror.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mirror".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shop/page/3/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let result = h
        .coordinator
        .crawl(&ScrapeConfig::default())
        .await
        .expect("crawl should succeed");

    assert_eq!(result.total, 3);
    assert_eq!(result.updated, 3);

    let stored = h.storage.load().await.unwrap();
    let titles: Vec<_> = stored.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Dental Mirror", "Explorer", "Scaler"]);
    assert_eq!(stored[0].price, 1299.50);

    // Mirror image downloaded; Explorer has no image; Scaler image 404s
    let mirror_path = dir.path().join("images").join("Dental Mirror.jpg");
    assert_eq!(stored[0].image_path, mirror_path.to_string_lossy());
    assert_eq!(std::fs::read(&mirror_path).unwrap(), b"mirror");
    assert_eq!(stored[1].image_path, "");
    assert_eq!(stored[2].image_path, "");

    assert_eq!(
        h.notifier.messages(),
        vec!["Scraping completed. Total products: 3, Updated: 3"]
    );

    let cache = h.cache.snapshot().unwrap();
    assert_eq!(cache["product:Dental Mirror"], "1299.50");
    assert_eq!(cache["product:Scaler"], "2000.00");
}

#[tokio::test]
async fn test_empty_page_ends_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/shop/", listing(&[product_item("A", "1.00", None)])).await;
    mount_page(
        &server,
        "/shop/page/2/",
        listing(&[product_item("B", "2.00", None), product_item("C", "3.00", None)]),
    )
    .await;
    mount_page(&server, "/shop/page/3/", listing(&[])).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/4/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let result = h.coordinator.crawl(&ScrapeConfig::default()).await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(h.storage.load().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_page_limit_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/shop/", listing(&[product_item("A", "1.00", None)])).await;
    mount_page(&server, "/shop/page/2/", listing(&[product_item("B", "2.00", None)])).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let request = ScrapeConfig {
        page_limit: Some(2),
        proxy: None,
    };
    let result = h.coordinator.crawl(&request).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(h.storage.save_count().unwrap(), 2);
    assert_eq!(
        h.notifier.messages(),
        vec!["Scraping completed. Total products: 2, Updated: 2"]
    );
}

#[tokio::test]
async fn test_price_change_detection() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/shop/",
        listing(&[
            product_item("Widget", "12.00", None),
            product_item("Gadget", "10.00", None),
        ]),
    )
    .await;

    let cache = MemoryCache::with_entries([("product:Widget", "10.00"), ("product:Gadget", "10.00")]);
    let h = harness(create_test_settings(&server, &dir), cache);
    let result = h.coordinator.crawl(&ScrapeConfig::default()).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.updated, 1);

    let cache = h.cache.snapshot().unwrap();
    assert_eq!(cache["product:Widget"], "12.00");
    assert_eq!(cache["product:Gadget"], "10.00");
}

#[tokio::test]
async fn test_retry_exhaustion_aborts_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/shop/", listing(&[product_item("A", "1.00", None)])).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/2/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let err = h
        .coordinator
        .crawl(&ScrapeConfig::default())
        .await
        .expect_err("crawl should fail");

    assert!(matches!(err, ShopError::PageFetch { page: 2, attempts: 3, .. }));

    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Error during scraping page 2"));

    // Page 1 was flushed before the failure
    assert_eq!(h.storage.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_repeated_titles_are_deduplicated_in_storage() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/shop/", listing(&[product_item("A", "1.00", None)])).await;
    mount_page(&server, "/shop/page/2/", listing(&[product_item("A", "2.00", None)])).await;

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let result = h.coordinator.crawl(&ScrapeConfig::default()).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.updated, 2);

    let stored = h.storage.load().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].price, 2.0);
}

#[tokio::test]
async fn test_no_products_saves_empty_list() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let h = harness(create_test_settings(&server, &dir), MemoryCache::new());
    let result = h.coordinator.crawl(&ScrapeConfig::default()).await.unwrap();

    assert_eq!(result.total, 0);
    assert_eq!(result.updated, 0);
    assert_eq!(h.storage.save_count().unwrap(), 1);
    assert!(h.storage.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persistent_sinks_across_crawls() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/shop/",
        listing(&[product_item("A", "1.00", None), product_item("B", "2.00", None)]),
    )
    .await;

    let settings = create_test_settings(&server, &dir);
    let cache_path = dir.path().join("cache.db");
    let storage = Arc::new(JsonStorage::new(&settings.output.products_path));

    let first = {
        let cache = Arc::new(SqliteCache::new(&cache_path).unwrap());
        Coordinator::new(
            settings.clone(),
            storage.clone(),
            cache,
            Arc::new(MemoryNotifier::new()),
        )
        .crawl(&ScrapeConfig::default())
        .await
        .unwrap()
    };
    assert_eq!(first.updated, 2);

    let cache = Arc::new(SqliteCache::new(&cache_path).unwrap());
    let second = Coordinator::new(
        settings,
        storage.clone(),
        cache.clone(),
        Arc::new(MemoryNotifier::new()),
    )
    .crawl(&ScrapeConfig::default())
    .await
    .unwrap();

    assert_eq!(second.total, 2);
    assert_eq!(second.updated, 0);
    assert_eq!(cache.get("product:B").await.unwrap(), Some("2.00".to_string()));
    assert_eq!(storage.load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_proxy_routes_requests() {
    // The mock server plays the proxy; the catalog host does not resolve
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/shop/", listing(&[product_item("A", "1.00", None)])).await;

    let mut settings = create_test_settings(&server, &dir);
    settings.listing.base_url = "http://catalog.invalid/shop/".to_string();

    let h = harness(settings, MemoryCache::new());
    let request = ScrapeConfig {
        page_limit: None,
        proxy: Some(server.uri()),
    };
    let result = h.coordinator.crawl(&request).await.unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(h.storage.load().await.unwrap()[0].title, "A");

    // Page 1 and the 404 for page 2 both went through the proxy
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received
        .iter()
        .all(|r| r.url.host_str() == Some("catalog.invalid")));
}
