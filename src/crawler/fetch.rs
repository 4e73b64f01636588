//! Breadth-first fetching of same-host pages.

use std::collections::{HashSet, VecDeque};

use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::error::CrawlError;
use crate::crawler::extraction::extract_blocks;
use crate::crawler::{ContentBlock, CrawlReport, CrawlerConfig};

/// Build the HTTP client used for page fetches.
pub fn http_client(config: &CrawlerConfig) -> Result<reqwest::Client, CrawlError> {
    reqwest::Client::builder()
        .timeout(config.fetch_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(CrawlError::Http)
}

/// Crawl a website breadth-first starting from `seed`.
///
/// Pages are fetched one at a time in discovery order. Only links whose host
/// matches the seed's host are followed, each URL is fetched at most once,
/// and the crawl stops once `config.max_pages` fetches have been attempted.
/// A page that fails to fetch or parse contributes nothing; the failure is
/// logged and counted but never aborts the crawl. A failing seed therefore
/// simply produces an empty report.
#[instrument(skip(client, config), fields(seed = %seed))]
pub async fn crawl_site(
    client: &reqwest::Client,
    seed: &Url,
    config: &CrawlerConfig,
) -> Result<CrawlReport, CrawlError> {
    let seed_host = seed
        .host_str()
        .ok_or_else(|| CrawlError::InvalidSeed(format!("{seed} has no host")))?
        .to_string();

    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<Url> = VecDeque::new();
    frontier.push_back(seed.clone());

    let mut report = CrawlReport::default();

    while visited.len() < config.max_pages {
        let Some(url) = frontier.pop_front() else {
            break;
        };
        if !visited.insert(url.as_str().to_string()) {
            continue;
        }

        let body = match fetch_page(client, &url).await {
            Ok(body) => body,
            Err(err) => {
                warn!("Skipping {}: {}", url, err);
                report.failed_pages += 1;
                continue;
            }
        };

        let (blocks, links) = parse_page(&body, &url, &seed_host);
        debug!("Extracted {} blocks from {}", blocks.len(), url);
        report.blocks.extend(blocks);

        for link in links {
            if !visited.contains(link.as_str()) {
                frontier.push_back(link);
            }
        }
    }

    report.pages_visited = visited.len();
    info!(
        "Crawl finished: {} pages visited, {} blocks, {} failed fetches",
        report.pages_visited,
        report.blocks.len(),
        report.failed_pages
    );
    Ok(report)
}

async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<String, CrawlError> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Parse a fetched body into content blocks and same-host links.
///
/// Parsing happens in one synchronous pass so the non-`Send` document never
/// lives across an await point.
fn parse_page(body: &str, page_url: &Url, seed_host: &str) -> (Vec<ContentBlock>, Vec<Url>) {
    let document = Html::parse_document(body);
    let blocks = extract_blocks(&document, page_url);
    let links = discover_links(&document, page_url, seed_host);
    (blocks, links)
}

fn discover_links(document: &Html, page_url: &Url, seed_host: &str) -> Vec<Url> {
    let anchor_selector = Selector::parse("a[href]").expect("selector is valid");

    let mut links = Vec::new();
    for anchor in document.select(&anchor_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut target) = page_url.join(href) else {
            continue;
        };
        if target.scheme() != "http" && target.scheme() != "https" {
            continue;
        }
        // Fragments address positions within a page, not distinct pages.
        target.set_fragment(None);
        if target.host_str() == Some(seed_host) {
            links.push(target);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder().max_pages(10).build()
    }

    async fn seed_of(server: &mockito::ServerGuard) -> Url {
        Url::parse(&server.url()).unwrap()
    }

    #[tokio::test]
    async fn crawls_linked_pages_and_collects_blocks_in_visit_order() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_body("<h2>A</h2><p>one</p><h3>B</h3><a href=\"/two\">next</a>")
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/two")
            .with_body("<h1>C</h1><p>two</p>")
            .create_async()
            .await;

        let config = test_config();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.failed_pages, 0);
        let texts: Vec<&str> = report.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["A one", "C two"]);
        assert!(report.blocks[1].source_url.ends_with("/two"));
    }

    #[tokio::test]
    async fn cyclic_links_are_fetched_once_and_crawl_terminates() {
        let mut server = mockito::Server::new_async().await;
        let root = server
            .mock("GET", "/")
            .with_body("<h1>A</h1><p>a</p><a href=\"/loop\">go</a><a href=\"/\">self</a>")
            .expect(1)
            .create_async()
            .await;
        let looped = server
            .mock("GET", "/loop")
            .with_body("<h1>B</h1><p>b</p><a href=\"/\">back</a><a href=\"/loop#anchor\">again</a>")
            .expect(1)
            .create_async()
            .await;

        let config = test_config();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        root.assert_async().await;
        looped.assert_async().await;
        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.blocks.len(), 2);
    }

    #[tokio::test]
    async fn page_budget_caps_fetch_count() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_body(
                "<h1>A</h1><p>a</p>\
                 <a href=\"/p1\">1</a><a href=\"/p2\">2</a><a href=\"/p3\">3</a>",
            )
            .create_async()
            .await;
        for path in ["/p1", "/p2", "/p3"] {
            server
                .mock("GET", path)
                .with_body("<h1>X</h1><p>x</p>")
                .create_async()
                .await;
        }

        let config = CrawlerConfig::builder().max_pages(2).build();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.blocks.len(), 2);
    }

    #[tokio::test]
    async fn external_hosts_are_never_followed() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_body(
                "<h1>A</h1><p>a</p>\
                 <a href=\"https://elsewhere.invalid/page\">out</a>\
                 <a href=\"mailto:someone@example.com\">mail</a>",
            )
            .create_async()
            .await;

        let config = test_config();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        assert_eq!(report.pages_visited, 1);
        assert_eq!(report.failed_pages, 0);
    }

    #[tokio::test]
    async fn failing_pages_are_skipped_but_counted() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_body("<h1>A</h1><p>a</p><a href=\"/missing\">gone</a>")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(500)
            .create_async()
            .await;

        let config = test_config();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.blocks.len(), 1);
    }

    #[tokio::test]
    async fn failing_seed_yields_empty_report() {
        let mut server = mockito::Server::new_async().await;
        let _root = server.mock("GET", "/").with_status(404).create_async().await;

        let config = test_config();
        let client = http_client(&config).unwrap();
        let report = crawl_site(&client, &seed_of(&server).await, &config)
            .await
            .unwrap();

        assert!(report.blocks.is_empty());
        assert_eq!(report.pages_visited, 1);
        assert_eq!(report.failed_pages, 1);
    }

    #[tokio::test]
    async fn seed_without_host_is_rejected() {
        let config = test_config();
        let client = http_client(&config).unwrap();
        let seed = Url::parse("data:text/plain,nope").unwrap();

        let result = crawl_site(&client, &seed, &config).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed(_))));
    }
}
