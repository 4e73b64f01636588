//! HTTP server exposing the crawl-and-search pipeline.
//!
//! A single `POST /search` endpoint carries a `{url, query}` pair through the
//! whole pipeline: crawl the site, rebuild the index from its content blocks,
//! and resolve the query against the fresh index. `GET /healthz` is a
//! side-effect-free liveness check. The search endpoint is rate limited per
//! client address, and cross-origin access is restricted to one allowed
//! origin.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use rig::embeddings::EmbeddingModel;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};
use url::Url;

use crate::crawler::{crawl_site, http_client, CrawlerConfig};
use crate::error::Error;
use crate::index::{embed_blocks, Database};
use crate::search::{search_index, QueryHit, DEFAULT_TOP_K};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState<E: EmbeddingModel> {
    db: Database,
    embedder: E,
    http: reqwest::Client,
    crawl_config: CrawlerConfig,
    limiter: Option<Arc<DefaultKeyedRateLimiter<IpAddr>>>,
}

impl<E: EmbeddingModel> AppState<E> {
    /// Build the handler state for a server instance.
    pub fn new(db: Database, embedder: E, crawl_config: CrawlerConfig) -> Result<Self, Error> {
        let http = http_client(&crawl_config)?;
        Ok(Self {
            db,
            embedder,
            http,
            crawl_config,
            limiter: None,
        })
    }

    /// Limit `/search` to `per_minute` requests per client address.
    /// Zero disables rate limiting.
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.limiter = per_ip_limiter(per_minute);
        self
    }
}

fn per_ip_limiter(per_minute: u32) -> Option<Arc<DefaultKeyedRateLimiter<IpAddr>>> {
    NonZeroU32::new(per_minute).map(|limit| Arc::new(RateLimiter::keyed(Quota::per_minute(limit))))
}

/// Build the application router.
pub fn router<E>(state: AppState<E>, allowed_origin: &str) -> Result<Router, Error>
where
    E: EmbeddingModel + 'static,
{
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| Error::InvalidRequest(format!("invalid allowed origin: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route("/search", post(search_handler::<E>))
        .layer(cors)
        .with_state(state))
}

/// Request body for `POST /search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Seed URL of the site to crawl
    pub url: String,

    /// Free-text query to resolve against the crawled content
    pub query: String,
}

/// Response body for `POST /search`
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Ranked snippets, nearest first
    pub results: Vec<ResultEntry>,

    /// Present when the crawl produced nothing to search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One ranked snippet in a search response
#[derive(Debug, Serialize)]
pub struct ResultEntry {
    /// Text of the matched block
    pub result: String,

    /// URL path of the page the block came from
    pub path: String,

    /// Normalized relevance score in [0, 100]
    pub score: f64,

    /// HTML fragment of the matched block
    pub html: String,
}

impl From<QueryHit> for ResultEntry {
    fn from(hit: QueryHit) -> Self {
        Self {
            result: hit.text,
            path: hit.path,
            score: hit.score,
            html: hit.html,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[instrument(skip(state, request), fields(url = %request.url))]
async fn search_handler<E: EmbeddingModel>(
    State(state): State<AppState<E>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorBody>)> {
    if let Some(limiter) = &state.limiter {
        if limiter.check_key(&addr.ip()).is_err() {
            return Err(too_many_requests("rate limit exceeded"));
        }
    }

    if request.query.trim().is_empty() {
        return Err(bad_request("query text must not be empty"));
    }
    let seed = Url::parse(request.url.trim())
        .map_err(|e| bad_request(format!("invalid url: {e}")))?;

    let report = crawl_site(&state.http, &seed, &state.crawl_config)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    if report.blocks.is_empty() {
        info!("Crawl of {} found no content blocks", seed);
        return Ok(Json(SearchResponse {
            results: Vec::new(),
            message: Some("No content found.".to_string()),
        }));
    }

    let entries = embed_blocks(&state.embedder, report.blocks)
        .await
        .map_err(internal_error)?;
    state
        .db
        .replace_all(&entries)
        .await
        .map_err(|e| internal_error(e.into()))?;

    let hits = search_index(
        &state.db,
        &state.embedder,
        request.query.trim(),
        &seed,
        DEFAULT_TOP_K,
    )
    .await
    .map_err(|e| internal_error(e.into()))?;

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(Into::into).collect(),
        message: None,
    }))
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn too_many_requests(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn internal_error(err: Error) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}
