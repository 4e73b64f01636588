//! # Sitesift Server Binary
//!
//! This module implements the server entry point for sitesift, wiring the
//! crawl-index-search pipeline behind a small HTTP surface.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Tracing setup for the running server
//! - Gemini-backed embedding model with client-side rate limiting
//! - A libsql-backed vector index sized to the model's dimensions
//! - An axum server with per-IP rate limiting and a single allowed origin

mod telemetry;

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use rig::embeddings::EmbeddingModel;
use sitesift::crawler::CrawlerConfig;
use sitesift::index::Database;
use sitesift::model;
use sitesift::server::{router, AppState};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Crawl a website and answer free-text queries against its content", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// Path to the index database file
    #[arg(short, long, default_value = "sitesift.db")]
    database: String,

    /// Origin allowed to call the API from a browser
    #[arg(short = 'o', long, default_value = "http://localhost:3000")]
    allowed_origin: String,

    /// Maximum number of pages to crawl per request
    #[arg(short = 'p', long, default_value = "30")]
    max_pages: usize,

    /// Per-page fetch timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Search requests allowed per client address per minute (0 disables)
    #[arg(short, long, default_value = "3")]
    rate_limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let embedder = model::new_gemini_from_env();
    let db = Database::new_from_path(&cli.database, embedder.ndims())
        .await
        .with_context(|| format!("failed to open database at {}", cli.database))?;

    let crawl_config = CrawlerConfig::builder()
        .max_pages(cli.max_pages)
        .fetch_timeout_secs(cli.timeout)
        .build();

    let state = AppState::new(db, embedder, crawl_config)?.with_rate_limit(cli.rate_limit);
    let app = router(state, &cli.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!("Listening on {}", cli.listen);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
