//! HTTP server for the neural movie recommender.
//!
//! Loads the artifact directory once and serves queries against it. The
//! server binds even when the artifacts are missing; queries then answer
//! 503 until it is restarted against a trained directory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use server::{router, RecommendationService, ServiceConfig};
use similarity::MatcherKind;

#[derive(Parser, Debug)]
#[command(name = "neural-recs-server", about = "Serve movie recommendations over HTTP")]
struct Args {
    /// Directory produced by `neural-recs train`
    #[arg(long, env = "NEURAL_RECS_ARTIFACTS", default_value = "artifacts")]
    artifacts_dir: PathBuf,

    #[arg(long, env = "NEURAL_RECS_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "NEURAL_RECS_PORT", default_value_t = 8000)]
    port: u16,

    /// Title matching strategy
    #[arg(long, default_value = "sequence-ratio")]
    matcher: MatcherKind,

    /// Minimum fuzzy score for a title match
    #[arg(long, default_value_t = similarity::DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = ServiceConfig {
        matcher: args.matcher,
        match_threshold: args.match_threshold,
        ..ServiceConfig::default()
    };

    let dir = args.artifacts_dir.clone();
    let service = tokio::task::spawn_blocking(move || RecommendationService::load(&dir, config))
        .await
        .context("artifact loading task failed")?;
    if !service.is_ready() {
        warn!(
            "Starting without artifacts from {}; queries will return 503",
            args.artifacts_dir.display()
        );
    }

    let app = router(Arc::new(service));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.context("server shutdown")?;
    Ok(())
}
