use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use model::{TrainingConfig, train_from_csv};
use rand::Rng;
use server::{CatalogQuery, ColdRecord, MovieView, RecommendationService, ServiceConfig, DEFAULT_COLD_YEAR};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Neural movie recommender
#[derive(Parser)]
#[command(name = "neural-recs")]
#[command(about = "Content-based movie recommendations from autoencoder embeddings", long_about = None)]
struct Cli {
    /// Artifact directory written by `train` and read by every other command
    #[arg(short, long, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model on a corpus CSV and write the artifacts
    Train {
        /// CSV with columns title, year, genre, overview, industry
        #[arg(long)]
        data: PathBuf,

        #[arg(long, default_value_t = 5)]
        epochs: usize,

        #[arg(long, default_value_t = 64)]
        batch_size: usize,

        #[arg(long, default_value_t = 64)]
        embedding_dim: usize,

        #[arg(long, default_value_t = 0.001)]
        learning_rate: f32,

        /// Overview vocabulary size
        #[arg(long, default_value_t = 2000)]
        max_text_features: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Movies similar to a catalog row
    Similar {
        /// Catalog row id
        #[arg(long)]
        id: usize,

        #[arg(long, default_value_t = 10)]
        k: usize,
    },

    /// Movies similar to a title (fuzzy matched against the catalog)
    Recommend {
        #[arg(long)]
        title: String,

        #[arg(long, default_value_t = 5)]
        k: usize,
    },

    /// Movies similar to a plot that is not in the catalog
    Plot {
        #[arg(long)]
        overview: String,

        #[arg(long, default_value_t = DEFAULT_COLD_YEAR)]
        year: i32,

        /// Comma-separated genre labels
        #[arg(long, value_delimiter = ',')]
        genres: Vec<String>,

        #[arg(long, default_value_t = 5)]
        k: usize,
    },

    /// Page through the catalog
    Browse {
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Case-insensitive title substring
        #[arg(long)]
        search: Option<String>,

        /// Case-insensitive industry substring
        #[arg(long)]
        industry: Option<String>,
    },

    /// Measure recommend-by-id latency over random catalog rows
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        queries: usize,

        /// Number of queries in flight at once
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let dir = cli.artifacts_dir;
    match cli.command {
        Commands::Train {
            data,
            epochs,
            batch_size,
            embedding_dim,
            learning_rate,
            max_text_features,
            seed,
        } => {
            let config = TrainingConfig {
                embedding_dim,
                epochs,
                batch_size,
                learning_rate,
                max_text_features,
                seed,
                ..TrainingConfig::default()
            };
            handle_train(&data, &dir, config).await?
        }
        Commands::Similar { id, k } => {
            let service = load_service(&dir).await?;
            handle_similar(&service, id, k)?
        }
        Commands::Recommend { title, k } => {
            let service = load_service(&dir).await?;
            handle_recommend(&service, &title, k)?
        }
        Commands::Plot {
            overview,
            year,
            genres,
            k,
        } => {
            let record = ColdRecord {
                title: None,
                overview,
                year,
                genres,
            };
            let service = load_service(&dir).await?;
            handle_plot(&service, &record, k)?
        }
        Commands::Browse {
            page,
            limit,
            search,
            industry,
        } => {
            let query = CatalogQuery {
                page: Some(page),
                limit: Some(limit),
                search,
                industry,
            };
            let service = load_service(&dir).await?;
            handle_browse(&service, &query)?
        }
        Commands::Benchmark {
            queries,
            concurrent,
        } => handle_benchmark(load_service(&dir).await?, queries, concurrent).await?,
    }

    Ok(())
}

/// Load the artifacts (this may take a moment)
async fn load_service(dir: &Path) -> Result<Arc<RecommendationService>> {
    println!("Loading artifacts from {}...", dir.display());
    let start = Instant::now();
    let dir = dir.to_path_buf();
    let service = tokio::task::spawn_blocking(move || {
        RecommendationService::load(&dir, ServiceConfig::default())
    })
    .await
    .context("artifact loading task failed")?;

    if let Err(err) = service.context() {
        bail!("{err}; run `neural-recs train` first");
    }
    println!("{} Loaded artifacts in {:?}", "✓".green(), start.elapsed());
    Ok(Arc::new(service))
}

/// Handle the 'train' command
async fn handle_train(data: &Path, artifacts_dir: &Path, config: TrainingConfig) -> Result<()> {
    println!("{}", format!("Training on {}", data.display()).bold().blue());

    let (data, out) = (data.to_path_buf(), artifacts_dir.to_path_buf());
    let report = tokio::task::spawn_blocking(move || train_from_csv(&data, &out, &config))
        .await
        .context("training task failed")?
        .context("training failed")?;

    for (epoch, loss) in report.epoch_losses.iter().enumerate() {
        println!("{}Epoch {}: loss {:.6}", "• ".cyan(), epoch + 1, loss);
    }
    println!(
        "{} Trained on {} movies ({} features → {} dims) in {:.2?}",
        "✓".green(),
        report.rows,
        report.input_dim,
        report.embedding_dim,
        report.elapsed
    );
    println!("Artifacts written to {}", artifacts_dir.display());
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(service: &RecommendationService, id: usize, k: usize) -> Result<()> {
    let context = service.context()?;
    let source = context.index().record(id)?;
    let rows = service.recommend_by_id(id, Some(k))?;

    print_header(&format!("Movies similar to {} ({}):", source.title, source.year));
    print_rows(&rows);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(service: &RecommendationService, title: &str, k: usize) -> Result<()> {
    let context = service.context()?;
    let matched = context.resolve_title(title)?;
    let resolved = &context.index().record(matched.id)?.title;
    let titles = service.recommend_by_title(title, Some(k))?;

    print_header(&format!("Because you liked {resolved}:"));
    print_titles(&titles);
    Ok(())
}

/// Handle the 'plot' command
fn handle_plot(service: &RecommendationService, record: &ColdRecord, k: usize) -> Result<()> {
    let titles = service.recommend_by_cold_record(record, Some(k))?;

    print_header("Movies with a similar plot:");
    print_titles(&titles);
    Ok(())
}

/// Handle the 'browse' command
fn handle_browse(service: &RecommendationService, query: &CatalogQuery) -> Result<()> {
    let page = service.list_catalog(query)?;
    let pages = page.total.div_ceil(page.limit);

    print_header(&format!(
        "Catalog page {}/{} ({} movies):",
        page.page, pages, page.total
    ));
    for row in &page.rows {
        println!(
            "{}: {} ({}) [{}] {}",
            row.id.to_string().green(),
            row.title,
            row.year,
            row.genre.join(", "),
            row.industry.dimmed()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: Arc<RecommendationService>,
    queries: usize,
    concurrent: usize,
) -> Result<()> {
    if queries == 0 || concurrent == 0 {
        bail!("queries and concurrent must both be at least 1");
    }
    let rows = service.context()?.index().len();

    // Random catalog rows
    let ids: Vec<usize> = {
        let mut rng = rand::rng();
        (0..queries).map(|_| rng.random_range(0..rows)).collect()
    };

    info!("Running {} queries, {} at a time", queries, concurrent);
    let permits = Arc::new(Semaphore::new(concurrent));
    let wall = Instant::now();

    let mut handles = vec![];
    for id in ids {
        let service = service.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                service.recommend_by_id(id, Some(10))?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await?
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = wall.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = percentile(&timings, 0.50);
    let p95 = percentile(&timings, 0.95);
    let p99 = percentile(&timings, 0.99);
    let throughput = queries as f32 / wall_time.as_secs_f32();

    print_header("Benchmark results:");
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} queries/second", throughput);

    Ok(())
}

/// Nearest-rank percentile of sorted, non-empty timings
fn percentile(sorted: &[Duration], q: f32) -> Duration {
    let index = ((sorted.len() as f32 * q) as usize).min(sorted.len() - 1);
    sorted[index]
}

fn print_header(text: &str) {
    println!("{}", text.bold().blue());
}

fn print_rows(rows: &[MovieView]) {
    for (rank, movie) in rows.iter().enumerate() {
        let score = movie
            .score
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{}. {} ({}) [{}] - Score: {}",
            (rank + 1).to_string().green(),
            movie.title,
            movie.year,
            movie.genre.join(", "),
            score
        );
    }
}

fn print_titles(titles: &[String]) {
    if titles.is_empty() {
        println!("{}", "No recommendations".yellow());
    }
    for (rank, title) in titles.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_stays_in_bounds() {
        let timings: Vec<Duration> = (1..=10).map(Duration::from_millis).collect();
        assert_eq!(percentile(&timings, 0.50), Duration::from_millis(6));
        assert_eq!(percentile(&timings, 0.99), Duration::from_millis(10));
        assert_eq!(percentile(&timings[..1], 0.95), Duration::from_millis(1));
    }

    #[test]
    fn test_cli_parses_plot_genres() {
        let cli = Cli::parse_from([
            "neural-recs",
            "plot",
            "--overview",
            "A heist",
            "--genres",
            "Action,Crime",
        ]);
        match cli.command {
            Commands::Plot { genres, year, k, .. } => {
                assert_eq!(genres, vec!["Action", "Crime"]);
                assert_eq!(year, 2024);
                assert_eq!(k, 5);
            }
            _ => panic!("expected plot"),
        }
    }

    #[test]
    fn test_cli_parses_similar_with_artifacts_dir() {
        let cli = Cli::parse_from([
            "neural-recs",
            "--artifacts-dir",
            "/tmp/recs",
            "similar",
            "--id",
            "3",
        ]);
        assert_eq!(cli.artifacts_dir, PathBuf::from("/tmp/recs"));
        match cli.command {
            Commands::Similar { id, k } => {
                assert_eq!(id, 3);
                assert_eq!(k, 10);
            }
            _ => panic!("expected similar"),
        }
    }
}
