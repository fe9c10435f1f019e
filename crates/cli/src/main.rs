use anyhow::{Context, Result, bail};
use catalog::loader::{load_dataset, load_interactions, load_items};
use catalog::{Dataset, ItemRef, ItemType, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{EngineConfig, RecommendRequest, RecommendationService};
use ranking::Recommendation;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// recs - content and collaborative recommendations for movies, books and series
#[derive(Parser)]
#[command(name = "recs")]
#[command(about = "Hybrid TF-IDF and collaborative filtering recommendation engine", long_about = None)]
struct Cli {
    /// Directory holding items.jsonl and (optionally) interactions.jsonl
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Item feed; overrides the one in --data-dir
    #[arg(long)]
    items: Option<PathBuf>,

    /// Interaction feed; only read together with --items
    #[arg(long)]
    interactions: Option<PathBuf>,

    /// JSON engine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a set of liked items
    Recommend {
        /// Liked item as type:id, e.g. movie:10 (repeatable)
        #[arg(long = "like", required = true)]
        liked: Vec<ItemRef>,

        #[arg(long)]
        user_id: Option<UserId>,

        /// Only recommend items of this type
        #[arg(long)]
        target_type: Option<ItemType>,

        #[arg(long)]
        limit: Option<usize>,

        /// 0 keeps relevance order, 1 maximizes novelty
        #[arg(long)]
        diversity: Option<f32>,

        #[arg(long)]
        max_candidates: Option<usize>,

        #[arg(long)]
        mmr_pool: Option<usize>,

        #[arg(long)]
        min_score: Option<f32>,

        /// Show the reason for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show index and interaction statistics
    Stats,

    /// Search items by title
    Search {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Liked items per request
        #[arg(long, default_value = "3")]
        likes: usize,
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

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).context("Failed to load engine config")?,
        None => EngineConfig::default(),
    };
    let service = Arc::new(load_service(&cli, config)?);

    match cli.command {
        Commands::Recommend {
            liked,
            user_id,
            target_type,
            limit,
            diversity,
            max_candidates,
            mmr_pool,
            min_score,
            explain,
        } => {
            let defaults = &service.config().defaults;
            let mut request = RecommendRequest::with_defaults(liked, defaults)
                .limit(limit.unwrap_or(defaults.limit))
                .diversity(diversity.unwrap_or(defaults.diversity))
                .max_candidates(max_candidates.unwrap_or(defaults.max_candidates))
                .mmr_pool(mmr_pool.unwrap_or(defaults.mmr_pool))
                .min_score(min_score.unwrap_or(defaults.min_score));
            request.user_id = user_id;
            request.target_type = target_type;
            handle_recommend(&service, &request, explain, cli.json)?
        }
        Commands::Stats => handle_stats(&service, cli.json)?,
        Commands::Search { title, limit } => handle_search(&service, &title, limit, cli.json)?,
        Commands::Benchmark {
            requests,
            concurrent,
            likes,
        } => handle_benchmark(service, requests, concurrent, likes).await?,
    }

    Ok(())
}

/// Read the feeds and build the index
fn load_service(cli: &Cli, config: EngineConfig) -> Result<RecommendationService> {
    let start = Instant::now();
    let dataset = match &cli.items {
        Some(items) => {
            println!("Loading items from {}...", items.display());
            Dataset {
                items: load_items(items).context("Failed to load item feed")?,
                interactions: match &cli.interactions {
                    Some(path) => load_interactions(path).context("Failed to load interaction feed")?,
                    None => Vec::new(),
                },
            }
        }
        None => {
            println!("Loading dataset from {}...", cli.data_dir.display());
            load_dataset(&cli.data_dir).context("Failed to load dataset")?
        }
    };

    let service = RecommendationService::new(config);
    let report = service.sync_items(dataset.items, true);
    let synced = service
        .sync_interactions(&dataset.interactions)
        .context("Failed to sync interactions")?;
    println!(
        "{} Loaded {} items and {} interactions in {:?}",
        "✓".green(),
        report.item_count,
        synced.ingested,
        start.elapsed()
    );
    Ok(service)
}

/// Handle the 'recommend' command
fn handle_recommend(
    service: &RecommendationService,
    request: &RecommendRequest,
    explain: bool,
    json: bool,
) -> Result<()> {
    let recommendations = service.recommend(request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(&recommendations, explain);
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(service: &RecommendationService, json: bool) -> Result<()> {
    let health = service.health();
    let stats = service.stats();
    if json {
        let out = serde_json::json!({ "health": health, "stats": stats });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let status = if health.status == "ok" {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!("{} {}", "Status:".bold().blue(), status);
    println!("{}Items: {}", "• ".green(), stats.item_count);
    println!("{}Vocabulary: {} terms", "• ".green(), stats.vocabulary_size);
    println!("{}Genres: {}", "• ".green(), stats.genre_count);
    println!("{}Users: {}", "• ".cyan(), stats.user_count);
    println!("{}Items with interactions: {}", "• ".cyan(), stats.interacted_item_count);
    println!("{}Positive events: {}", "• ".cyan(), stats.interaction_total);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(service: &RecommendationService, title: &str, limit: usize, json: bool) -> Result<()> {
    let hits = service.search(title, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if hits.is_empty() {
        println!("  no matches");
    }
    for hit in &hits {
        println!(
            "{}:{} {} [{}] {:.3}",
            hit.item_type,
            hit.id,
            hit.title,
            hit.genres.join(", "),
            hit.score
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: Arc<RecommendationService>,
    requests: usize,
    concurrent: usize,
    likes: usize,
) -> Result<()> {
    let Some(index) = service.snapshot() else {
        bail!("No index to benchmark");
    };
    if index.is_empty() || requests == 0 {
        bail!("Benchmark needs a non-empty catalog and at least one request");
    }

    // Random liked sets drawn from the catalog
    let catalog: Vec<ItemRef> = index
        .documents()
        .iter()
        .map(|doc| ItemRef::new(doc.record.id, doc.record.item_type))
        .collect();
    let liked_sets: Vec<Vec<ItemRef>> = (0..requests)
        .map(|_| {
            (0..likes.max(1))
                .map(|_| catalog[rand::random_range(0..catalog.len())])
                .collect()
        })
        .collect();

    info!("Running {} requests with concurrency {}", requests, concurrent);
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let started = Instant::now();

    let mut handles = vec![];
    for liked in liked_sets {
        let service = service.clone();
        let permit = semaphore.clone().acquire_owned().await?;
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let request = RecommendRequest::with_defaults(liked, &service.config().defaults);
            let start = Instant::now();
            service.recommend(&request)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = started.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  nothing to recommend");
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}:{}) [{}] - Score: {:.3}",
            (rank + 1).to_string().green(),
            rec.title,
            rec.item_type,
            rec.id,
            rec.genres.join(", "),
            rec.score
        );
        if explain {
            println!("   {}", rec.reason.italic());
        }
    }
}
