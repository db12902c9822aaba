use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rand::Rng;
use scoring::{ScorerConfig, StrategyKind};
use server::{
    InMemoryProfileStore, JsonFileProfileStore, ProfileStore, Recommendation,
    RecommendationService, StaticCatalogProvider,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Hybrid recommender - content, latent-factor and model scoring with online feedback
#[derive(Parser)]
#[command(name = "hybrid-recs")]
#[command(about = "Hybrid item recommender with online learning from ratings", long_about = None)]
struct Cli {
    /// Directory with attributes.dat and items.dat (built-in demo catalog when omitted)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Directory holding one JSON file per user profile
    #[arg(short, long, default_value = "profiles")]
    profiles_dir: PathBuf,

    /// JSON scorer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the strategy named in the configuration
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Hybrid,
    TagWeights,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hybrid => StrategyKind::Hybrid,
            StrategyArg::TagWeights => StrategyKind::TagWeights,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a user
    Recommend {
        #[arg(long)]
        user: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Show the score breakdown and reasons for each item
        #[arg(long)]
        explain: bool,
    },

    /// Rate an item and update the user's profile
    Rate {
        #[arg(long)]
        user: String,

        #[arg(long)]
        item: String,

        #[arg(long)]
        rating: f32,

        /// Free-text reason stored with the feedback
        #[arg(long)]
        reason: Option<String>,
    },

    /// Show a user's affinities, factors and feedback history
    Profile {
        #[arg(long)]
        user: String,
    },

    /// Restore a user's profile to the defaults
    Reset {
        #[arg(long)]
        user: String,
    },

    /// Train a profile model and show recommendations that use it
    Train {
        #[arg(long)]
        user: String,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// List the catalog
    Catalog,

    /// Run concurrent feedback and ranking requests against an in-memory store
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "200")]
        requests: usize,

        /// Number of distinct users the requests are spread over
        #[arg(long, default_value = "10")]
        users: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScorerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScorerConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
    }

    let start = Instant::now();
    let provider = match &cli.data_dir {
        Some(dir) => StaticCatalogProvider::from_dir(dir)
            .with_context(|| format!("Failed to load catalog from {}", dir.display()))?,
        None => StaticCatalogProvider::seeded().context("Failed to build demo catalog")?,
    };
    info!("Catalog ready in {:?}", start.elapsed());

    if let Commands::Benchmark { requests, users } = cli.command {
        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
        let service = RecommendationService::new(&provider, store, config)?;
        return handle_benchmark(service, requests, users).await;
    }

    let store: Arc<dyn ProfileStore> = Arc::new(
        JsonFileProfileStore::new(&cli.profiles_dir).context("Failed to open profile directory")?,
    );
    let service = RecommendationService::new(&provider, store, config)?;

    match cli.command {
        Commands::Recommend {
            user,
            limit,
            explain,
        } => {
            let recommendations = service.recommend(&user, limit).await?;
            print_recommendations(&recommendations, explain);
        }
        Commands::Rate {
            user,
            item,
            rating,
            reason,
        } => handle_rate(&service, &user, &item, rating, reason.as_deref()).await?,
        Commands::Profile { user } => handle_profile(&service, &user).await?,
        Commands::Reset { user } => {
            service.reset_profile(&user).await?;
            println!("{} Profile of {} reset to defaults", "✓".green(), user.bold());
        }
        Commands::Train { user, limit } => {
            let report = service.train_model(&user).await?;
            println!(
                "{} Trained on {} samples for {} epochs, loss {:.4}",
                "✓".green(),
                report.samples,
                report.epochs,
                report.loss
            );
            let recommendations = service.recommend(&user, limit).await?;
            print_recommendations(&recommendations, true);
        }
        Commands::Catalog => handle_catalog(&service),
        Commands::Benchmark { .. } => {}
    }

    Ok(())
}

/// Handle the 'rate' command
async fn handle_rate(
    service: &RecommendationService,
    user: &str,
    item: &str,
    rating: f32,
    reason: Option<&str>,
) -> Result<()> {
    let profile = service.submit_feedback(user, item, rating, reason).await?;
    let recorded = profile
        .feedback
        .latest()
        .map(|e| e.rating)
        .unwrap_or(rating);

    println!(
        "{} Recorded {:.2} for {} ({} events in history)",
        "✓".green(),
        recorded,
        item.bold(),
        profile.feedback.len()
    );
    println!("   Factors: {}", format_vector(&profile.factors));
    Ok(())
}

/// Handle the 'profile' command
async fn handle_profile(service: &RecommendationService, user: &str) -> Result<()> {
    let profile = service.profile(user).await?;

    println!("{}", format!("User: {}", profile.user_id).bold().blue());
    println!("{}Strategy: {}", "• ".green(), service.strategy().name());
    println!("{}Factors: {}", "• ".green(), format_vector(&profile.factors));

    println!("Affinities:");
    let mut affinities: Vec<_> = profile.affinities.iter().collect();
    affinities.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, weight) in affinities {
        println!("  - {}: {:.2}", name, weight);
    }

    println!(
        "Feedback ({} of at most {}):",
        profile.feedback.len(),
        profile.feedback.capacity()
    );
    for event in profile.feedback.iter() {
        let title = service
            .catalog()
            .get_item(&event.item_id)
            .map(|item| item.title.as_str())
            .unwrap_or("<removed>");
        println!(
            "  - {} {} rated {:.2} at {} ({})",
            "•".cyan(),
            title,
            event.rating,
            event.timestamp,
            event.reason
        );
    }
    Ok(())
}

/// Handle the 'catalog' command
fn handle_catalog(service: &RecommendationService) {
    let catalog = service.catalog();
    println!(
        "{}",
        format!(
            "{} items, attributes [{}], {} latent factors",
            catalog.len(),
            catalog.schema().names().join(", "),
            catalog.factor_dim()
        )
        .bold()
        .blue()
    );
    for item in catalog.items() {
        println!(
            "{}: {} ({}) [{}]",
            item.id.green(),
            item.title,
            item.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            item.tags.join(", ")
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: RecommendationService,
    requests: usize,
    users: usize,
) -> Result<()> {
    let users = users.max(1);
    let item_ids: Vec<String> = service.catalog().items().iter().map(|i| i.id.clone()).collect();
    if item_ids.is_empty() {
        bail!("Catalog is empty, nothing to benchmark");
    }

    // Draw the whole workload up front, the thread rng is not Send
    let mut rng = rand::rng();
    let workload: Vec<(String, String, f32)> = (0..requests)
        .map(|_| {
            let user = format!("bench-{}", rng.random_range(0..users));
            let item = item_ids[rng.random_range(0..item_ids.len())].clone();
            (user, item, rng.random_range(0.0..=1.0))
        })
        .collect();

    let start = Instant::now();
    let mut handles = vec![];
    for (user, item, rating) in workload {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            service.submit_feedback(&user, &item, rating, Some("benchmark")).await?;
            service.recommend(&user, 5).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = start.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    timings.sort();
    let percentile = |p: f32| timings[((timings.len() - 1) as f32 * p) as usize];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} over {} users", timings.len(), users);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f32 / wall_time.as_secs_f32()
    );
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Recommendations:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            rec.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            rec.tags.join(", "),
            rec.score
        );
        if explain {
            let model = rec
                .breakdown
                .model
                .map(|m| format!("{:.3}", m))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   content {:.3} | latent {:.3} | model {}",
                rec.breakdown.content, rec.breakdown.latent, model
            );
            println!("   {}", rec.explanation);
        }
    }
}

fn format_vector(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.4}", v)).collect();
    format!("[{}]", parts.join(", "))
}
