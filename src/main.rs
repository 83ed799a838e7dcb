use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vgroup::dataset;
use vgroup_core::{CollectionConfig, Distance};
use vgroup_grouping::{GroupingConfig, GroupingEngine, ShardedSource};

/// Grouped vector search over a JSON dataset
#[derive(Parser, Debug)]
#[command(name = "vgroup")]
#[command(about = "Return the best hits per group instead of the best hits overall", long_about = None)]
struct Args {
    /// JSON array of points: `[{"id": 1, "vector": [..], "payload": {..}}, ..]`
    #[arg(short, long)]
    points: PathBuf,

    /// Vector dimension of the points
    #[arg(long)]
    dim: usize,

    /// Distance function: cosine, euclidean or dot
    #[arg(long, default_value = "cosine")]
    distance: Distance,

    /// Grouped request as JSON
    #[arg(short, long)]
    request: PathBuf,

    /// Number of shards the points are spread over
    #[arg(long, default_value_t = 1)]
    shards: usize,

    /// Largest candidate pool as a multiple of `limit * per_group`
    #[arg(long, default_value_t = GroupingConfig::default().max_pool_multiplier)]
    max_pool_multiplier: usize,

    /// Rounds run after the best groups are first complete
    #[arg(long, default_value_t = GroupingConfig::default().confirm_rounds)]
    confirm_rounds: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let points = dataset::load_points(&args.points)?;
    info!("Loaded {} points from {:?}", points.len(), args.points);

    let config = CollectionConfig {
        name: "points".to_string(),
        vector_dim: args.dim,
        distance: args.distance,
    };
    let collections = dataset::shard(points, &config, args.shards)?;
    info!("Spread points over {} shard(s)", collections.len());

    let request = dataset::load_request(&args.request)?;
    info!(
        "Grouping by {:?}: limit {}, per_group {}",
        request.group_by, request.limit, request.per_group
    );

    let engine = GroupingEngine::new(GroupingConfig {
        max_pool_multiplier: args.max_pool_multiplier,
        confirm_rounds: args.confirm_rounds,
    });
    request.validate()?;
    let source = ShardedSource::for_request(&collections, &request)?;
    let result = engine.group_by(&request, &source)?;
    info!("Returning {} group(s), {} hit(s)", result.groups.len(), result.hit_count());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
