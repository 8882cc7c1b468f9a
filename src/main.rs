use std::fs;
use std::sync::Arc;

use dotenv::dotenv;
use ghostchase::sim::{ComparisonRunner, Evaluator};
use ghostchase::{EngineConfig, Graph, TileMaze};
use time::{OffsetDateTime, format_description};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ghostchase=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn started_at() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
        .unwrap_or_else(|| now.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging()?;

    let config = EngineConfig::from_env()?;
    let maze = match &config.maze_path {
        Some(path) => {
            info!("Loading maze from {}", path.display());
            TileMaze::parse(&fs::read_to_string(path)?)?
        }
        None => TileMaze::classic()?,
    };
    let graph = Arc::new(Graph::build(&maze)?);

    info!("Evaluation started at {}", started_at());
    info!("- maze: {}x{}, {} nodes", maze.width(), maze.height(), graph.len());
    info!("- episodes: {}, frame limit: {}", config.episodes, config.max_frames);
    if let Some(seed) = config.seed {
        info!("- seed: {}", seed);
    }

    let evaluator = Evaluator::for_maze(&maze, Arc::clone(&graph), config.evaluation_config());
    let mut runner = ComparisonRunner::new();
    for &choice in &config.strategies {
        let metrics = evaluator.evaluate(choice.name(), |_| config.strategy_kind(choice));
        runner.record(choice.name(), metrics);
    }
    runner.log_comparison();

    Ok(())
}
