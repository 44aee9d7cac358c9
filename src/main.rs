use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use oxygrove::{
    autopilot::Autopilot, config::ConfigLoader, engine::EngineBuilder, runtime, shop,
    snapshot::GameSnapshot, Engine,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless oxygen grove runner")]
struct Cli {
    /// Path to the game config YAML file
    #[arg(long, default_value = "catalogs/grove.yaml")]
    config: PathBuf,

    /// Game seconds to simulate
    #[arg(long, default_value_t = 600)]
    seconds: u64,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Autopilot actions per second; 0 leaves the grove alone
    #[arg(long, default_value_t = 5)]
    clicks_per_second: u32,

    /// Number of plots the autopilot works
    #[arg(long, default_value_t = 4)]
    plots: u32,

    /// Follow the wall clock instead of simulating as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::new(".").load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(game = %config.name, seed = config.seed, "config loaded");
    let engine = EngineBuilder::from_config(config).build();
    let pilot = Autopilot::new(cli.clicks_per_second, cli.plots);

    let (engine, pilot) = if cli.realtime {
        run_realtime(engine, pilot, cli.seconds).await?
    } else {
        run_headless(engine, pilot, cli.seconds)?
    };

    let snapshot = GameSnapshot::capture(&engine, Utc::now());
    if cli.json {
        println!("{}", snapshot.to_json().context("Failed to encode snapshot")?);
    } else {
        print_summary(&engine, &snapshot, &pilot);
    }
    Ok(())
}

fn run_headless(mut engine: Engine, mut pilot: Autopilot, seconds: u64) -> Result<(Engine, Autopilot)> {
    for _ in 0..seconds {
        pilot.play_second(&mut engine)?;
    }
    Ok((engine, pilot))
}

async fn run_realtime(
    engine: Engine,
    mut pilot: Autopilot,
    seconds: u64,
) -> Result<(Engine, Autopilot)> {
    let (handle, task) = runtime::spawn(engine, Duration::from_millis(100));

    let mut updates = handle.snapshots();
    tokio::spawn(async move {
        while let Some(state) = updates.next().await {
            debug!(oxygen = state.oxygen, trees = state.planted_trees.len(), "state published");
        }
    });

    let mut second = tokio::time::interval(Duration::from_secs(1));
    for _ in 0..seconds {
        tokio::select! {
            _ = second.tick() => {
                pilot = handle
                    .call(move |engine| {
                        let before = engine.state().oxygen;
                        for _ in 0..pilot.clicks_per_second() {
                            pilot.act(engine);
                        }
                        debug!(before, after = engine.state().oxygen, "autopilot second");
                        pilot
                    })
                    .await?;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted");
                break;
            }
        }
    }

    handle.shutdown().await?;
    let engine = task.await.context("runtime task panicked")??;
    Ok((engine, pilot))
}

fn print_summary(engine: &Engine, snapshot: &GameSnapshot, pilot: &Autopilot) {
    let state = &snapshot.state;
    let stats = pilot.stats();
    println!("Game '{}' after {} s", snapshot.game, snapshot.now_ms / 1_000);
    println!(
        "  oxygen {} (highest {}, generated {:.1})",
        state.oxygen, state.highest_oxygen_reached, state.total_oxygen_generated
    );
    println!(
        "  multiplier x{:.2}, auto generation {:.1}/s",
        snapshot.display_multiplier, snapshot.auto_generation
    );
    println!(
        "  trees {} ({} mature), clicks {}, tilling power {}",
        state.planted_trees.len(),
        state.mature_tree_count(),
        state.total_clicks,
        state.tilling_power
    );
    println!(
        "  autopilot: {} clicks, {} seeds, {} upgrades",
        stats.clicks, stats.seeds_planted, stats.upgrades_bought
    );
    let unlocked: Vec<&str> = state
        .achievements
        .iter()
        .filter(|a| a.unlocked)
        .map(|a| a.name.as_str())
        .collect();
    println!("  achievements: {}", unlocked.join(", "));
    let offered = shop::listing(state, engine.catalog())
        .into_iter()
        .filter(|item| item.unlocked)
        .count();
    println!("  shop items unlocked: {offered}");
}
