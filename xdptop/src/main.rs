//! Entry point: parses the CLI, opens the pinned map, and runs the App.

use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xdptop::app::App;
use xdptop::map::{PinnedStatsMap, DEFAULT_PIN_DIR, STATS_MAP_NAME};

#[derive(Parser)]
#[command(name = "xdptop")]
#[command(about = "Live per-action stats dashboard for XDP counter maps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the live stats table from the pinned counter map
    Stats(StatsCommand),
}

#[derive(Args)]
struct StatsCommand {
    /// bpffs directory the stats map is pinned under
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PIN_DIR)]
    pin_dir: PathBuf,
    /// Seconds between samples
    #[arg(long, default_value_t = 1)]
    interval_secs: u64,
    /// Print map metadata before entering the dashboard
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("xdptop error: {err:?}");
        exit(1);
    }
}

async fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Stats(cmd)) => {
            let map_path = cmd.pin_dir.join(STATS_MAP_NAME);
            info!("loading pinned map at {}", map_path.display());

            let map = PinnedStatsMap::open(&map_path)
                .with_context(|| format!("loading pinned map at {}", map_path.display()))?;

            println!("Collecting stats from BPF map");
            if cmd.verbose {
                let meta = map.metadata();
                println!(
                    " - BPF map (type: {}) id: {} name: {} key_size: {} value_size: {} max_entries: {}\n",
                    meta.map_type,
                    meta.id,
                    meta.name,
                    meta.key_size,
                    meta.value_size,
                    meta.max_entries
                );
            }

            let interval = Duration::from_secs(cmd.interval_secs.max(1));
            let mut app = App::new(interval);
            app.run(&map).await
        }
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    }
}
