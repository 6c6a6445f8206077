mod config;
mod errors;
mod generator;
mod ingest;
mod metrics;
mod server;
mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bi-dashboard")]
#[command(about = "Marketing intelligence dashboard: synthetic data, KPI export, static server")]
#[command(version)]
struct Cli {
    /// Directory holding facebook.csv, google.csv, tiktok.csv and business.csv
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory served by the dashboard server
    #[arg(long, global = true, env = "DASHBOARD_DIR")]
    dashboard_dir: Option<PathBuf>,

    /// Path of the exported dashboard JSON
    #[arg(long, global = true, env = "DASHBOARD_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write synthetic platform and business CSVs
    Generate {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        days: Option<u32>,
        /// First generated date, YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Aggregate the CSVs and export the dashboard JSON
    Process,
    /// Serve the dashboard and its JSON API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    apply_overrides(&mut cfg, &cli);

    if let Err(e) = run(cli.command, cfg).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Apply the global path flags on top of the env config. `--dashboard-dir`
/// also moves the default output file unless `--output` (or
/// `DASHBOARD_OUTPUT`, read by clap) names one.
fn apply_overrides(cfg: &mut config::AppConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.dashboard_dir {
        cfg.output_path = dir.join("dashboard_data.json");
        cfg.dashboard_dir = dir.clone();
    }
    if let Some(path) = &cli.output {
        cfg.output_path = path.clone();
    }
}

async fn run(command: Command, mut cfg: config::AppConfig) -> errors::DashboardResult<()> {
    match command {
        Command::Generate { seed, days, start_date } => {
            if let Some(seed) = seed {
                cfg.generator.seed = seed;
            }
            if let Some(days) = days {
                cfg.generator.days = days;
            }
            if let Some(start) = start_date {
                cfg.generator.start_date = config::parse_date(&start)?;
            }

            let g = &cfg.generator;
            tracing::info!(
                seed = g.seed,
                start = %g.start_date,
                days = g.days,
                "generating sample data"
            );
            let dataset = generator::generate(g);
            generator::write_csvs(&dataset, &cfg.data_dir)?;
            tracing::info!(data_dir = %cfg.data_dir.display(), "data generation complete");
        }
        Command::Process => {
            metrics::export::run_pipeline(&cfg)?;
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                cfg.server_port = port;
            }
            server::run_server(cfg).await?;
        }
    }
    Ok(())
}
