use anyhow::Context;
use clap::{Parser, Subcommand};
use siteclimate::{run_with_config, GridSeries, Quadrant, RunConfig, SeparationModel};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteclimate")]
#[command(about = "Site climate series from mesoscale grid data", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds the site series from the four grid series of its cell
    Run {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Grid series files in SW SE NW NE order (JSON)
        #[arg(short, long, num_args = 4, value_names = ["SW", "SE", "NW", "NE"])]
        series: Vec<PathBuf>,

        /// Separation model, overriding the configuration
        #[arg(short, long)]
        model: Option<String>,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_series(path: &Path) -> anyhow::Result<GridSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid series {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid grid series {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            config,
            series,
            model,
            output,
        } => {
            let mut run_config = RunConfig::load(&config)
                .with_context(|| format!("Failed to load configuration {}", config.display()))?;
            if let Some(name) = model {
                run_config.separation = name.parse::<SeparationModel>()?;
            }

            let [sw, se, nw, ne] = <[PathBuf; 4]>::try_from(series)
                .map_err(|s| anyhow::anyhow!("Expected 4 grid series, got {}", s.len()))?;
            let grid = Quadrant::new(read_series(&sw)?, read_series(&se)?, read_series(&nw)?, read_series(&ne)?);

            let target = run_with_config(&run_config, grid).context("Pipeline failed")?;
            let json = serde_json::to_string_pretty(&target)?;

            if let Some(path) = output {
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), hours = target.len(), "series written");
            } else {
                println!("{}", json);
            }
        }
    }

    Ok(())
}
