use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;

use commands::*;
use error::Result;
use hostwatch_monitor::config::MonitorConfig;
use output::{OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "hostwatch")]
#[command(about = "Hostwatch - periodic host resource sampling and daily reports")]
#[command(version)]
#[command(long_about = "
Hostwatch samples CPU, memory and disk utilization at a fixed interval, appends
each sample to a daily JSON-lines log, flags threshold breaches, and builds
daily summaries and charts from those logs.

Examples:
  hostwatch collect --interval 5 --duration 60        # Sample for one minute
  hostwatch collect --top-n 3 --top-by mem            # Record the top 3 processes by memory
  hostwatch report --date 20240101 --tz utc           # Summarize a day, UTC chart first
  hostwatch config generate --output hostwatch.toml   # Write a default configuration
")]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample system metrics into the daily log
    Collect(CollectArgs),

    /// Summarize a day's log and render charts
    Report(ReportArgs),

    /// Manage Hostwatch configuration
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_command(cli).await {
        eprintln!("{}", error::format_error(&e));
        process::exit(e.exit_code());
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let config = MonitorConfig::load(cli.config.as_deref(), &MonitorConfig::default())?;
    if let Some(path) = &cli.config {
        info!("Loaded configuration from: {}", path.display());
    }

    let colored = !cli.no_color && console::Term::stdout().features().colors_supported();
    let output = OutputManager::new(OutputFormat::Text, colored);

    match cli.command {
        Commands::Collect(args) => commands::collect::run(args, config.collector, output).await,
        Commands::Report(args) => commands::report::run(args, config.report, output),
        Commands::Config(args) => commands::config::run(args, &config, cli.config, output),
    }
}

fn init_logging(cli: &Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostwatch={}", log_level).parse()?)
        .add_directive(format!("hostwatch_monitor={}", log_level).parse()?);

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
