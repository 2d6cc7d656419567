use std::path::PathBuf;

use clap::Args;
use hostwatch_monitor::config::MonitorConfig;

use crate::error::{CliError, Result};
use crate::output::OutputManager;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration action
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration as TOML
    Show,

    /// Validate a configuration file
    Validate {
        /// Configuration file path (defaults to --config)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Write a configuration file with default values
    Generate {
        /// Output path (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(
    args: ConfigArgs,
    config: &MonitorConfig,
    config_path: Option<PathBuf>,
    output: OutputManager,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            if let Some(path) = &config_path {
                output.print_info(&format!("Configuration file: {}", path.display()));
            }
            output.print_text(&config.to_toml()?);
        }
        ConfigAction::Validate { file } => {
            let path = file.or(config_path).ok_or_else(|| {
                CliError::InvalidArgument("no configuration file given; pass --file or --config".to_string())
            })?;
            MonitorConfig::load(Some(path.as_path()), &MonitorConfig::default())?;
            output.print_success(&format!("Configuration is valid: {}", path.display()));
        }
        ConfigAction::Generate { output: path, force } => {
            let defaults = MonitorConfig::default();
            match path {
                Some(path) => {
                    if path.exists() && !force {
                        return Err(CliError::FileExists {
                            path: path.display().to_string(),
                        });
                    }
                    defaults.save_to_file(&path)?;
                    output.print_success(&format!("Wrote default configuration to {}", path.display()));
                }
                None => output.print_text(&defaults.to_toml()?),
            }
        }
    }

    Ok(())
}
