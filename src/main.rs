use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod tools;
mod ui;

use cli::{Cli, Commands};
use commands::{fetch, render, requirements, up};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .init();

    if cli.global.supersecret {
        ui::print_warning("--supersecret is set: secrets, passwords and certificates will be printed");
    }

    // Execute command
    match cli.command {
        Commands::Up { upgrade, fast } => {
            up::execute(&cli.global, upgrade, fast).await?;
        }
        Commands::RequirementsBuild { fast } => {
            requirements::execute(&cli.global, fast).await?;
        }
        Commands::Fetch {
            version,
            destination,
        } => {
            fetch::execute(&cli.global, version, destination).await?;
        }
        Commands::Render { upgrade } => {
            render::execute(&cli.global, upgrade)?;
        }
    }

    Ok(())
}
