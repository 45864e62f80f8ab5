use clap::{Parser, Subcommand};
use cashclock_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "cashclock", version, about = "CashClock meeting cost clock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clock control
    Clock {
        #[command(subcommand)]
        action: commands::clock::ClockAction,
    },
    /// Snapshot exchange with the paired device
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    logging::init(&config.logging);
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "falling back to default configuration");
    }

    let result = match cli.command {
        Commands::Clock { action } => commands::clock::run(action, &config),
        Commands::Sync { action } => commands::sync::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
