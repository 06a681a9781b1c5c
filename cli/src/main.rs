mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_burned_clear, cmd_burned_set, cmd_burned_show, cmd_history, cmd_log, cmd_remove,
    cmd_reset, cmd_summary, cmd_target_clear, cmd_target_set, cmd_target_show,
};
use crate::config::Config;
use kcal_core::storage::FileStore;
use kcal_core::store::TrackerStore;

#[derive(Parser)]
#[command(
    name = "kcal",
    version,
    about = "A simple calorie tracking widget",
    long_about = "\n\n  ██╗  ██╗ ██████╗ █████╗ ██╗
  ██║ ██╔╝██╔════╝██╔══██╗██║
  █████╔╝ ██║     ███████║██║
  ██╔═██╗ ██║     ██╔══██║██║
  ██║  ██╗╚██████╗██║  ██║███████╗
  ╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝╚══════╝
      know where your day stands.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a meal by calorie count
    Log {
        /// Calorie count for the meal
        calories: String,
        /// Category: breakfast, lunch, dinner, snack, other
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Date to log for (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a meal entry by ID
    Remove {
        /// Entry ID to remove
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show daily summary (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all logged days, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the daily calorie target
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },
    /// Manage calories burned
    Burned {
        #[command(subcommand)]
        command: BurnedCommands,
    },
    /// Clear all tracked data
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the widget server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[derive(Subcommand)]
enum TargetCommands {
    /// Set the daily calorie target
    Set {
        /// Daily calorie target
        calories: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current target
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the target
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BurnedCommands {
    /// Set calories burned
    Set {
        /// Calories burned
        calories: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calories burned
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear calories burned
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let mut store = TrackerStore::load(FileStore::open(&config.store_path));

    match cli.command {
        Commands::Log {
            calories,
            category,
            date,
            json,
        } => cmd_log(&mut store, &calories, &category, date, json),
        Commands::Remove { entry_id, json } => cmd_remove(&mut store, entry_id, json),
        Commands::Summary { date, json } => cmd_summary(&store, date, json),
        Commands::History { json } => cmd_history(&store, json),
        Commands::Reset { yes, json } => cmd_reset(&mut store, yes, json),
        Commands::Serve { port, bind } => server::start_server(store, port, &bind).await,
        Commands::Target { command } => match command {
            TargetCommands::Set { calories, json } => cmd_target_set(&mut store, calories, json),
            TargetCommands::Show { json } => cmd_target_show(&store, json),
            TargetCommands::Clear { json } => cmd_target_clear(&mut store, json),
        },
        Commands::Burned { command } => match command {
            BurnedCommands::Set { calories, json } => cmd_burned_set(&mut store, calories, json),
            BurnedCommands::Show { json } => cmd_burned_show(&store, json),
            BurnedCommands::Clear { json } => cmd_burned_clear(&mut store, json),
        },
    }
}
