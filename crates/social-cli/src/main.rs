//! Social CLI
//!
//! Command-line interface for the social schema

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use social_core::logging_facility::{self, LogProfile};
use social_store::StoreConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "social")]
#[command(about = "Social - users, profiles, posts, comments and likes", long_about = None)]
struct Cli {
    /// Database file (defaults to $SOCIAL_DB, then ./social.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log output: dev (text) or prod (JSON lines), written to stderr
    #[arg(long, global = true, default_value = "dev")]
    log_format: LogProfile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the schema's tables (drop them first with --force)
    Sync(commands::sync::SyncArgs),
    /// Create a record from JSON attributes
    Create(commands::create::CreateArgs),
    /// Link records through an association
    Link(commands::link::LinkArgs),
    /// Unlink records from an association
    Unlink(commands::link::UnlinkArgs),
    /// Print a record and, optionally, its associated records
    Show(commands::show::ShowArgs),
    /// Delete a record; dependents are unlinked
    Delete(commands::delete::DeleteArgs),
    /// Reset the database and run the example scenarios
    Demo,
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_format);

    let store = match cli.db {
        Some(path) => StoreConfig::from_path(path),
        None => StoreConfig::from_env(),
    };

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::execute(args, &store),
        Commands::Create(args) => commands::create::execute(args, &store),
        Commands::Link(args) => commands::link::execute(args, &store),
        Commands::Unlink(args) => commands::link::execute_unlink(args, &store),
        Commands::Show(args) => commands::show::execute(args, &store),
        Commands::Delete(args) => commands::delete::execute(args, &store),
        Commands::Demo => commands::demo::execute(&store),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
