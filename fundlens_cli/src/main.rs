mod commands;
mod output;
mod xml_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fundlens_lib::Settings;

use crate::commands::Context;
use crate::output::{parse_fields, Output, OutputFormat};

#[derive(Parser)]
#[command(name = "fundlens")]
#[command(about = "Query campaign-finance contributions, candidates and committees")]
struct Cli {
    /// Output format: table, json, csv, markdown or xml
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Comma-separated fields to keep in JSON output (dot notation for nested fields)
    #[arg(long, global = true)]
    fields: Option<String>,

    /// SQLite database path (overrides config and FUNDLENS_DATABASE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, search or show candidates
    Candidates(Box<commands::candidates::CandidatesArgs>),
    /// List, search or show committees
    Committees(Box<commands::committees::CommitteesArgs>),
    /// List, search or show contributors
    Contributors(Box<commands::contributors::ContributorsArgs>),
    /// List contributions, with optional statistics
    Contributions(Box<commands::contributions::ContributionsArgs>),
    /// Search candidates, committees and contributors at once
    Search(commands::search::SearchArgs),
    /// Summarize candidates and money raised in one state
    States(commands::states::StatesArgs),
    /// Show one Senate, House or presidential race with per-candidate totals
    Races(commands::races::RacesArgs),
    /// List the codes present in the data with their labels
    Metadata(commands::metadata::MetadataArgs),
    /// Load a JSON dataset into the database
    Import(commands::import::ImportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fundlens=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.database_path = db;
    }
    let ctx = Arc::new(Context { settings });

    let out = Output {
        format: OutputFormat::parse(&cli.output),
        fields: cli.fields.as_deref().map(parse_fields).unwrap_or_default(),
    };

    match &cli.command {
        Commands::Candidates(args) => commands::candidates::run(args, &ctx, &out)?,
        Commands::Committees(args) => commands::committees::run(args, &ctx, &out)?,
        Commands::Contributors(args) => commands::contributors::run(args, &ctx, &out)?,
        Commands::Contributions(args) => commands::contributions::run(args, &ctx, &out)?,
        Commands::Search(args) => commands::search::run(args, Arc::clone(&ctx), &out).await?,
        Commands::States(args) => commands::states::run(args, &ctx, &out)?,
        Commands::Races(args) => commands::races::run(args, &ctx, &out)?,
        Commands::Metadata(args) => commands::metadata::run(args, &ctx, &out)?,
        Commands::Import(args) => commands::import::run(args, &ctx)?,
    }

    Ok(())
}
