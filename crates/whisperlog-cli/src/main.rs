//! WhisperLog CLI - log angel number sightings from the terminal
//!
//! Entries live in a local SQLite cache and are mirrored to a remote
//! document when one is configured.

mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::affirmation::run_affirmation;
use crate::commands::analytics::run_analytics;
use crate::commands::common::{resolve_db_path, CommandContext};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::language::run_language;
use crate::commands::list::run_list;
use crate::commands::log::run_log;
use crate::commands::polish::run_polish;
use crate::commands::show::run_show;
use crate::commands::speak::run_speak;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "whisperlog=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let ctx = CommandContext {
        db_path: resolve_db_path(cli.db_path)?,
        profile: cli.profile,
    };

    match command {
        Commands::Log(args) => run_log(&ctx, &args).await?,
        Commands::List { limit, json } => run_list(&ctx, limit, json).await?,
        Commands::Show { id, json } => run_show(&ctx, &id, json).await?,
        Commands::Edit(args) => run_edit(&ctx, &args).await?,
        Commands::Speak {
            id,
            language,
            voice_style,
        } => run_speak(&ctx, &id, language, voice_style).await?,
        Commands::Delete { id } => run_delete(&ctx, &id).await?,
        Commands::Export { format, output } => {
            run_export(&ctx, format, output.as_deref()).await?;
        }
        Commands::Analytics { json } => run_analytics(&ctx, json).await?,
        Commands::Polish { text } => run_polish(&ctx, &text).await?,
        Commands::Affirmation { refresh } => run_affirmation(&ctx, refresh).await?,
        Commands::Language { command } => run_language(&ctx, command)?,
        Commands::Sync => run_sync(&ctx).await?,
        Commands::Watch => run_watch(&ctx).await?,
        Commands::Config { command } => run_config(command, ctx.profile.as_deref())?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
