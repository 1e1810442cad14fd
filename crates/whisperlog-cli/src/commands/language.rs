use whisperlog_core::preferences::{load_language, save_language};

use crate::cli::LanguageCommands;
use crate::commands::common::CommandContext;
use crate::error::CliError;

pub fn run_language(
    ctx: &CommandContext,
    command: Option<LanguageCommands>,
) -> Result<(), CliError> {
    let cache = ctx.open_cache()?;
    match command {
        None => println!("{}", load_language(&cache)?),
        Some(LanguageCommands::Set { language }) => {
            save_language(&cache, language)?;
            println!("Language set to {language}");
        }
    }
    Ok(())
}
