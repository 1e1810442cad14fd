use whisperlog_core::preferences::load_language;
use whisperlog_core::{parse_angel_number, LogEntry};

use crate::cli::EditArgs;
use crate::commands::common::{
    normalize_content, open_insights, open_store, report_push, resolve_entry, CommandContext,
    OpenStoreMode,
};
use crate::commands::log::interpret_into;
use crate::error::CliError;

pub async fn run_edit(ctx: &CommandContext, args: &EditArgs) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entry = resolve_entry(&store, &args.id)?;
    let mut edited = apply_edits(entry, args)?;

    if !args.skip_interpretation {
        let language = match args.language.or(edited.interpretation_language) {
            Some(language) => language,
            None => load_language(store.cache())?,
        };
        let insights = open_insights(ctx)?;
        interpret_into(&mut edited, language, &insights).await?;
    }

    let outcome = store.update(edited.clone())?.wait().await;
    report_push(outcome);
    println!("{}", edited.id);
    Ok(())
}

/// Replace the fields named in `args`, keeping id and timestamp.
pub fn apply_edits(mut entry: LogEntry, args: &EditArgs) -> Result<LogEntry, CliError> {
    if let Some(number) = args.number.as_deref() {
        entry.angel_number = parse_angel_number(number)?;
    }
    if let Some(emotion) = args.emotion {
        entry.emotion = emotion;
    }
    if let Some(activity) = args.activity {
        entry.activity = activity;
    }
    if args.clear_notes {
        entry.notes = None;
    } else if let Some(notes) = args.notes.as_deref() {
        entry.notes = normalize_content(notes);
    }
    if args.clear_mood {
        entry.mood = None;
    } else if let Some(mood) = args.mood {
        entry.mood = Some(mood);
    }

    entry.validate()?;
    Ok(entry)
}
