use whisperlog_core::ai::{CompletionBackend, Insights, InterpretationRequest};
use whisperlog_core::models::Language;
use whisperlog_core::preferences::load_language;
use whisperlog_core::{parse_angel_number, LogEntry};

use crate::cli::LogArgs;
use crate::commands::common::{
    normalize_content, open_insights, open_store, report_push, CommandContext, OpenStoreMode,
};
use crate::error::CliError;

pub async fn run_log(ctx: &CommandContext, args: &LogArgs) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let language = match args.language {
        Some(language) => language,
        None => load_language(store.cache())?,
    };
    let insights = if args.polish || !args.skip_interpretation {
        Some(open_insights(ctx)?)
    } else {
        None
    };

    let entry = build_entry(args, language, insights.as_ref()).await?;
    let outcome = store.append(entry.clone())?.wait().await;
    report_push(outcome);

    println!("{}", entry.id);
    Ok(())
}

/// Turn command arguments into a complete entry, interpreted unless skipped.
///
/// Nothing is stored here; a failed interpretation leaves no trace.
pub async fn build_entry<B: CompletionBackend>(
    args: &LogArgs,
    language: Language,
    insights: Option<&Insights<B>>,
) -> Result<LogEntry, CliError> {
    let number = parse_angel_number(&args.number.join(" "))?;
    let mut notes = args.notes.as_deref().and_then(normalize_content);

    if args.polish {
        if let (Some(raw), Some(insights)) = (notes.clone(), insights) {
            notes = Some(match insights.polish_note(&raw).await {
                Ok(polished) => polished,
                Err(error) => {
                    tracing::warn!("Keeping original notes: {error}");
                    raw
                }
            });
        }
    }

    let mut entry = LogEntry::new(number, args.emotion, args.activity);
    entry.notes = notes;
    entry.mood = args.mood;
    entry.validate()?;

    if !args.skip_interpretation {
        if let Some(insights) = insights {
            interpret_into(&mut entry, language, insights).await?;
        }
    }
    Ok(entry)
}

/// Request a fresh interpretation for `entry` in `language`.
///
/// Any narration of the previous interpretation no longer applies and is
/// dropped.
pub async fn interpret_into<B: CompletionBackend>(
    entry: &mut LogEntry,
    language: Language,
    insights: &Insights<B>,
) -> Result<(), CliError> {
    let request = InterpretationRequest::for_entry(entry, language);
    let interpretation = insights.interpret(&request).await?;
    entry.interpretation = Some(interpretation);
    entry.interpretation_language = Some(language);
    entry.clear_spoken_insight();
    Ok(())
}
