use whisperlog_core::ai::{CompletionBackend, Insights, SpokenInsightRequest};
use whisperlog_core::models::{Language, VoiceStyle};
use whisperlog_core::preferences::load_language;
use whisperlog_core::LogEntry;

use crate::commands::common::{
    open_insights, open_store, report_push, resolve_entry, CommandContext, OpenStoreMode,
};
use crate::error::CliError;

pub async fn run_speak(
    ctx: &CommandContext,
    id: &str,
    language: Option<Language>,
    voice_style: VoiceStyle,
) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entry = resolve_entry(&store, id)?;
    let language = match language {
        Some(language) => language,
        None => load_language(store.cache())?,
    };
    let insights = open_insights(ctx)?;

    let entry = narrate(entry, language, voice_style, &insights).await?;
    let outcome = store.update(entry.clone())?.wait().await;
    report_push(outcome);

    tracing::info!(
        "Narration ready in {language} ({}), voice style {voice_style}",
        language.speech_code()
    );
    if let Some(text) = &entry.spoken_insight_text {
        println!("{text}");
    }
    Ok(())
}

/// Attach narration of the entry's interpretation in `language`.
pub async fn narrate<B: CompletionBackend>(
    mut entry: LogEntry,
    language: Language,
    voice_style: VoiceStyle,
    insights: &Insights<B>,
) -> Result<LogEntry, CliError> {
    let Some(interpretation) = entry.interpretation.clone() else {
        return Err(CliError::MissingInterpretation(entry.id.to_string()));
    };

    let request = SpokenInsightRequest {
        interpretation,
        source_language: entry.interpretation_language.unwrap_or_default(),
        target_language: language,
        voice_style,
    };
    let text = insights.spoken_insight(&request).await?;
    entry.spoken_insight_text = Some(text);
    entry.spoken_insight_language = Some(language);
    Ok(entry)
}
