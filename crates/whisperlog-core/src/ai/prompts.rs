//! Prompt templates for the insight flows

use std::fmt::Write as _;

use super::{AffirmationRequest, CompletionRequest, InterpretationRequest, SpokenInsightRequest};
use crate::models::Interpretation;

pub const SPOKEN_INSIGHT_KEY: &str = "spokenInsight";
pub const POLISHED_NOTE_KEY: &str = "polishedNote";
pub const AFFIRMATION_KEY: &str = "affirmation";

fn system(role: &str, keys: &[&str]) -> String {
    let keys = keys
        .iter()
        .map(|key| format!("\"{key}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{role}\nAnswer with a single JSON object containing exactly these string keys: {keys}. \
         Do not wrap the JSON in markdown."
    )
}

pub fn interpretation(request: &InterpretationRequest) -> CompletionRequest {
    let keys = Interpretation::FIELDS.to_vec();
    let notes = request.notes.as_deref().unwrap_or("(none)");
    let language = request.target_language;

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Interpret the angel number {} for someone who felt {} while {}.",
        request.number,
        request.emotion,
        request.activity.as_str().to_lowercase()
    );
    let _ = writeln!(prompt, "Their notes about the sighting: \"{notes}\"");
    let _ = writeln!(prompt, "Write every section in {language}.");
    prompt.push_str(
        "Be warm and insightful, poetic where it helps, but keep the guidance practical.\n\
         Sections:\n\
         - theMessage: the core meaning and why it matters now (2-4 sentences)\n\
         - spiritualSignificance: the deeper spiritual context (2-4 sentences)\n\
         - ancientWisdom: links to numerology, Vedic or other traditions (2-4 sentences)\n\
         - context: guidance tailored to their emotion, activity and notes (2-4 sentences)\n\
         - quote: a fitting inspirational quote with attribution\n\
         - metaphor: one vivid image that makes the message memorable (1-3 sentences)\n\
         - reflectionQuestion: one open question for introspection\n",
    );

    CompletionRequest {
        system: system(
            "You are a wise and friendly spiritual mentor versed in numerology, astrology and \
             ancient traditions.",
            &keys,
        ),
        prompt,
        expected_keys: keys,
    }
}

pub fn spoken_insight(request: &SpokenInsightRequest) -> CompletionRequest {
    let keys = vec![SPOKEN_INSIGHT_KEY];
    let mut prompt = format!(
        "Prepare the reading below to be spoken aloud. It was written in {}.\n\n",
        request.source_language
    );
    for (title, text) in request.interpretation.sections() {
        let _ = writeln!(prompt, "{title}: {text}");
    }
    let _ = write!(
        prompt,
        "\nSpeak in {language} with a {style} tone. Translate the message, spiritual \
         significance, context and reflection question into {language}, condensing long \
         passages so it stays natural to listen to. Return only the text to be spoken.\n",
        language = request.target_language,
        style = request.voice_style,
    );

    CompletionRequest {
        system: system("You are a calm spiritual guide narrating readings.", &keys),
        prompt,
        expected_keys: keys,
    }
}

pub fn polish_note(raw: &str) -> CompletionRequest {
    let keys = vec![POLISHED_NOTE_KEY];
    let prompt = format!(
        "Edit the note below, which may come from dictation. Fix grammar, improve clarity \
         and tighten wording while keeping its meaning intact. Do not add information, \
         greetings or commentary.\n\nNote:\n\"{raw}\"\n"
    );

    CompletionRequest {
        system: system("You are a careful copy editor.", &keys),
        prompt,
        expected_keys: keys,
    }
}

pub fn daily_affirmation(request: &AffirmationRequest) -> CompletionRequest {
    let keys = vec![AFFIRMATION_KEY];
    let events = request
        .astrological_events
        .as_deref()
        .unwrap_or("not provided");
    let prompt = format!(
        "Recent journal entries:\n{logged}\n\nToday's date: {date}\nAstrological events: \
         {events}\n\nWrite a personal, encouraging affirmation of one to three sentences that \
         reflects these entries, drawing on Vedic wisdom where it fits. Start directly with \
         the affirmation itself.\n",
        logged = request.logged_data,
        date = request.current_date.format("%Y-%m-%d"),
    );

    CompletionRequest {
        system: system(
            "You are a spiritual guide who writes short daily affirmations.",
            &keys,
        ),
        prompt,
        expected_keys: keys,
    }
}
