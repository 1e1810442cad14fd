//! Entry export in JSON and Markdown.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::LogEntry;

/// File name used when exporting the full collection as JSON.
pub const EXPORT_FILE_NAME: &str = "whisperlog_data.json";
/// File name used for Markdown exports.
pub const MARKDOWN_EXPORT_FILE_NAME: &str = "whisperlog_data.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Fixed export file name for `format`.
#[must_use]
pub const fn export_file_name(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => EXPORT_FILE_NAME,
        ExportFormat::Markdown => MARKDOWN_EXPORT_FILE_NAME,
    }
}

/// Render entries as a pretty-printed JSON array, in the same shape the
/// cache stores them.
pub fn render_json_export(entries: &[LogEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Render entries in Markdown with a frontmatter block each.
#[must_use]
pub fn render_markdown_export(entries: &[LogEntry]) -> String {
    let mut output = String::new();

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", entry.id);
        let _ = writeln!(output, "timestamp: {}", entry.timestamp.to_rfc3339());
        let _ = writeln!(output, "angel_number: \"{}\"", entry.angel_number);
        let _ = writeln!(output, "emotion: {}", entry.emotion);
        let _ = writeln!(output, "activity: {}", entry.activity);
        if let Some(mood) = entry.mood {
            let _ = writeln!(output, "mood: {mood}");
        }
        if let Some(language) = entry.interpretation_language {
            let _ = writeln!(output, "interpretation_language: {language}");
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        let _ = writeln!(output, "# {}", entry.angel_number);

        if let Some(notes) = &entry.notes {
            let _ = writeln!(output);
            let _ = writeln!(output, "{notes}");
        }
        if let Some(interpretation) = &entry.interpretation {
            for (title, text) in interpretation.sections() {
                let _ = writeln!(output);
                let _ = writeln!(output, "## {title}");
                let _ = writeln!(output);
                let _ = writeln!(output, "{text}");
            }
        }
        if let Some(spoken) = &entry.spoken_insight_text {
            let _ = writeln!(output);
            match entry.spoken_insight_language {
                Some(language) => {
                    let _ = writeln!(output, "## Spoken Insight ({language})");
                }
                None => {
                    let _ = writeln!(output, "## Spoken Insight");
                }
            }
            let _ = writeln!(output);
            let _ = writeln!(output, "{spoken}");
        }
    }

    output
}

/// Render entries based on selected export format.
pub fn render_export(entries: &[LogEntry], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(entries),
        ExportFormat::Markdown => Ok(render_markdown_export(entries)),
    }
}
