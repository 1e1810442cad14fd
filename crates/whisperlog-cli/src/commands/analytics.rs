use std::fmt::Display;

use whisperlog_core::analytics::{Count, FrequencyReport};

use crate::commands::common::{open_store, CommandContext, OpenStoreMode};
use crate::error::CliError;

pub async fn run_analytics(ctx: &CommandContext, as_json: bool) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let report = FrequencyReport::from_entries(&store.current());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_report_lines(report: &FrequencyReport) -> Vec<String> {
    if report.is_empty() {
        return vec!["No sightings logged yet.".to_string()];
    }

    let mut lines = vec![format!("Total sightings: {}", report.total_entries)];
    push_section(&mut lines, "Top angel numbers", &report.angel_numbers);
    push_section(&mut lines, "Emotions", &report.emotions);
    push_section(&mut lines, "Activities", &report.activities);
    push_section(&mut lines, "Moods", &report.moods);
    lines
}

fn push_section<T: Display>(lines: &mut Vec<String>, title: &str, counts: &[Count<T>]) {
    if counts.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{title}:"));
    for count in counts {
        lines.push(format!("  {:<14} {}", count.value.to_string(), count.count));
    }
}
