use chrono::Utc;

use crate::commands::common::{
    entry_to_list_item, format_entry_lines, open_store, CommandContext, EntryListItem,
    OpenStoreMode,
};
use crate::error::CliError;

pub async fn run_list(ctx: &CommandContext, limit: usize, as_json: bool) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entries = store.timeline().into_iter().take(limit).collect::<Vec<_>>();
    let now = Utc::now();

    if as_json {
        let json_items = entries
            .iter()
            .map(|entry| entry_to_list_item(entry, now))
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if entries.is_empty() {
        println!("No sightings logged yet.");
    } else {
        for line in format_entry_lines(&entries, now) {
            println!("{line}");
        }
    }

    Ok(())
}
