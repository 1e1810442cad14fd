use chrono::Local;
use whisperlog_core::affirmation::{cached_affirmation, daily_affirmation};

use crate::commands::common::{open_insights, open_store, CommandContext, OpenStoreMode};
use crate::error::CliError;

pub async fn run_affirmation(ctx: &CommandContext, refresh: bool) -> Result<(), CliError> {
    let today = Local::now().date_naive();
    let store = open_store(ctx, OpenStoreMode::Standard).await?;

    if !refresh {
        if let Some(cached) = cached_affirmation(store.cache(), today)? {
            println!("{}", cached.text);
            return Ok(());
        }
    }

    let insights = open_insights(ctx)?;
    let affirmation =
        daily_affirmation(store.cache(), &insights, &store.current(), today, refresh).await?;
    println!("{}", affirmation.text);
    Ok(())
}
