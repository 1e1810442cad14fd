use crate::commands::common::{
    open_store, report_push, resolve_entry, CommandContext, OpenStoreMode,
};
use crate::error::CliError;

pub async fn run_delete(ctx: &CommandContext, id: &str) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entry = resolve_entry(&store, id)?;

    let Some(pending) = store.remove(&entry.id)? else {
        return Err(CliError::EntryNotFound(entry.id.to_string()));
    };
    report_push(pending.wait().await);

    println!("Deleted {}", entry.id);
    Ok(())
}
