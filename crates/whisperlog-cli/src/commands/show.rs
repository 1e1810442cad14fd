use crate::commands::common::{
    open_store, render_entry_detail, resolve_entry, CommandContext, OpenStoreMode,
};
use crate::error::CliError;

pub async fn run_show(ctx: &CommandContext, id: &str, as_json: bool) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entry = resolve_entry(&store, id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", render_entry_detail(&entry));
    }
    Ok(())
}
