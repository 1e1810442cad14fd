use whisperlog_core::store::{ChangeOrigin, StoreChange};

use crate::commands::common::{open_store, CommandContext, OpenStoreMode};
use crate::error::CliError;

pub async fn run_watch(ctx: &CommandContext) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::RequireSync).await?;
    let mut changes = store.changes();
    let handle = store.start_sync()?;
    println!(
        "Watching {} with {} cached entries (Ctrl-C to stop)",
        store.mirror().describe(),
        store.len()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let change = *changes.borrow_and_update();
                println!("{}", describe_change(&change));
            }
        }
    }

    handle.stop();
    Ok(())
}

pub fn describe_change(change: &StoreChange) -> String {
    let origin = match change.origin {
        ChangeOrigin::Loaded => "cache",
        ChangeOrigin::Local => "local",
        ChangeOrigin::Remote => "remote",
    };
    format!(
        "#{} {origin} change: {} entries",
        change.revision, change.entries
    )
}
