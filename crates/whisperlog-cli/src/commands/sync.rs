use std::fmt;

use whisperlog_core::cache::LocalCache;
use whisperlog_core::mirror::RemoteMirror;
use whisperlog_core::store::{PushOutcome, RefreshOutcome};
use whisperlog_core::SyncedEntryStore;

use crate::commands::common::{open_store, CommandContext, OpenStoreMode};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSummary {
    /// The remote collection replaced the local one.
    Pulled { entries: usize },
    /// The remote was empty and received the local collection.
    Pushed { entries: usize },
    /// Neither side has entries.
    Empty,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pulled { entries } => {
                write!(f, "Sync completed: {entries} entries from remote")
            }
            Self::Pushed { entries } => {
                write!(f, "Sync completed: remote was empty, pushed {entries} local entries")
            }
            Self::Empty => f.write_str("Sync completed: nothing to sync"),
        }
    }
}

pub async fn run_sync(ctx: &CommandContext) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::RequireSync).await?;
    let summary = sync_store(&store).await?;
    println!("{summary}");
    Ok(())
}

/// Pull the remote collection, or seed an empty remote from the cache.
pub async fn sync_store<C, M>(store: &SyncedEntryStore<C, M>) -> Result<SyncSummary, CliError>
where
    C: LocalCache + 'static,
    M: RemoteMirror + 'static,
{
    match store.refresh_from_remote().await? {
        RefreshOutcome::Applied { entries } => Ok(SyncSummary::Pulled { entries }),
        RefreshOutcome::RemoteEmpty if store.is_empty() => Ok(SyncSummary::Empty),
        RefreshOutcome::RemoteEmpty => match store.push_current().await {
            PushOutcome::Pushed | PushOutcome::Superseded => Ok(SyncSummary::Pushed {
                entries: store.len(),
            }),
            PushOutcome::Failed => Err(CliError::Sync(
                "could not push local entries to the remote mirror".to_string(),
            )),
            PushOutcome::Skipped => Err(CliError::SyncNotConfigured),
        },
    }
}
