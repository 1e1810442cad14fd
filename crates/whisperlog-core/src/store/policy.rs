//! How inbound remote collections combine with local state

use std::fmt;

use crate::models::{EntryCollection, LogEntry};

/// Decides the collection that results from an inbound remote snapshot.
pub trait ConvergencePolicy: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Combine the current local collection with a remote one.
    fn reconcile(&self, local: &[LogEntry], incoming: EntryCollection) -> EntryCollection;
}

/// Last write wins at the granularity of the whole collection.
///
/// The incoming snapshot replaces local state outright, including dropping
/// entries that only exist locally. There is no per-entry merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeCollectionOverwrite;

impl ConvergencePolicy for WholeCollectionOverwrite {
    fn name(&self) -> &'static str {
        "whole-collection overwrite"
    }

    fn reconcile(&self, _local: &[LogEntry], incoming: EntryCollection) -> EntryCollection {
        incoming
    }
}
