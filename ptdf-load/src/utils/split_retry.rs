//! Split-on-overflow bulk writes
//!
//! A batch the store rejects as too large is halved and each half written on
//! its own, recursively. Halving stops at a depth bound: a batch that still
//! overflows at that depth is dropped and reported, never retried forever.

use crate::db::{Row, Store, StoreError, TableSpec};
use futures::future::BoxFuture;
use std::ops::AddAssign;
use thiserror::Error;

/// Result of writing one logical batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub written: usize,
    pub dropped: usize,
    /// Accepted store calls
    pub batches: usize,
    /// Times a batch was halved
    pub splits: usize,
    /// Deepest halving level reached (0 when nothing was split)
    pub split_depth: u32,
}

impl AddAssign for FlushOutcome {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.dropped += other.dropped;
        self.batches += other.batches;
        self.splits += other.splits;
        self.split_depth = self.split_depth.max(other.split_depth);
    }
}

impl FlushOutcome {
    /// Leading rows of the batch that are done with, written or dropped
    pub fn handled(&self) -> usize {
        self.written + self.dropped
    }
}

/// A backend failure part way through a split batch
///
/// Halves before the failing one were already committed; `partial` counts
/// them so the caller can release exactly those rows.
#[derive(Debug, Error)]
#[error("{source} ({} rows already handled)", .partial.handled())]
pub struct SplitError {
    pub partial: FlushOutcome,
    #[source]
    pub source: StoreError,
}

/// Write `rows`, halving on overflow
///
/// `depth` starts at 1 for a fresh batch. Halves are attempted at
/// `depth + 1`; a batch reaching `max_depth` is dropped without another
/// attempt. Rows keep their relative order across halves, so the rows
/// handled before a backend error are always a prefix of `rows`.
pub fn write_with_split<'a>(
    store: &'a dyn Store,
    table: &'a TableSpec,
    rows: &'a [Row],
    depth: u32,
    max_depth: u32,
) -> BoxFuture<'a, Result<FlushOutcome, SplitError>> {
    Box::pin(async move {
        if rows.is_empty() {
            return Ok(FlushOutcome::default());
        }

        if depth >= max_depth {
            tracing::error!(
                table = table.name,
                rows = rows.len(),
                depth,
                "Batch still too large at maximum split depth, rows dropped"
            );
            return Ok(FlushOutcome {
                dropped: rows.len(),
                ..FlushOutcome::default()
            });
        }

        match store.bulk_insert(table, rows).await {
            Ok(()) => Ok(FlushOutcome {
                written: rows.len(),
                batches: 1,
                ..FlushOutcome::default()
            }),
            Err(StoreError::Overflow { reason, .. }) => {
                tracing::warn!(
                    table = table.name,
                    rows = rows.len(),
                    depth,
                    reason = %reason,
                    "Batch rejected as too large, splitting"
                );

                if rows.len() == 1 {
                    tracing::error!(table = table.name, "Single row rejected as too large, dropped");
                    return Ok(FlushOutcome {
                        dropped: 1,
                        ..FlushOutcome::default()
                    });
                }

                let (first, second) = rows.split_at(rows.len() / 2);
                let mut outcome = FlushOutcome {
                    splits: 1,
                    split_depth: 1,
                    ..FlushOutcome::default()
                };

                for half in [first, second] {
                    match write_with_split(store, table, half, depth + 1, max_depth).await {
                        Ok(mut written) => {
                            if written.splits > 0 {
                                written.split_depth += 1;
                            }
                            outcome += written;
                        }
                        Err(mut e) => {
                            outcome += e.partial;
                            e.partial = outcome;
                            return Err(e);
                        }
                    }
                }

                Ok(outcome)
            }
            Err(source) => Err(SplitError {
                partial: FlushOutcome::default(),
                source,
            }),
        }
    })
}
