//! Shutdown: interrupt listening and the final drain of the key caches
//!
//! Normal completion and an interrupt both end in [`ShutdownGuard::drain`],
//! which runs at most once per guard.

use crate::db::StoreError;
use crate::services::key_cache::KeyCaches;
use crate::utils::FlushOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// All phases ran; store errors are fatal
    Completed,
    /// Best effort; store errors are logged and swallowed
    Interrupted,
}

#[derive(Debug, Default)]
pub struct ShutdownGuard {
    started: AtomicBool,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for the first caller only
    pub fn begin(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Flush every key cache, titles first
    ///
    /// Returns `Ok(None)` when a drain already ran.
    pub async fn drain(&self, caches: &mut KeyCaches, mode: ShutdownMode) -> Result<Option<FlushOutcome>, StoreError> {
        if !self.begin() {
            info!("Shutdown already in progress, ignoring");
            return Ok(None);
        }

        info!(
            ?mode,
            titles = caches.titles.pending_len(),
            persons = caches.persons.pending_len(),
            alias_titles = caches.alias_titles.pending_len(),
            "Flushing key caches"
        );

        let outcome = match mode {
            ShutdownMode::Completed => {
                let mut outcome = caches.flush_referenced().await?;
                outcome += caches.alias_titles.flush().await?;
                outcome
            }
            ShutdownMode::Interrupted => drain_best_effort(caches).await,
        };

        info!(
            written = outcome.written,
            dropped = outcome.dropped,
            still_pending = caches.pending_len(),
            "Key caches flushed"
        );
        Ok(Some(outcome))
    }
}

/// Flush each cache on its own, logging failures instead of stopping
///
/// Alias titles point at title ids, so they are only flushed when the
/// titles went out.
async fn drain_best_effort(caches: &mut KeyCaches) -> FlushOutcome {
    let mut outcome = FlushOutcome::default();

    let titles = caches.titles.flush().await;
    let titles_written = titles.is_ok();
    absorb(&mut outcome, "titles", titles, caches.titles.pending_len());

    let persons = caches.persons.flush().await;
    absorb(&mut outcome, "persons", persons, caches.persons.pending_len());

    if titles_written {
        let aliases = caches.alias_titles.flush().await;
        absorb(&mut outcome, "alias titles", aliases, caches.alias_titles.pending_len());
    } else if caches.alias_titles.pending_len() > 0 {
        error!(
            lost = caches.alias_titles.pending_len(),
            "Alias titles not flushed, their titles could not be written"
        );
    }

    outcome
}

fn absorb(total: &mut FlushOutcome, cache: &str, result: Result<FlushOutcome, StoreError>, pending: usize) {
    match result {
        Ok(outcome) => *total += outcome,
        Err(e) => error!(cache, lost = pending, error = %e, "Flush on interrupt failed, pending keys lost"),
    }
}

/// Cancel `token` on the first Ctrl+C (or SIGTERM); later signals are
/// only logged
pub fn spawn_interrupt_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = wait_for_signal().await {
                error!(error = %e, "Failed to install signal handler");
                return;
            }

            if token.is_cancelled() {
                warn!("Interrupt already received, still flushing");
            } else {
                info!("Received interrupt, flushing pending keys before exit");
                token.cancel();
            }
        }
    })
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            received = signal::ctrl_c() => received,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use ptdf_common::config::LoaderConfig;
    use std::sync::Arc;

    #[test]
    fn test_guard_is_one_shot() {
        let guard = ShutdownGuard::new();
        assert!(!guard.has_started());
        assert!(guard.begin());
        assert!(!guard.begin());
        assert!(guard.has_started());
    }

    #[tokio::test]
    async fn test_interrupt_swallows_store_errors() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = KeyCaches::new(store.clone(), &LoaderConfig::default());
        caches.titles.resolve("Film (2000)").await.unwrap();
        store.fail_table("title");

        let guard = ShutdownGuard::new();
        let outcome = guard.drain(&mut caches, ShutdownMode::Interrupted).await.unwrap().unwrap();
        assert_eq!(outcome.written, 0);
        assert_eq!(caches.titles.pending_len(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_flushes_persons_when_titles_fail() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = KeyCaches::new(store.clone(), &LoaderConfig::default());
        let movie = caches.titles.resolve("Film (2000)").await.unwrap();
        caches.persons.resolve("Parr, Helen").await.unwrap();
        caches.assign_alias_title("Filme (2000)", movie, None).await.unwrap();
        store.fail_table("title");

        let guard = ShutdownGuard::new();
        let outcome = guard.drain(&mut caches, ShutdownMode::Interrupted).await.unwrap().unwrap();

        assert_eq!(outcome.written, 1);
        assert_eq!(store.row_count("name"), 1);
        assert_eq!(caches.persons.pending_len(), 0);
        // aliases would point at a title that is not in the store
        assert_eq!(store.row_count("aka_title"), 0);
    }

    #[tokio::test]
    async fn test_completed_propagates_store_errors() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = KeyCaches::new(store.clone(), &LoaderConfig::default());
        caches.persons.resolve("Parr, Helen").await.unwrap();
        store.fail_table("name");

        let guard = ShutdownGuard::new();
        assert!(guard.drain(&mut caches, ShutdownMode::Completed).await.is_err());
    }
}
