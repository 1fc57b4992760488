//! Phase 12: FINAL FLUSH
//!
//! Writes whatever the key caches still hold. Runs the one shutdown drain,
//! so an interrupt arriving afterwards has nothing left to do.

use super::{PhaseStats, PipelineOrchestrator};
use crate::error::LoadResult;
use crate::services::shutdown::ShutdownMode;

impl PipelineOrchestrator {
    pub(super) async fn phase_final_flush(&mut self) -> LoadResult<PhaseStats> {
        let mut stats = PhaseStats::default();
        if let Some(outcome) = self.shutdown.drain(&mut self.caches, ShutdownMode::Completed).await? {
            stats.add_flush(&outcome);
        }
        Ok(stats)
    }
}
