//! Loader services
//!
//! - `section_stream`: data file reading
//! - `key_cache`: surrogate ids for title, person and alias title keys
//! - `batch_writer`: buffered fact rows
//! - `pipeline_orchestrator`: phase sequencing
//! - `shutdown`: interrupt handling and the final cache drain

pub mod batch_writer;
pub mod key_cache;
pub mod pipeline_orchestrator;
pub mod section_stream;
pub mod shutdown;

pub use batch_writer::{BatchWriter, WriterStats};
pub use key_cache::{CacheStats, KeyCache, KeyCaches};
pub use pipeline_orchestrator::{Phase, PhaseStats, PipelineOrchestrator, RunOutcome, RunStatistics};
pub use section_stream::{LineStream, Section};
pub use shutdown::{spawn_interrupt_listener, ShutdownGuard, ShutdownMode};
