//! Utility modules for ptdf-load

pub mod split_retry;

pub use split_retry::{write_with_split, FlushOutcome, SplitError};
