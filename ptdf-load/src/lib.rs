//! ptdf-load library interface
//!
//! Streams the plain text data files into a relational store: section
//! streams feed fact grammars, natural keys become surrogate ids through
//! write-back key caches, and fact rows are written in split-on-overflow
//! batches.

pub mod db;
pub mod error;
pub mod parsers;
pub mod services;
pub mod sources;
pub mod utils;

pub use crate::db::{MemoryStore, SqliteStore, Store, StoreError};
pub use crate::error::{LoadError, LoadResult};
pub use crate::services::{Phase, PipelineOrchestrator, RunOutcome};
