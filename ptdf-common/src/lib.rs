//! # PTDF Common Library
//!
//! Shared code for the plain text data file loader:
//! - Error types
//! - Configuration loading
//! - Database schema and lookup vocabularies
//! - Title and name key grammars
//! - Phonetic codes for fuzzy lookup

pub mod config;
pub mod db;
pub mod error;
pub mod grammar;
pub mod phonetic;

pub use error::{Error, Result};
