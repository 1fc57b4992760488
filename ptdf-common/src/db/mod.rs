//! Destination database schema and lookup vocabularies

pub mod init;
pub mod vocabulary;

pub use init::*;
