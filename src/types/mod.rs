//! Core data types

pub mod document;

pub use document::{Chunk, DocumentRecord, DocumentStatus};
