//! Schema module - Serializable configuration and document types for timelines.

mod config;
mod document;
mod kind;

pub use config::*;
pub use document::*;
pub use kind::*;
