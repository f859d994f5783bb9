//! Binary archives of keyframe timelines.
//!
//! # File Format
//!
//! The `.ktl` (keyline timeline) format stores every point of a timeline
//! exactly, tangents included:
//!
//! ```text
//! Header (32 bytes):
//!   Magic: "KTLN" (4 bytes)
//!   Version: u16
//!   Flags: u16 (compression, limit presence)
//!   Dimensions: u32
//!   Point count: u64
//!   Reserved: 12 bytes
//!
//! Kind table:
//!   Count: u8
//!   Per entry: name length u8, UTF-8 persistent name
//!
//! Limits (dimensions * 8 bytes each, only when flagged):
//!   Lower limit, then upper limit
//!
//! Point block:
//!   Length: u64
//!   Records, optionally LZ4 compressed:
//!     Kind index u8, time f64, value f64 * dimensions, tangent f64 * dimensions
//! ```
//!
//! All numbers are little-endian.

mod format;
mod reader;
mod writer;

pub use format::{
    ARCHIVE_MAGIC, ARCHIVE_VERSION, ArchiveFlags, ArchiveHeader, CompressionType, record_size,
};
pub use reader::{load_file, read_timeline};
pub use writer::{ArchiveStats, save_file, write_timeline};
