//! Keyline - Keyframe timelines and curve evaluation.
//!
//! This crate stores ordered keyframes of a multi-component value and
//! evaluates the curve through them at arbitrary times, with several
//! interpolation kinds, automatic tangents, output limits and flat
//! extrapolation outside the keyed range.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Interpolation kinds, configuration and JSON documents
//! - `compute`: Point storage, interpolation, derivatives and the `Timeline`
//! - `archive`: Versioned binary `.ktl` archives
//!
//! # Example
//!
//! ```rust
//! use keyline::{
//!     compute::Timeline,
//!     schema::InterpolationKind,
//! };
//!
//! let mut timeline = Timeline::new(2);
//! timeline.add(0.0, [0.0, 1.0], InterpolationKind::Linear);
//! timeline.add(2.0, [10.0, 1.0], InterpolationKind::Linear);
//!
//! let value = timeline.get(0.5);
//! assert_eq!(value.as_slice(), &[2.5, 1.0]);
//!
//! // Flat outside the keyed range
//! assert_eq!(timeline.get(-3.0).as_slice(), &[0.0, 1.0]);
//! ```

pub mod archive;
pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Timeline, TimelineCell, TimelineSnapshot, TimelineStats, ValueVector};
pub use schema::{InterpolationKind, KindRequest, TimelineConfig, TimelineDocument};
