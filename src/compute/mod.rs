//! Compute module - Storage and evaluation of keyframe timelines.

mod derivative;
mod interpolation;
mod limit;
mod projection;
mod sampling;
mod snapshot;
mod store;
mod time_key;
mod timeline;
mod vector;

pub use derivative::*;
pub use interpolation::*;
pub use limit::*;
pub use projection::*;
pub use sampling::*;
pub use snapshot::*;
pub use store::*;
pub use time_key::*;
pub use timeline::*;
pub use vector::*;
