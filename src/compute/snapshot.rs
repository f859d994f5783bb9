//! Shared timelines for concurrent readers.
//!
//! Readers take an immutable [`TimelineSnapshot`] and evaluate it without
//! any locking. Writers edit a private copy and publish it as a whole, so a
//! reader never observes a half-applied mutation.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::Timeline;

/// Immutable, cheaply clonable view of a timeline.
#[derive(Debug, Clone)]
pub struct TimelineSnapshot(Arc<Timeline>);

impl TimelineSnapshot {
    pub fn new(timeline: Timeline) -> Self {
        Self(Arc::new(timeline))
    }

    /// Copy of the snapshot contents for editing.
    pub fn to_timeline(&self) -> Timeline {
        Timeline::clone(&self.0)
    }
}

impl Deref for TimelineSnapshot {
    type Target = Timeline;

    fn deref(&self) -> &Timeline {
        &self.0
    }
}

impl From<Timeline> for TimelineSnapshot {
    fn from(timeline: Timeline) -> Self {
        Self::new(timeline)
    }
}

/// Publication point for a timeline shared between threads.
///
/// The read-write lock is only held to clone or swap the inner `Arc`.
/// Edits happen on a private copy outside it, serialized by `writer`.
#[derive(Debug)]
pub struct TimelineCell {
    current: RwLock<Arc<Timeline>>,
    writer: Mutex<()>,
}

impl TimelineCell {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            current: RwLock::new(Arc::new(timeline)),
            writer: Mutex::new(()),
        }
    }

    /// Latest published snapshot.
    pub fn load(&self) -> TimelineSnapshot {
        TimelineSnapshot(Arc::clone(&*self.current.read()))
    }

    /// Replace the published timeline. Waits for an update in progress.
    pub fn publish(&self, timeline: impl Into<TimelineSnapshot>) {
        let TimelineSnapshot(next) = timeline.into();
        let _writing = self.writer.lock();
        *self.current.write() = next;
    }

    /// Apply `edit` to a copy of the current timeline and publish the
    /// result. Concurrent updates are serialized; each sees the previous
    /// one's result. Readers keep loading the old snapshot meanwhile.
    pub fn update<R>(&self, edit: impl FnOnce(&mut Timeline) -> R) -> R {
        let _writing = self.writer.lock();
        let base = Arc::clone(&*self.current.read());
        let mut draft = Timeline::clone(&base);
        drop(base);

        let result = edit(&mut draft);
        *self.current.write() = Arc::new(draft);
        result
    }
}

impl Default for TimelineCell {
    fn default() -> Self {
        Self::new(Timeline::new(1))
    }
}
