use crate::pixel::{PixelTracker, RecordingSink};

/// Build a tracker wired to a fresh in-memory sink.
///
/// The returned sink shares its buffer with the one owned by the tracker, so tests can inspect
/// every call the tracker makes.
pub fn recording_tracker() -> (PixelTracker, RecordingSink) {
    let sink = RecordingSink::new();
    (PixelTracker::new(sink.clone()), sink)
}
