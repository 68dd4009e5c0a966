//! Per-gesture point sequences ("tracks") and hover positions.
//!
//! A [`Track`] is the reconstructed history of one gesture on one device:
//! an append-only sequence of [`TrackPoint`]s keyed by `(DeviceId, TouchId)`.
//! Every pipeline stage owns its own `Track` objects; the stage's committed
//! index marks how far that stage has permanently finalized output.

use crate::geometry::Point;
use crate::input::{DeviceId, Ticks, TouchId};

/// One sample of a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Position in world/tool space (screen position run through the viewer
    /// transforms at ingestion time)
    pub position: Point,
    /// Raw position in screen space
    pub screen_position: Point,
    /// Stylus pressure, when the device reports it
    pub pressure: Option<f64>,
    /// Stylus tilt, when the device reports it
    pub tilt: Option<Point>,
    /// Device timestamp
    pub ticks: Ticks,
    /// Terminal sample of the gesture
    pub is_final: bool,
}

/// An append-only per-gesture point sequence, owned by one pipeline stage.
///
/// The `committed` index is monotonically non-decreasing while the track is
/// alive and never exceeds the sample count; committed points can no longer
/// be rewritten by rollback. Whether pressure/tilt columns exist is decided
/// by the first sample and stays fixed for the life of the track.
#[derive(Debug, Clone)]
pub struct Track {
    /// Device this gesture came from
    pub device_id: DeviceId,
    /// Gesture identity on that device
    pub touch_id: TouchId,
    /// Whether samples carry pressure
    pub has_pressure: bool,
    /// Whether samples carry tilt
    pub has_tilt: bool,
    points: Vec<TrackPoint>,
    committed: usize,
    finished: bool,
}

impl Track {
    /// Creates an empty track. Column flags are fixed for its lifetime.
    pub fn new(
        device_id: DeviceId,
        touch_id: TouchId,
        has_pressure: bool,
        has_tilt: bool,
    ) -> Self {
        Self {
            device_id,
            touch_id,
            has_pressure,
            has_tilt,
            points: Vec::new(),
            committed: 0,
            finished: false,
        }
    }

    /// Whether this track belongs to the given gesture.
    pub fn matches(&self, device_id: DeviceId, touch_id: TouchId) -> bool {
        self.device_id == device_id && self.touch_id == touch_id
    }

    /// Appends a sample, normalizing it to the track's columns.
    ///
    /// A terminal sample also marks the track finished.
    pub fn push(&mut self, mut point: TrackPoint) {
        if !self.has_pressure {
            point.pressure = None;
        }
        if !self.has_tilt {
            point.tilt = None;
        }
        if point.is_final {
            self.finished = true;
        }
        self.points.push(point);
    }

    /// All samples, in ingestion order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no samples have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamp of the most recent sample.
    pub fn last_ticks(&self) -> Option<Ticks> {
        self.points.last().map(|p| p.ticks)
    }

    /// How many leading samples are permanently final for this stage.
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Advances the committed index to `n` (clamped to the sample count).
    ///
    /// The index never decreases; committing behind the current position is
    /// a no-op.
    pub fn commit_to(&mut self, n: usize) {
        let n = n.min(self.points.len());
        if n > self.committed {
            self.committed = n;
        }
    }

    /// Drops the sample tail beyond `n`, clamped so committed samples are
    /// never discarded. Returns the resulting length.
    ///
    /// Truncating away a terminal sample reopens the track.
    pub fn truncate(&mut self, n: usize) -> usize {
        let n = n.max(self.committed);
        if n < self.points.len() {
            self.points.truncate(n);
            if self.finished && !self.points.last().is_some_and(|p| p.is_final) {
                self.finished = false;
            }
        }
        self.points.len()
    }

    /// Whether the terminal sample has been observed (or finish was forced).
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Marks the track finished without appending a sample.
    pub fn set_finished(&mut self) {
        self.finished = true;
    }
}

/// Tracks held by one pipeline stage.
pub type TrackList = Vec<Track>;

/// Hover positions held by one pipeline stage (one per hovering device,
/// no history).
pub type HoverList = Vec<Point>;

/// Index of the track for `(device_id, touch_id)` in `list`, if present.
pub fn find_track(list: &TrackList, device_id: DeviceId, touch_id: TouchId) -> Option<usize> {
    list.iter().position(|t| t.matches(device_id, touch_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, ticks: i64, is_final: bool) -> TrackPoint {
        TrackPoint {
            position: Point::new(x, 0.0),
            screen_position: Point::new(x, 0.0),
            pressure: Some(0.5),
            tilt: None,
            ticks: Ticks(ticks),
            is_final,
        }
    }

    #[test]
    fn push_normalizes_to_track_columns() {
        let mut track = Track::new(DeviceId(0), TouchId(1), false, false);
        track.push(sample(1.0, 0, false));
        assert_eq!(track.points()[0].pressure, None);
    }

    #[test]
    fn terminal_sample_finishes_track() {
        let mut track = Track::new(DeviceId(0), TouchId(1), true, false);
        track.push(sample(1.0, 0, false));
        assert!(!track.finished());
        track.push(sample(2.0, 10, true));
        assert!(track.finished());
    }

    #[test]
    fn committed_index_never_decreases() {
        let mut track = Track::new(DeviceId(0), TouchId(1), true, false);
        for i in 0..5 {
            track.push(sample(i as f64, i, false));
        }
        track.commit_to(3);
        track.commit_to(1);
        assert_eq!(track.committed(), 3);
        track.commit_to(99);
        assert_eq!(track.committed(), 5);
    }

    #[test]
    fn truncate_respects_committed_samples() {
        let mut track = Track::new(DeviceId(0), TouchId(1), true, false);
        for i in 0..5 {
            track.push(sample(i as f64, i, false));
        }
        track.commit_to(2);
        assert_eq!(track.truncate(0), 2);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn truncating_the_terminal_sample_reopens_the_track() {
        let mut track = Track::new(DeviceId(0), TouchId(1), true, false);
        track.push(sample(1.0, 0, false));
        track.push(sample(2.0, 10, true));
        assert!(track.finished());
        track.truncate(1);
        assert!(!track.finished());
    }

    #[test]
    fn find_track_matches_exact_pair() {
        let mut list = TrackList::new();
        list.push(Track::new(DeviceId(0), TouchId(7), false, false));
        list.push(Track::new(DeviceId(1), TouchId(7), false, false));
        assert_eq!(find_track(&list, DeviceId(1), TouchId(7)), Some(1));
        assert_eq!(find_track(&list, DeviceId(2), TouchId(7)), None);
    }
}
