//! The pipeline-stage contract.
//!
//! A [`Modifier`] transforms one stage's tracks and hovers into the next
//! stage's. Implementations override only what they need; every default is
//! an incremental identity passthrough, so an empty `impl Modifier` is a
//! valid (if pointless) stage. Modifiers communicate with the manager only
//! through their appended output and the save-point interface; they must
//! never call back into the manager's ingestion or chain-mutation entry
//! points from a callback.

use super::save_point::SavePointHolder;
use crate::geometry::{Point, Rect};
use crate::track::{HoverList, Track, TrackList, find_track};

/// A named, polymorphic pipeline stage.
///
/// The manager owns modifiers as `Box<dyn Modifier>`, so a modifier is bound
/// to at most one manager by construction. On insertion the manager calls
/// [`Modifier::on_attach`] then [`Modifier::activate`]; on removal it calls
/// [`Modifier::deactivate`]. None of these are ever self-invoked.
pub trait Modifier {
    /// Human-readable stage name, for logging and chain introspection.
    fn name(&self) -> &str;

    /// Called once when the modifier is inserted into a manager's chain,
    /// before [`Modifier::activate`].
    fn on_attach(&mut self) {}

    /// Called when the stage becomes part of the active chain.
    fn activate(&mut self) {}

    /// Called when the stage is removed from the chain.
    fn deactivate(&mut self) {}

    /// Transforms one input track, appending to `out_tracks`.
    ///
    /// `save_point` describes the furthest-back point the next stage may
    /// still be rewritten; a modifier that wants to keep that right clones
    /// the holder (keeping it locked) and unlocks once its output for the
    /// region is definitive. The default is identity passthrough.
    fn modify_track(
        &mut self,
        track: &Track,
        save_point: &SavePointHolder,
        out_tracks: &mut TrackList,
    ) {
        let _ = save_point;
        passthrough_track(track, out_tracks);
    }

    /// Transforms the whole stage. Default: [`Modifier::modify_track`] per
    /// track.
    fn modify_tracks(
        &mut self,
        tracks: &TrackList,
        save_point: &SavePointHolder,
        out_tracks: &mut TrackList,
    ) {
        for track in tracks {
            self.modify_track(track, save_point, out_tracks);
        }
    }

    /// Transforms one hover position. Hovers carry no history to protect,
    /// so there is no save-point coupling.
    fn modify_hover(&mut self, hover: Point, out_hovers: &mut HoverList) {
        out_hovers.push(hover);
    }

    /// Transforms the stage's hovers. Default: [`Modifier::modify_hover`]
    /// per hover.
    fn modify_hovers(&mut self, hovers: &HoverList, out_hovers: &mut HoverList) {
        for &hover in hovers {
            self.modify_hover(hover, out_hovers);
        }
    }

    /// Bounds of any presentation this stage draws for `track`.
    fn draw_bounds_track(&self, _track: &Track) -> Rect {
        Rect::EMPTY
    }

    /// Bounds of any presentation this stage draws for a hover.
    fn draw_bounds_hover(&self, _hover: Point) -> Rect {
        Rect::EMPTY
    }

    /// Union of this stage's presentation bounds over its input.
    fn draw_bounds(&self, tracks: &TrackList, hovers: &HoverList) -> Rect {
        let mut bounds = Rect::EMPTY;
        for track in tracks {
            bounds = bounds.union(self.draw_bounds_track(track));
        }
        for &hover in hovers {
            bounds = bounds.union(self.draw_bounds_hover(hover));
        }
        bounds
    }

    /// Presentation side effect for one track. No influence on pipeline
    /// data.
    fn draw_track(&self, _track: &Track) {}

    /// Presentation side effect for one hover.
    fn draw_hover(&self, _hover: Point) {}

    /// Draws this stage's presentation over its input.
    fn draw(&self, tracks: &TrackList, hovers: &HoverList) {
        for track in tracks {
            self.draw_track(track);
        }
        for &hover in hovers {
            self.draw_hover(hover);
        }
    }
}

/// Incremental identity passthrough for one track.
///
/// Finds (or creates) the matching output track by `(DeviceId, TouchId)`,
/// mirrors upstream truncation, copies any new samples, and propagates the
/// finished flag. This is both the default modifier behavior and the
/// building block custom modifiers use for the samples they leave untouched.
pub fn passthrough_track(track: &Track, out_tracks: &mut TrackList) {
    let index = match find_track(out_tracks, track.device_id, track.touch_id) {
        Some(index) => index,
        None => {
            out_tracks.push(Track::new(
                track.device_id,
                track.touch_id,
                track.has_pressure,
                track.has_tilt,
            ));
            out_tracks.len() - 1
        }
    };
    let out = &mut out_tracks[index];
    if out.len() > track.len() {
        // upstream rolled back; mirror the truncation (committed samples
        // stay put, the truncate clamps to them)
        out.truncate(track.len());
    }
    if out.len() < track.len() {
        for point in &track.points()[out.len()..] {
            out.push(*point);
        }
    }
    if track.finished() && !out.finished() {
        out.set_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DeviceId, Ticks, TouchId};
    use crate::track::TrackPoint;

    struct Identity;

    impl Modifier for Identity {
        fn name(&self) -> &str {
            "identity"
        }
    }

    fn sample(x: f64, ticks: i64, is_final: bool) -> TrackPoint {
        TrackPoint {
            position: Point::new(x, x),
            screen_position: Point::new(x, x),
            pressure: None,
            tilt: None,
            ticks: Ticks(ticks),
            is_final,
        }
    }

    fn input_track(samples: &[TrackPoint]) -> Track {
        let mut track = Track::new(DeviceId(0), TouchId(1), false, false);
        for &p in samples {
            track.push(p);
        }
        track
    }

    #[test]
    fn default_modifier_is_identity() {
        let mut modifier = Identity;
        let track = input_track(&[sample(1.0, 0, false), sample(2.0, 10, true)]);
        let tracks = vec![track];
        let mut out = TrackList::new();
        let save_point = SavePointHolder::new();
        modifier.modify_tracks(&tracks, &save_point, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points(), tracks[0].points());
        assert!(out[0].finished());
    }

    #[test]
    fn passthrough_appends_only_new_samples() {
        let mut track = input_track(&[sample(1.0, 0, false)]);
        let mut out = TrackList::new();
        passthrough_track(&track, &mut out);
        track.push(sample(2.0, 10, false));
        passthrough_track(&track, &mut out);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0].points(), track.points());
    }

    #[test]
    fn passthrough_mirrors_upstream_truncation() {
        let mut track = input_track(&[
            sample(1.0, 0, false),
            sample(2.0, 10, false),
            sample(3.0, 20, false),
        ]);
        let mut out = TrackList::new();
        passthrough_track(&track, &mut out);
        track.truncate(1);
        passthrough_track(&track, &mut out);
        assert_eq!(out[0].len(), 1);
    }

    #[test]
    fn default_hover_chain_copies_positions() {
        let mut modifier = Identity;
        let hovers = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let mut out = HoverList::new();
        modifier.modify_hovers(&hovers, &mut out);
        assert_eq!(out, hovers);
    }

    #[test]
    fn default_draw_bounds_are_empty() {
        let modifier = Identity;
        let tracks = vec![input_track(&[sample(1.0, 0, false)])];
        let hovers = vec![Point::ZERO];
        assert!(modifier.draw_bounds(&tracks, &hovers).is_empty());
    }
}
