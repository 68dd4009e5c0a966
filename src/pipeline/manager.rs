//! The pipeline orchestrator.
//!
//! [`InputManager`] owns the per-stage track/hover arrays, the modifier
//! chain, and the viewer-derived coordinate transforms. It ingests raw
//! device samples into stage 0, walks the modifier chain to derive the
//! later stages, coordinates rollback and permanent commits through save
//! points, and dispatches presentation callbacks.
//!
//! Everything here is single-threaded and synchronous. Modifier callbacks
//! must not re-enter the manager's ingestion or chain-mutation entry points.

use super::modifier::Modifier;
use super::save_point::SavePointHolder;
use crate::config::ManagerConfig;
use crate::geometry::{Affine, Point, Rect};
use crate::input::{Button, DeviceId, InputState, Key, Ticks, TouchId};
use crate::track::{HoverList, Track, TrackList, TrackPoint, find_track};
use crate::viewer::{Transforms, Viewer};
use std::cell::RefCell;
use std::collections::HashMap;

/// One pending checkpoint: the manager's holder plus the sample counts each
/// stage's tracks had when the point was reserved.
///
/// A track missing from a stage's map was born after the point and counts
/// as mark 0 (its whole history may still be rewritten).
struct SavePointEntry {
    holder: SavePointHolder,
    marks: Vec<HashMap<(DeviceId, TouchId), usize>>,
}

/// Orchestrator for ingestion, pipeline evaluation, rollback/replay, and
/// drawing dispatch.
///
/// Stage arrays always satisfy
/// `tracks.len() == hovers.len() == modifier count + 1`; stage 0 holds raw
/// ingested gestures and the last stage is what the consuming tool reads.
pub struct InputManager {
    /// Current device/key/button states and tick horizons
    pub state: InputState,
    config: ManagerConfig,
    viewer: Option<Box<dyn Viewer>>,
    transforms: RefCell<Option<Transforms>>,
    modifiers: Vec<Box<dyn Modifier>>,
    tracks: Vec<TrackList>,
    hovers: Vec<HoverList>,
    save_points: Vec<SavePointEntry>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a manager with default configuration and no modifiers.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Creates a manager with the given configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            state: InputState::new(),
            config,
            viewer: None,
            transforms: RefCell::new(None),
            modifiers: Vec::new(),
            tracks: vec![TrackList::new()],
            hovers: vec![HoverList::new()],
            save_points: Vec::new(),
        }
    }

    fn check_stage_invariant(&self) {
        debug_assert!(
            self.tracks.len() == self.modifiers.len() + 1
                && self.hovers.len() == self.modifiers.len() + 1,
            "stage array lengths diverged from modifier count"
        );
    }

    // ========================================================================
    // Viewer and coordinate transforms
    // ========================================================================

    /// Attaches (or detaches) the viewer collaborator. Invalidates the
    /// transform cache; transforms are recomputed on next access.
    pub fn set_viewer(&mut self, viewer: Option<Box<dyn Viewer>>) {
        self.viewer = viewer;
        self.transforms.replace(None);
        log::debug!("Viewer changed; transform cache invalidated");
    }

    /// Re-checks the viewer's DPI scale, invalidating cached transforms when
    /// it changed. Hosts call this on output/scale change notifications.
    pub fn update_dpi_scale(&self) {
        let Some(viewer) = &self.viewer else { return };
        let cached = self.transforms.borrow().as_ref().map(|t| t.dpi_scale);
        if let Some(scale) = cached {
            if scale != viewer.dpi_scale() {
                self.transforms.replace(None);
                log::debug!("DPI scale changed; transform cache invalidated");
            }
        }
    }

    fn transforms(&self) -> Transforms {
        let mut cache = self.transforms.borrow_mut();
        *cache.get_or_insert_with(|| match &self.viewer {
            Some(viewer) => Transforms::capture(viewer.as_ref()),
            None => Transforms::identity(),
        })
    }

    /// Current DPI scale (identity when no viewer is attached).
    pub fn dpi_scale(&self) -> Point {
        self.transforms().dpi_scale
    }

    /// Tool-space to world-space transform.
    pub fn tool_to_world(&self) -> Affine {
        self.transforms().tool_to_world
    }

    /// World-space to tool-space transform.
    pub fn world_to_tool(&self) -> Affine {
        self.transforms().world_to_tool
    }

    /// World-space to screen-space transform.
    pub fn world_to_screen(&self) -> Affine {
        self.transforms().world_to_screen
    }

    /// Screen-space to world-space transform.
    pub fn screen_to_world(&self) -> Affine {
        self.transforms().screen_to_world
    }

    /// Composed tool-space to screen-space transform.
    pub fn tool_to_screen(&self) -> Affine {
        self.world_to_screen() * self.tool_to_world()
    }

    /// Composed screen-space to tool-space transform.
    pub fn screen_to_tool(&self) -> Affine {
        self.world_to_tool() * self.screen_to_world()
    }

    // ========================================================================
    // Event ingestion
    // ========================================================================

    fn accepts_device_ticks(&self, device_id: DeviceId, ticks: Ticks) -> bool {
        match self.state.last_ticks(device_id) {
            Some(last) if self.config.accept_equal_ticks => ticks >= last,
            Some(last) => ticks > last,
            None => true,
        }
    }

    fn accepts_key_ticks(&self, ticks: Ticks) -> bool {
        match self.state.last_key_ticks() {
            Some(last) if self.config.accept_equal_ticks => ticks >= last,
            Some(last) => ticks > last,
            None => true,
        }
    }

    /// Allocates a touch id for gestures that arrive without one (e.g. a
    /// mouse drag presented as a touch).
    pub fn gen_touch_id(&mut self) -> TouchId {
        self.state.gen_touch_id()
    }

    /// Ingests one gesture sample into stage 0.
    ///
    /// Finds the live track for `(device_id, touch_id)` or starts one; the
    /// first sample decides whether the track carries pressure/tilt columns.
    /// The screen position is converted to world space through the cached
    /// viewer transforms. Events with ticks behind the device's last
    /// accepted tick are rejected to preserve causal order; a `is_final`
    /// sample marks the track for completion, but it stays in stage 0 until
    /// drained by [`InputManager::finish_tracks`].
    #[allow(clippy::too_many_arguments)]
    pub fn track_event(
        &mut self,
        device_id: DeviceId,
        touch_id: TouchId,
        screen_position: Point,
        pressure: Option<f64>,
        tilt: Option<Point>,
        is_final: bool,
        ticks: Ticks,
    ) {
        if !self.accepts_device_ticks(device_id, ticks) {
            log::debug!(
                "Rejecting stale track event (device {device_id:?}, ticks {ticks:?})"
            );
            return;
        }
        self.state.observe_ticks(device_id, ticks);

        let position = self.screen_to_world().apply(screen_position);
        let default_pressure = self.config.default_pressure;
        let index = match find_track(&self.tracks[0], device_id, touch_id) {
            Some(index) => index,
            None => {
                log::debug!(
                    "Starting track (device {device_id:?}, touch {touch_id:?}, \
                     pressure: {}, tilt: {})",
                    pressure.is_some(),
                    tilt.is_some()
                );
                self.tracks[0].push(Track::new(
                    device_id,
                    touch_id,
                    pressure.is_some(),
                    tilt.is_some(),
                ));
                self.tracks[0].len() - 1
            }
        };
        let track = &mut self.tracks[0][index];
        if track.finished() {
            // sample arrived after the terminal one; resolve locally
            log::debug!("Ignoring sample for finished track (touch {touch_id:?})");
            return;
        }
        let pressure = pressure.or_else(|| track.has_pressure.then_some(default_pressure));
        track.push(TrackPoint {
            position,
            screen_position,
            pressure,
            tilt,
            ticks,
            is_final,
        });
    }

    /// Marks the live track for `(device_id, touch_id)` finished without
    /// appending a sample. Unknown pairs degrade to "no matching track".
    pub fn track_event_finish(&mut self, device_id: DeviceId, touch_id: TouchId) {
        if let Some(index) = find_track(&self.tracks[0], device_id, touch_id) {
            self.tracks[0][index].set_finished();
        }
    }

    /// Applies a key press/release to [`InputState`], under the same
    /// configured tick-ordering policy as every other event class. Returns
    /// whether the event was accepted.
    pub fn key_event(&mut self, press: bool, key: Key, ticks: Ticks) -> bool {
        if !self.accepts_key_ticks(ticks) {
            log::debug!("Rejecting stale key event ({key:?}, ticks {ticks:?})");
            return false;
        }
        self.state.key_event(press, key, ticks)
    }

    /// Applies a button press/release to [`InputState`], under the same
    /// configured tick-ordering policy as every other event class. Returns
    /// whether the event was accepted.
    pub fn button_event(
        &mut self,
        press: bool,
        device_id: DeviceId,
        button: Button,
        ticks: Ticks,
    ) -> bool {
        if !self.accepts_device_ticks(device_id, ticks) {
            log::debug!("Rejecting stale button event ({button:?}, ticks {ticks:?})");
            return false;
        }
        self.state.button_event(press, device_id, button, ticks)
    }

    /// Replaces stage-0 hover positions and cascades them through the
    /// modifier chain immediately (hovers carry no history, so there is
    /// nothing to replay later).
    pub fn hover_event(&mut self, hovers: HoverList) {
        self.check_stage_invariant();
        self.hovers[0] = hovers;
        for k in 0..self.modifiers.len() {
            let (inputs, outputs) = self.hovers.split_at_mut(k + 1);
            let out = &mut outputs[0];
            out.clear();
            self.modifiers[k].modify_hovers(&inputs[k], out);
        }
    }

    /// Host hook for double-click gestures, under the usual tick discipline.
    ///
    /// The pipeline has no double-click semantics of its own; an accepted
    /// event only advances the device's tick horizon. Returns whether the
    /// event was accepted.
    pub fn double_click_event(&mut self, device_id: DeviceId, ticks: Ticks) -> bool {
        if !self.accepts_device_ticks(device_id, ticks) {
            return false;
        }
        self.state.observe_ticks(device_id, ticks);
        true
    }

    /// Updates the input-method composition state. `commit` is surfaced to
    /// the consuming tool by the host; the pipeline only tracks the preedit.
    pub fn text_event(&mut self, preedit: Option<String>, commit: Option<String>) {
        if let Some(text) = &commit {
            log::trace!("Text commit ({} chars)", text.chars().count());
        }
        self.state.set_preedit(preedit);
    }

    /// The cursor entered the consuming view.
    pub fn enter_event(&mut self) {
        self.state.set_cursor_inside(true);
    }

    /// The cursor left the consuming view; hover positions become stale and
    /// are dropped from every stage.
    pub fn leave_event(&mut self) {
        self.state.set_cursor_inside(false);
        for hovers in &mut self.hovers {
            hovers.clear();
        }
    }

    /// Recovery path for focus loss or abrupt session interruption:
    /// releases every pressed key and button and marks every open track
    /// finished. The releases bypass the tick-ordering checks, so recovery
    /// succeeds even when `ticks` is behind a device's horizon; horizons
    /// only advance. The next [`InputManager::finish_tracks`] drains the
    /// finished tracks.
    pub fn release_all_event(&mut self, ticks: Ticks) {
        log::debug!("Releasing all inputs");
        for (device_id, _) in self.state.pressed_buttons() {
            self.state.observe_ticks(device_id, ticks);
        }
        self.state.release_all();
        for track in &mut self.tracks[0] {
            if !track.finished() {
                track.set_finished();
            }
        }
    }

    // ========================================================================
    // Pipeline evaluation
    // ========================================================================

    /// Walks the modifier chain, deriving each stage from the previous one.
    ///
    /// A fresh save point is reserved for the pass and handed to every
    /// modifier as the furthest-back point the next stage may still be
    /// rewritten. After the walk, output up to every leading free save
    /// point is permanently committed. A modifier that shrank its output
    /// triggers a ledger rollback; the replay of the affected range is the
    /// forward walk itself, re-run from already-stored upstream samples.
    /// Host events are never re-ingested.
    pub fn process_tracks(&mut self) {
        self.check_stage_invariant();
        if self.modifiers.is_empty() {
            return;
        }
        let idle =
            self.save_points.is_empty() && self.tracks.iter().all(|list| list.is_empty());
        if idle {
            return;
        }

        // the pass holder keeps the new point locked while the stages run;
        // the ledger keeps an unlocked reference for commit bookkeeping
        let pass_holder = SavePointHolder::create(false);
        let mut ledger_holder = pass_holder.clone();
        ledger_holder.unlock();
        self.push_save_point(ledger_holder);

        for k in 0..self.modifiers.len() {
            {
                let (inputs, outputs) = self.tracks.split_at_mut(k + 1);
                self.modifiers[k].modify_tracks(&inputs[k], &pass_holder, &mut outputs[0]);
            }
            self.paint_rollback_to(k + 1);
        }

        // the pass has reached concrete positions; dropping the pass holder
        // releases the manager's own lock (modifiers that cloned the holder
        // keep theirs)
        pass_holder.mark_available();
        drop(pass_holder);

        self.paint_tracks();
    }

    /// Records a save point at the current history boundary: the ledger
    /// holder plus each stage's per-track sample counts.
    fn push_save_point(&mut self, holder: SavePointHolder) {
        let marks = self
            .tracks
            .iter()
            .map(|list| {
                list.iter()
                    .map(|t| ((t.device_id, t.touch_id), t.len()))
                    .collect()
            })
            .collect();
        self.save_points.push(SavePointEntry { holder, marks });
        if self.save_points.len() > self.config.max_pending_save_points {
            log::warn!(
                "{} save points pending (cap {}); a modifier may have leaked a locked holder",
                self.save_points.len(),
                self.config.max_pending_save_points
            );
        }
    }

    /// Re-synchronizes the save-point ledger after stage `stage` may have
    /// shrunk: marks beyond a track's current length are pulled back so a
    /// later commit cannot finalize samples that no longer exist. Committed
    /// samples were never truncated in the first place ([`Track::truncate`]
    /// clamps to the committed index).
    fn paint_rollback_to(&mut self, stage: usize) {
        for entry in &mut self.save_points {
            debug_assert_eq!(entry.marks.len(), self.tracks.len());
            let map = &mut entry.marks[stage];
            for track in &self.tracks[stage] {
                if let Some(mark) = map.get_mut(&(track.device_id, track.touch_id)) {
                    if *mark > track.len() {
                        log::trace!(
                            "Rolled back stage {stage} mark for touch {:?}: {} -> {}",
                            track.touch_id,
                            *mark,
                            track.len()
                        );
                        *mark = track.len();
                    }
                }
            }
        }
    }

    /// Commits output through every leading free save point.
    fn paint_tracks(&mut self) {
        while !self.save_points.is_empty() && self.save_points[0].holder.is_free() {
            let entry = self.save_points.remove(0);
            self.paint_apply(&entry);
        }
    }

    /// Advances every stage's committed indices to the counts recorded at a
    /// released save point. Content behind a committed index is final
    /// forever.
    fn paint_apply(&mut self, entry: &SavePointEntry) {
        debug_assert_eq!(entry.marks.len(), self.tracks.len());
        for (stage, list) in self.tracks.iter_mut().enumerate() {
            let map = &entry.marks[stage];
            for track in list.iter_mut() {
                let mark = map
                    .get(&(track.device_id, track.touch_id))
                    .copied()
                    .unwrap_or(0);
                track.commit_to(mark);
            }
        }
    }

    /// Drains finished tracks.
    ///
    /// Runs one more pipeline pass so every stage sees pending terminal
    /// samples, then removes a track from all stages, but only when every
    /// stage's counterpart reports finished, so no modifier loses input it
    /// has not consumed. Tracks a modifier is still holding back stay for a
    /// later call.
    pub fn finish_tracks(&mut self) {
        self.process_tracks();
        let keys: Vec<(DeviceId, TouchId)> = self.tracks[0]
            .iter()
            .filter(|t| t.finished())
            .map(|t| (t.device_id, t.touch_id))
            .collect();
        for (device_id, touch_id) in keys {
            let all_finished = self.tracks.iter().all(|list| {
                match find_track(list, device_id, touch_id) {
                    Some(index) => list[index].finished(),
                    // this stage never produced a counterpart
                    None => true,
                }
            });
            if !all_finished {
                log::debug!("Track (touch {touch_id:?}) still propagating; not drained");
                continue;
            }
            for list in &mut self.tracks {
                if let Some(index) = find_track(list, device_id, touch_id) {
                    list.remove(index);
                }
            }
            for entry in &mut self.save_points {
                for map in &mut entry.marks {
                    map.remove(&(device_id, touch_id));
                }
            }
            log::debug!("Drained track (device {device_id:?}, touch {touch_id:?})");
        }
        if self.tracks.iter().all(|list| list.is_empty()) {
            // nothing left for pending save points to guard
            self.save_points.clear();
        }
    }

    /// Clears all tracks, hovers, and pending save points, keeping the
    /// modifier chain and input state.
    pub fn reset(&mut self) {
        log::debug!("Resetting pipeline state");
        for list in &mut self.tracks {
            list.clear();
        }
        for list in &mut self.hovers {
            list.clear();
        }
        self.save_points.clear();
    }

    /// Whether any stage holds live tracks or a checkpoint is pending.
    pub fn is_active(&self) -> bool {
        !self.save_points.is_empty() || self.tracks.iter().any(|list| !list.is_empty())
    }

    // ========================================================================
    // Stage accessors
    // ========================================================================

    /// Raw ingested tracks (stage 0).
    pub fn input_tracks(&self) -> &TrackList {
        &self.tracks[0]
    }

    /// Fully transformed tracks (the last stage), read by the consuming
    /// tool.
    pub fn output_tracks(&self) -> &TrackList {
        &self.tracks[self.tracks.len() - 1]
    }

    /// Raw hover positions (stage 0).
    pub fn input_hovers(&self) -> &HoverList {
        &self.hovers[0]
    }

    /// Fully transformed hover positions (the last stage).
    pub fn output_hovers(&self) -> &HoverList {
        &self.hovers[self.hovers.len() - 1]
    }

    // ========================================================================
    // Chain mutation
    // ========================================================================

    /// Number of active modifiers.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// The modifier at `index`.
    pub fn modifier(&self, index: usize) -> &dyn Modifier {
        self.modifiers[index].as_ref()
    }

    /// Index of the first modifier with the given name.
    pub fn find_modifier(&self, name: &str) -> Option<usize> {
        self.modifiers.iter().position(|m| m.name() == name)
    }

    /// Inserts a modifier at `index`, growing every stage array by one slot
    /// and running the attach lifecycle (`on_attach`, then `activate`).
    ///
    /// `index` beyond the current chain length is a precondition violation.
    pub fn insert_modifier(&mut self, index: usize, modifier: Box<dyn Modifier>) {
        debug_assert!(index <= self.modifiers.len(), "modifier index out of range");
        let index = index.min(self.modifiers.len());
        log::debug!("Attaching modifier '{}' at stage {}", modifier.name(), index);
        self.modifiers.insert(index, modifier);
        self.tracks.insert(index + 1, TrackList::new());
        self.hovers.insert(index + 1, HoverList::new());
        for entry in &mut self.save_points {
            entry.marks.insert(index + 1, HashMap::new());
        }
        let modifier = &mut self.modifiers[index];
        modifier.on_attach();
        modifier.activate();
        self.check_stage_invariant();
    }

    /// Appends a modifier at the end of the chain.
    pub fn add_modifier(&mut self, modifier: Box<dyn Modifier>) {
        self.insert_modifier(self.modifiers.len(), modifier);
    }

    /// Removes and returns the modifier at `index`, running `deactivate`
    /// and shrinking every stage array.
    pub fn remove_modifier(&mut self, index: usize) -> Box<dyn Modifier> {
        self.modifiers[index].deactivate();
        let modifier = self.modifiers.remove(index);
        self.tracks.remove(index + 1);
        self.hovers.remove(index + 1);
        for entry in &mut self.save_points {
            entry.marks.remove(index + 1);
        }
        log::debug!("Detached modifier '{}'", modifier.name());
        self.check_stage_invariant();
        modifier
    }

    /// Removes every modifier, back to front.
    pub fn clear_modifiers(&mut self) {
        while !self.modifiers.is_empty() {
            self.remove_modifier(self.modifiers.len() - 1);
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Unions every modifier's draw bounds over its input stage. Read-only.
    pub fn calc_draw_bounds(&self) -> Rect {
        self.check_stage_invariant();
        let mut bounds = Rect::EMPTY;
        for (k, modifier) in self.modifiers.iter().enumerate() {
            bounds = bounds.union(modifier.draw_bounds(&self.tracks[k], &self.hovers[k]));
        }
        bounds
    }

    /// Dispatches every modifier's draw callbacks over its input stage.
    /// Read-only with respect to pipeline state.
    pub fn draw(&self) {
        self.check_stage_invariant();
        for (k, modifier) in self.modifiers.iter().enumerate() {
            modifier.draw(&self.tracks[k], &self.hovers[k]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;

    impl Modifier for Identity {
        fn name(&self) -> &str {
            "identity"
        }
    }

    fn feed(manager: &mut InputManager, touch: u64, xs: &[(f64, i64, bool)]) {
        for &(x, ticks, is_final) in xs {
            manager.track_event(
                DeviceId(0),
                TouchId(touch),
                Point::new(x, 0.0),
                None,
                None,
                is_final,
                Ticks(ticks),
            );
        }
    }

    #[test]
    fn stage_arrays_track_modifier_count() {
        let mut manager = InputManager::new();
        assert_eq!(manager.tracks.len(), 1);
        manager.add_modifier(Box::new(Identity));
        manager.insert_modifier(0, Box::new(Identity));
        assert_eq!(manager.tracks.len(), 3);
        assert_eq!(manager.hovers.len(), 3);
        manager.remove_modifier(1);
        assert_eq!(manager.tracks.len(), 2);
        assert_eq!(manager.hovers.len(), 2);
        manager.clear_modifiers();
        assert_eq!(manager.tracks.len(), 1);
        assert_eq!(manager.hovers.len(), 1);
    }

    #[test]
    fn track_event_creates_then_appends() {
        let mut manager = InputManager::new();
        feed(&mut manager, 7, &[(0.0, 0, false), (1.0, 10, false)]);
        assert_eq!(manager.input_tracks().len(), 1);
        assert_eq!(manager.input_tracks()[0].len(), 2);
        // a second gesture on the same device is a separate track
        feed(&mut manager, 8, &[(5.0, 20, false)]);
        assert_eq!(manager.input_tracks().len(), 2);
    }

    #[test]
    fn stale_ticks_do_not_mutate_the_track() {
        let mut manager = InputManager::new();
        feed(&mut manager, 7, &[(0.0, 20, false)]);
        feed(&mut manager, 7, &[(1.0, 10, false)]);
        assert_eq!(manager.input_tracks()[0].len(), 1);
    }

    #[test]
    fn equal_ticks_follow_config_policy() {
        let mut manager = InputManager::new();
        feed(&mut manager, 7, &[(0.0, 10, false), (1.0, 10, false)]);
        assert_eq!(manager.input_tracks()[0].len(), 2);

        let mut strict = InputManager::with_config(ManagerConfig {
            accept_equal_ticks: false,
            ..ManagerConfig::default()
        });
        feed(&mut strict, 7, &[(0.0, 10, false), (1.0, 10, false)]);
        assert_eq!(strict.input_tracks()[0].len(), 1);
    }

    #[test]
    fn samples_after_the_terminal_one_are_ignored() {
        let mut manager = InputManager::new();
        feed(&mut manager, 7, &[(0.0, 0, true), (1.0, 10, false)]);
        assert_eq!(manager.input_tracks()[0].len(), 1);
    }

    #[test]
    fn default_pressure_fills_missing_samples() {
        let mut manager = InputManager::new();
        manager.track_event(
            DeviceId(0),
            TouchId(1),
            Point::ZERO,
            Some(0.9),
            None,
            false,
            Ticks(0),
        );
        // same track, hardware dropped the pressure on this sample
        manager.track_event(
            DeviceId(0),
            TouchId(1),
            Point::new(1.0, 0.0),
            None,
            None,
            false,
            Ticks(10),
        );
        let points = manager.input_tracks()[0].points();
        assert_eq!(points[0].pressure, Some(0.9));
        assert_eq!(points[1].pressure, Some(0.5));
    }

    #[test]
    fn process_commits_when_no_modifier_holds_a_lock() {
        let mut manager = InputManager::new();
        manager.add_modifier(Box::new(Identity));
        feed(&mut manager, 7, &[(0.0, 0, false), (1.0, 10, false)]);
        manager.process_tracks();
        assert!(manager.save_points.is_empty());
        // the pass's save point marked pre-pass counts; output existed only
        // after the pass, so nothing is committed yet
        assert_eq!(manager.output_tracks()[0].committed(), 0);
        manager.process_tracks();
        assert_eq!(manager.output_tracks()[0].committed(), 2);
    }

    struct HoldingModifier {
        held: SavePointHolder,
    }

    impl Modifier for HoldingModifier {
        fn name(&self) -> &str {
            "holding"
        }

        fn modify_tracks(
            &mut self,
            tracks: &TrackList,
            save_point: &SavePointHolder,
            out_tracks: &mut TrackList,
        ) {
            // keep the right to rewrite back to this pass's save point
            if !self.held.assigned() {
                self.held.assign(save_point);
            }
            for track in tracks {
                crate::pipeline::modifier::passthrough_track(track, out_tracks);
            }
        }
    }

    #[test]
    fn locked_save_point_blocks_commits() {
        let mut manager = InputManager::new();
        manager.add_modifier(Box::new(HoldingModifier {
            held: SavePointHolder::new(),
        }));
        feed(&mut manager, 7, &[(0.0, 0, false)]);
        manager.process_tracks();
        manager.process_tracks();
        // the first pass's point is still locked by the modifier
        assert!(!manager.save_points.is_empty());
        assert_eq!(manager.output_tracks()[0].committed(), 0);
    }

    #[test]
    fn key_and_button_events_follow_the_equal_tick_policy() {
        let mut strict = InputManager::with_config(ManagerConfig {
            accept_equal_ticks: false,
            ..ManagerConfig::default()
        });
        assert!(strict.button_event(true, DeviceId(0), Button::Left, Ticks(10)));
        assert!(!strict.button_event(false, DeviceId(0), Button::Left, Ticks(10)));
        assert!(strict.state.is_button_pressed(DeviceId(0), Button::Left));
        assert!(strict.key_event(true, Key::Shift, Ticks(10)));
        assert!(!strict.key_event(false, Key::Shift, Ticks(10)));
        assert!(strict.state.is_key_pressed(Key::Shift));

        let mut lenient = InputManager::new();
        assert!(lenient.button_event(true, DeviceId(0), Button::Left, Ticks(10)));
        assert!(lenient.button_event(false, DeviceId(0), Button::Left, Ticks(10)));
        assert!(!lenient.state.is_button_pressed(DeviceId(0), Button::Left));
    }

    #[test]
    fn double_click_respects_tick_order() {
        let mut manager = InputManager::new();
        feed(&mut manager, 7, &[(0.0, 100, false)]);
        assert!(!manager.double_click_event(DeviceId(0), Ticks(50)));
        assert!(manager.double_click_event(DeviceId(0), Ticks(150)));
    }

    #[test]
    fn leave_event_clears_hovers_everywhere() {
        let mut manager = InputManager::new();
        manager.add_modifier(Box::new(Identity));
        manager.hover_event(vec![Point::new(1.0, 1.0)]);
        assert_eq!(manager.output_hovers().len(), 1);
        manager.leave_event();
        assert!(manager.input_hovers().is_empty());
        assert!(manager.output_hovers().is_empty());
        assert!(!manager.state.cursor_inside());
    }

    struct OffsetViewer;

    impl Viewer for OffsetViewer {
        fn world_to_screen(&self) -> Affine {
            Affine::translation(100.0, 0.0)
        }
    }

    #[test]
    fn samples_are_converted_through_the_viewer() {
        let mut manager = InputManager::new();
        manager.set_viewer(Some(Box::new(OffsetViewer)));
        feed(&mut manager, 7, &[(150.0, 0, false)]);
        let point = manager.input_tracks()[0].points()[0];
        assert_eq!(point.screen_position, Point::new(150.0, 0.0));
        assert_eq!(point.position, Point::new(50.0, 0.0));
    }

    #[test]
    fn transform_cache_invalidates_on_viewer_change() {
        let mut manager = InputManager::new();
        assert_eq!(manager.screen_to_world(), Affine::IDENTITY);
        manager.set_viewer(Some(Box::new(OffsetViewer)));
        assert_eq!(
            manager.screen_to_world(),
            Affine::translation(-100.0, 0.0)
        );
        manager.set_viewer(None);
        assert_eq!(manager.screen_to_world(), Affine::IDENTITY);
    }

    #[test]
    fn reset_clears_pipeline_but_keeps_chain() {
        let mut manager = InputManager::new();
        manager.add_modifier(Box::new(Identity));
        feed(&mut manager, 7, &[(0.0, 0, false)]);
        manager.process_tracks();
        manager.hover_event(vec![Point::ZERO]);
        manager.reset();
        assert!(!manager.is_active());
        assert_eq!(manager.modifier_count(), 1);
        assert!(manager.input_tracks().is_empty());
        assert!(manager.output_tracks().is_empty());
        assert!(manager.input_hovers().is_empty());
    }

    #[test]
    fn find_modifier_matches_by_name() {
        let mut manager = InputManager::new();
        manager.add_modifier(Box::new(Identity));
        assert_eq!(manager.find_modifier("identity"), Some(0));
        assert_eq!(manager.find_modifier("smoothing"), None);
        assert_eq!(manager.modifier(0).name(), "identity");
    }
}
