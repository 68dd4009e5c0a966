//! Current device/key/button state tables and tick ordering.
//!
//! [`InputState`] is the pipeline's view of "what is pressed right now". It
//! also owns the per-device tick ordering check that protects causal order
//! inside a device's own monotonic hardware-time domain, and the monotonic
//! touch-id allocator used when a gesture begins without a pre-existing id.

use super::events::{Button, Key};
use std::collections::HashMap;

/// Opaque identifier for an input device (mouse, stylus, touch panel).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

/// Opaque identifier for one gesture on a device.
///
/// Hardware touch ids are passed through; synthetic gestures (e.g. a mouse
/// drag presented as a touch) get ids from [`InputState::gen_touch_id`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub u64);

/// Monotonic per-device hardware timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticks(pub i64);

/// Tables of currently pressed keys and buttons, plus tick bookkeeping.
///
/// All mutation goes through the event methods so the pressed sets and the
/// last-accepted tick per device stay consistent. Lookup misses degrade to
/// "not pressed" / "no matching track", never an error.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pressed keys with the tick at which they went down
    keys: HashMap<Key, Ticks>,
    /// Pressed buttons per device with the tick at which they went down
    buttons: HashMap<(DeviceId, Button), Ticks>,
    /// Last accepted tick per device (causal-order horizon)
    device_ticks: HashMap<DeviceId, Ticks>,
    /// Last accepted tick in the device-less key domain
    key_ticks: Option<Ticks>,
    /// Whether the cursor is currently inside the consuming view
    cursor_inside: bool,
    /// Current text composition (preedit) from the input method, if any
    preedit: Option<String>,
    /// Monotonic allocator for synthetic touch ids
    next_touch_id: u64,
}

impl InputState {
    /// Creates an empty state table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next synthetic touch id.
    ///
    /// The counter lives on the instance so that independent managers stay
    /// isolated and testable.
    pub fn gen_touch_id(&mut self) -> TouchId {
        self.next_touch_id += 1;
        TouchId(self.next_touch_id)
    }

    /// Checks whether `ticks` is acceptable for `device`.
    ///
    /// Returns false for ticks older than the last accepted tick of the same
    /// device. Equal ticks are acceptable here; the manager applies its
    /// configured equality policy on top.
    pub fn accepts_ticks(&self, device: DeviceId, ticks: Ticks) -> bool {
        match self.device_ticks.get(&device) {
            Some(last) => ticks >= *last,
            None => true,
        }
    }

    /// Records an accepted tick for `device`, advancing its horizon.
    pub fn observe_ticks(&mut self, device: DeviceId, ticks: Ticks) {
        let entry = self.device_ticks.entry(device).or_insert(ticks);
        if ticks > *entry {
            *entry = ticks;
        }
    }

    /// Last accepted tick for `device`, if any event was seen from it.
    pub fn last_ticks(&self, device: DeviceId) -> Option<Ticks> {
        self.device_ticks.get(&device).copied()
    }

    /// Last accepted tick in the key domain, if any key event was seen.
    pub fn last_key_ticks(&self) -> Option<Ticks> {
        self.key_ticks
    }

    /// Applies a key press/release. Returns false for stale ticks. As with
    /// [`InputState::accepts_ticks`], equal ticks are acceptable here; the
    /// manager applies its configured equality policy on top.
    pub fn key_event(&mut self, press: bool, key: Key, ticks: Ticks) -> bool {
        if self.key_ticks.is_some_and(|last| ticks < last) {
            log::debug!("Ignoring stale key event ({key:?}, ticks {ticks:?})");
            return false;
        }
        self.key_ticks = Some(ticks);
        if press {
            self.keys.insert(key, ticks);
        } else {
            self.keys.remove(&key);
        }
        true
    }

    /// Applies a button press/release. Returns false for stale ticks.
    pub fn button_event(
        &mut self,
        press: bool,
        device: DeviceId,
        button: Button,
        ticks: Ticks,
    ) -> bool {
        if !self.accepts_ticks(device, ticks) {
            log::debug!("Ignoring stale button event ({button:?}, ticks {ticks:?})");
            return false;
        }
        self.observe_ticks(device, ticks);
        if press {
            self.buttons.insert((device, button), ticks);
        } else {
            self.buttons.remove(&(device, button));
        }
        true
    }

    /// Whether `key` is currently pressed.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys.contains_key(&key)
    }

    /// Whether `button` on `device` is currently pressed.
    pub fn is_button_pressed(&self, device: DeviceId, button: Button) -> bool {
        self.buttons.contains_key(&(device, button))
    }

    /// Snapshot of pressed keys, for synthesizing releases.
    pub fn pressed_keys(&self) -> Vec<Key> {
        self.keys.keys().copied().collect()
    }

    /// Snapshot of pressed buttons, for synthesizing releases.
    pub fn pressed_buttons(&self) -> Vec<(DeviceId, Button)> {
        self.buttons.keys().copied().collect()
    }

    /// Releases every pressed key and button unconditionally, bypassing the
    /// tick-order checks. Recovery must succeed even when the host's clock
    /// reading is behind a device's horizon.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }

    /// Marks the cursor inside/outside the consuming view.
    pub fn set_cursor_inside(&mut self, inside: bool) {
        self.cursor_inside = inside;
    }

    /// Whether the cursor is inside the consuming view.
    pub fn cursor_inside(&self) -> bool {
        self.cursor_inside
    }

    /// Replaces the current text composition. `None` ends composition.
    pub fn set_preedit(&mut self, preedit: Option<String>) {
        self.preedit = preedit;
    }

    /// Current text composition, if an input method is composing.
    pub fn preedit(&self) -> Option<&str> {
        self.preedit.as_deref()
    }
}
