//! Checkpoint coordination between pipeline stages.
//!
//! A [`SavePoint`] marks a position in pipeline history that some stage may
//! still want to rewrite. Stages never talk to each other directly; they
//! agree on how far back history may be rewritten by holding and locking the
//! same save point through [`SavePointHolder`] handles. Ownership (how many
//! holders reference the point) and usage (how many of them currently forbid
//! finalizing history at the point) are counted independently: the ownership
//! refcount is the `Rc` strong count, so destroy-at-zero is simply `Drop`.

use std::cell::Cell;
use std::rc::Rc;

/// A checkpoint with an independent usage-lock count.
///
/// The lock count is only reachable through [`SavePointHolder`], which pairs
/// every increment with a guaranteed decrement; raw counter access is never
/// exposed, so the free-condition check stays centrally enforced.
#[derive(Debug)]
pub struct SavePoint {
    available: Cell<bool>,
    locks: Cell<i32>,
}

impl SavePoint {
    fn new(available: bool) -> Self {
        Self {
            available: Cell::new(available),
            locks: Cell::new(0),
        }
    }

    /// True when no holder forbids finalizing history at this point.
    pub fn is_free(&self) -> bool {
        self.locks.get() <= 0
    }

    /// Whether the point's position has been reached by concrete data, as
    /// opposed to being reserved ahead of time.
    pub fn available(&self) -> bool {
        self.available.get()
    }

    fn lock(&self) {
        self.locks.set(self.locks.get() + 1);
    }

    fn unlock(&self) {
        self.locks.set(self.locks.get() - 1);
    }
}

/// Scoped handle bundling one reference to a [`SavePoint`] plus an optional
/// lock.
///
/// Construction, cloning, and destruction keep both counts balanced on every
/// exit path; a holder owns at most one reference at a time (the old
/// reference is released before a new one is acquired).
#[derive(Debug, Default)]
pub struct SavePointHolder {
    point: Option<Rc<SavePoint>>,
    lock: bool,
}

impl SavePointHolder {
    /// Creates an unset holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh save point; the returned holder owns one reference
    /// and holds a lock.
    pub fn create(available: bool) -> Self {
        let mut holder = Self::new();
        holder.set(Some(Rc::new(SavePoint::new(available))), true);
        holder
    }

    fn set(&mut self, point: Option<Rc<SavePoint>>, lock: bool) {
        let same = match (&self.point, &point) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            if let Some(old) = self.point.take() {
                if self.lock {
                    old.unlock();
                }
                // reference released here (Rc drop); destroy-at-zero follows
            }
            self.point = point;
            self.lock = lock && self.point.is_some();
            if self.lock {
                if let Some(p) = &self.point {
                    p.lock();
                }
            }
        } else if self.lock != lock {
            if let Some(p) = &self.point {
                if lock {
                    p.lock();
                } else {
                    p.unlock();
                }
                self.lock = lock;
            }
        }
    }

    /// Retargets this holder at whatever `other` holds, with `other`'s lock
    /// state. The C++ original spells this as holder assignment.
    pub fn assign(&mut self, other: &SavePointHolder) {
        self.set(other.point.clone(), other.lock);
    }

    /// Releases the reference and, if held, the lock.
    pub fn reset(&mut self) {
        self.set(None, false);
    }

    /// Adjusts only the lock on the current target.
    pub fn set_lock(&mut self, lock: bool) {
        let point = self.point.clone();
        self.set(point, lock);
    }

    /// Takes a lock on the current target.
    pub fn lock(&mut self) {
        self.set_lock(true);
    }

    /// Drops the lock on the current target, keeping the reference.
    pub fn unlock(&mut self) {
        self.set_lock(false);
    }

    /// Whether the holder currently references a save point.
    pub fn assigned(&self) -> bool {
        self.point.is_some()
    }

    /// Whether this holder itself holds a lock.
    pub fn locked(&self) -> bool {
        self.lock
    }

    /// Whether the target's position has concrete data yet. Unset holders
    /// report false.
    pub fn available(&self) -> bool {
        self.point.as_ref().is_some_and(|p| p.available())
    }

    /// True iff the holder is unset or no one forbids finalizing at the
    /// target. This is the signal that content up to this point may be
    /// finalized forever.
    pub fn is_free(&self) -> bool {
        self.point.as_ref().is_none_or(|p| p.is_free())
    }

    /// Flips the target from "reserved ahead of time" to "reached by data".
    pub fn mark_available(&self) {
        if let Some(p) = &self.point {
            p.available.set(true);
        }
    }

    /// Number of live holders referencing the target (0 when unset).
    pub fn ref_count(&self) -> usize {
        self.point.as_ref().map_or(0, Rc::strong_count)
    }
}

impl Clone for SavePointHolder {
    fn clone(&self) -> Self {
        let mut holder = Self::new();
        holder.assign(self);
        holder
    }
}

impl Drop for SavePointHolder {
    fn drop(&mut self) {
        self.reset();
    }
}
