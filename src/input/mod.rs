//! Input event identifiers and current-state tables.
//!
//! This module defines the generic key/button vocabulary fed in by host
//! backends and the [`InputState`] table the pipeline consults for state
//! queries and causal-order checks.

pub mod events;
pub mod state;

// Re-export commonly used types at module level
pub use events::{Button, Key};
pub use state::{DeviceId, InputState, Ticks, TouchId};
