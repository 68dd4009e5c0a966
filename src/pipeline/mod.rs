//! Gesture pipeline: save points, the modifier contract, and the manager.
//!
//! Raw samples enter stage 0 through [`InputManager`] ingestion calls; each
//! [`Modifier`] derives stage *k+1* from stage *k*; the last stage is what
//! the consuming tool reads. [`SavePointHolder`]s coordinate how far back
//! output may still be rewritten and when it becomes permanent.

pub mod manager;
pub mod modifier;
pub mod save_point;

// Re-export commonly used types at module level
pub use manager::InputManager;
pub use modifier::{Modifier, passthrough_track};
pub use save_point::{SavePoint, SavePointHolder};
