//! Input-event routing and gesture reconstruction for drawing tools.
//!
//! This crate ingests raw per-device pointer/stylus/touch samples,
//! reconstructs them into per-gesture point sequences ([`Track`]s), and
//! pushes each track (and lightweight hover positions) through an ordered
//! chain of [`Modifier`] stages that may smooth, snap, or otherwise
//! reinterpret the geometry before the consuming tool reads it.
//!
//! Stages are not purely forward: a modifier may decide that recently
//! emitted output was wrong and rewrite a bounded suffix of it. Save points
//! coordinate this across mutually unaware stages so no stage discards
//! history another stage still needs, while regions everyone has finished
//! with are committed permanently.
//!
//! The pipeline is single-threaded and synchronous; see
//! [`pipeline::InputManager`] for the full entry-point surface.

pub mod config;
pub mod geometry;
pub mod input;
pub mod pipeline;
pub mod track;
pub mod viewer;

pub use config::{ConfigError, ManagerConfig};
pub use geometry::{Affine, Point, Rect};
pub use input::{Button, DeviceId, InputState, Key, Ticks, TouchId};
pub use pipeline::{InputManager, Modifier, SavePointHolder};
pub use track::{HoverList, Track, TrackList, TrackPoint};
pub use viewer::Viewer;
