//! Viewer collaborator interface and cached coordinate transforms.
//!
//! The host supplies a [`Viewer`] with the current affine transform stack
//! and DPI scale. The manager queries it lazily: derived transforms are
//! captured once into [`Transforms`] and reused until the viewer reference
//! or its DPI scale changes.

use crate::geometry::{Affine, Point};

/// The host-side view this pipeline feeds.
///
/// Only the coordinate plumbing is consumed here; geometry is produced by
/// the host, never by the pipeline.
pub trait Viewer {
    /// Transform from tool space to world space.
    fn tool_to_world(&self) -> Affine {
        Affine::IDENTITY
    }

    /// Transform from world space to screen space.
    fn world_to_screen(&self) -> Affine;

    /// Per-axis DPI scale factor of the output the viewer is on.
    fn dpi_scale(&self) -> Point {
        Point::new(1.0, 1.0)
    }
}

/// Snapshot of the viewer's transforms plus their inverses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Transforms {
    pub tool_to_world: Affine,
    pub world_to_tool: Affine,
    pub world_to_screen: Affine,
    pub screen_to_world: Affine,
    pub dpi_scale: Point,
}

impl Transforms {
    /// Captures the viewer's current transforms.
    ///
    /// A singular viewer matrix has no inverse; the inverse degrades to
    /// identity with a warning rather than poisoning the pipeline.
    pub fn capture(viewer: &dyn Viewer) -> Self {
        let tool_to_world = viewer.tool_to_world();
        let world_to_screen = viewer.world_to_screen();
        let world_to_tool = tool_to_world.invert().unwrap_or_else(|| {
            log::warn!("tool-to-world transform is singular; using identity inverse");
            Affine::IDENTITY
        });
        let screen_to_world = world_to_screen.invert().unwrap_or_else(|| {
            log::warn!("world-to-screen transform is singular; using identity inverse");
            Affine::IDENTITY
        });
        Self {
            tool_to_world,
            world_to_tool,
            world_to_screen,
            screen_to_world,
            dpi_scale: viewer.dpi_scale(),
        }
    }

    /// Identity transforms, used while no viewer is attached.
    pub fn identity() -> Self {
        Self {
            tool_to_world: Affine::IDENTITY,
            world_to_tool: Affine::IDENTITY,
            world_to_screen: Affine::IDENTITY,
            screen_to_world: Affine::IDENTITY,
            dpi_scale: Point::new(1.0, 1.0),
        }
    }
}
