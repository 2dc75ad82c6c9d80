use crate::geometry::Bounds;
use crate::tree::MosaicPath;
use thiserror::Error;

pub type SurfaceId = u64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Unable to open surface: {0}")]
    Unavailable(String),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A window that renders part of the shared layout and feeds pointer events
/// back to the backend. The main window hosts the root; portal windows
/// usually host a subtree.
pub trait RenderSurface {
    fn id(&self) -> SurfaceId;

    /// Drawable area, in the same coordinates as the surface's pointer events.
    fn viewport(&self) -> SurfaceResult<Bounds>;

    fn hosted_path(&self) -> MosaicPath {
        Vec::new()
    }
}

/// A surface with a fixed viewport, for headless use and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSurface {
    id: SurfaceId,
    viewport: Bounds,
    hosted_path: MosaicPath,
}

impl FixedSurface {
    pub fn new(id: SurfaceId, viewport: Bounds) -> Self {
        Self {
            id,
            viewport,
            hosted_path: Vec::new(),
        }
    }

    pub fn hosting(id: SurfaceId, viewport: Bounds, hosted_path: MosaicPath) -> Self {
        Self {
            id,
            viewport,
            hosted_path,
        }
    }
}

impl RenderSurface for FixedSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn viewport(&self) -> SurfaceResult<Bounds> {
        Ok(self.viewport.clone())
    }

    fn hosted_path(&self) -> MosaicPath {
        self.hosted_path.clone()
    }
}
