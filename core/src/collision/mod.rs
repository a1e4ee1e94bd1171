pub mod broadphase;
pub mod manifold;
pub mod mixer;
pub mod narrowphase;
pub mod toi;

pub use broadphase::{BroadphaseDetector, SpatialHash};
pub use manifold::{ClippingManifoldSolver, ManifoldSolver};
pub use mixer::{DefaultValueMixer, ValueMixer};
pub use narrowphase::{NarrowphaseDetector, Sat};
pub use toi::{ConservativeAdvancement, TimeOfImpactDetector, Toi};

use crate::geometry::Vec2;

/// Result of a narrowphase test: the minimum translation that separates the
/// shapes. The normal points from the first shape toward the second.
#[derive(Debug, Clone, Copy)]
pub struct Penetration {
    pub normal: Vec2,
    pub depth: f64,
}

/// Stable identity of one contact point across frames, derived from the
/// colliding features. Persisted impulses are matched by this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifoldPointId(u32);

impl ManifoldPointId {
    /// Id used by curved-shape contacts where no feature pair exists; these
    /// match by proximity instead.
    pub const DISTANCE: ManifoldPointId = ManifoldPointId(u32::MAX);

    /// Pack reference edge, incident edge, and clip index into a stable key.
    pub fn feature(reference_edge: u8, incident_edge: u8, index: u8, flipped: bool) -> Self {
        ManifoldPointId(
            (reference_edge as u32)
                | ((incident_edge as u32) << 8)
                | ((index as u32) << 16)
                | ((flipped as u32) << 24),
        )
    }

    pub fn is_distance(&self) -> bool {
        *self == Self::DISTANCE
    }
}

/// One point of a contact manifold, in world space.
#[derive(Debug, Clone, Copy)]
pub struct ManifoldPoint {
    pub point: Vec2,
    pub depth: f64,
    pub id: ManifoldPointId,
}

/// A contact manifold: a shared normal and one or two points.
#[derive(Debug, Clone)]
pub struct Manifold {
    /// Points from the first shape toward the second.
    pub normal: Vec2,
    pub points: Vec<ManifoldPoint>,
}
