//! Rays and the things they can point at.

use glam::{IVec3, Vec3};

/// Handle of a dynamic object in the client environment.
pub type ObjectId = u16;

/// A pointing ray, rebuilt every frame from the camera.
///
/// Voxel `i` spans `[i, i + 1)` on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Start point in world space.
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray.
    pub direction: Vec3,
    /// Length of the ray in nodes.
    pub max_distance: f32,
}

impl Ray {
    /// Builds a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: max_distance.max(0.0),
        }
    }

    /// A ray that can point at nothing.
    pub fn empty(origin: Vec3) -> Self {
        Self {
            origin,
            direction: Vec3::ZERO,
            max_distance: 0.0,
        }
    }

    /// Returns `true` when the ray has no length or no direction.
    pub fn is_degenerate(&self) -> bool {
        self.max_distance <= 0.0 || self.direction == Vec3::ZERO
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// What the player is aiming at this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointedTarget {
    /// Nothing within reach.
    #[default]
    Nothing,
    /// A node face.
    Node {
        /// The node that was hit.
        under: IVec3,
        /// The neighbor on the side the ray entered from.
        above: IVec3,
        /// Unit normal of the entry face, `above - under`.
        normal: IVec3,
    },
    /// A dynamic object.
    Object {
        /// Object handle.
        id: ObjectId,
    },
}

impl PointedTarget {
    /// Builds a node target from the hit node and entry face normal.
    pub fn node(under: IVec3, normal: IVec3) -> Self {
        Self::Node {
            under,
            above: under + normal,
            normal,
        }
    }

    /// The hit node, if this is a node target.
    pub fn under(&self) -> Option<IVec3> {
        match self {
            Self::Node { under, .. } => Some(*under),
            _ => None,
        }
    }

    /// Returns `true` if both targets point at the same node, whatever the face.
    pub fn same_node(&self, other: &Self) -> bool {
        matches!((self.under(), other.under()), (Some(a), Some(b)) if a == b)
    }

    /// Returns `true` for [`PointedTarget::Nothing`].
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_target_derives_above() {
        let target = PointedTarget::node(IVec3::new(1, 0, 1), IVec3::Y);
        assert_eq!(
            target,
            PointedTarget::Node {
                under: IVec3::new(1, 0, 1),
                above: IVec3::new(1, 1, 1),
                normal: IVec3::Y,
            }
        );
    }

    #[test]
    fn test_same_node_ignores_face() {
        let top = PointedTarget::node(IVec3::new(1, 0, 1), IVec3::Y);
        let side = PointedTarget::node(IVec3::new(1, 0, 1), IVec3::X);
        let other = PointedTarget::node(IVec3::new(2, 0, 1), IVec3::Y);

        assert_ne!(top, side);
        assert!(top.same_node(&side));
        assert!(!top.same_node(&other));
        assert!(!top.same_node(&PointedTarget::Object { id: 3 }));
        assert!(!PointedTarget::Nothing.same_node(&PointedTarget::Nothing));
    }

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0), 4.0);
        assert_eq!(ray.direction, Vec3::Y);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 2.0, 0.0));
        assert!(!ray.is_degenerate());
        assert!(Ray::empty(Vec3::ONE).is_degenerate());
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO, 4.0).is_degenerate());
    }
}
