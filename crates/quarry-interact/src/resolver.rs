//! Target resolution: the nearest pointable node face or object along a ray.
//!
//! Nodes are found with a DDA walk (Amanatides & Woo) that steps from one
//! voxel boundary to the next, skipping anything the held item cannot point
//! at. Objects are tested against their selection boxes with a slab test.
//! Whichever hit is closer to the ray origin wins.

use glam::{IVec3, Vec3};
use quarry_voxel::{CONTENT_IGNORE, NodeRegistry};
use tracing::trace;

use crate::pointed::{ObjectId, PointedTarget, Ray};
use crate::ports::WorldView;

/// Extra search radius around the ray for objects whose selection box
/// reaches further than their origin.
const OBJECT_SEARCH_MARGIN: f32 = 10.0;

struct NodeHit {
    under: IVec3,
    normal: IVec3,
    distance: f32,
}

/// Resolves what a ray points at in a borrowed world.
pub struct TargetResolver<'a> {
    world: &'a dyn WorldView,
    nodes: &'a NodeRegistry,
}

impl<'a> TargetResolver<'a> {
    /// Creates a resolver over `world`, reading node properties from `nodes`.
    pub fn new(world: &'a dyn WorldView, nodes: &'a NodeRegistry) -> Self {
        Self { world, nodes }
    }

    /// Finds the nearest target along `ray`.
    ///
    /// Liquids stop the ray only when `liquids_pointable` is set. Objects are
    /// considered only when `consider_objects` is set. Ties go to the node.
    pub fn resolve(&self, ray: &Ray, liquids_pointable: bool, consider_objects: bool) -> PointedTarget {
        if ray.is_degenerate() {
            return PointedTarget::Nothing;
        }

        let node_hit = self.cast_nodes(ray, liquids_pointable);
        let object_hit = if consider_objects {
            self.cast_objects(ray)
        } else {
            None
        };

        match (node_hit, object_hit) {
            (Some(node), Some((id, t))) if t < node.distance => PointedTarget::Object { id },
            (Some(node), _) => PointedTarget::node(node.under, node.normal),
            (None, Some((id, _))) => PointedTarget::Object { id },
            (None, None) => PointedTarget::Nothing,
        }
    }

    fn is_pointable(&self, pos: IVec3, liquids_pointable: bool) -> bool {
        let Some(node) = self.world.node(pos) else {
            return false;
        };
        if node.content == CONTENT_IGNORE {
            return false;
        }
        let def = self.nodes.get(node.content);
        if def.liquid {
            liquids_pointable
        } else {
            def.pointable
        }
    }

    fn cast_nodes(&self, ray: &Ray, liquids_pointable: bool) -> Option<NodeHit> {
        let dir = ray.direction;
        let floor = ray.origin.floor();
        let sub = ray.origin - floor;
        let mut voxel = floor.as_ivec3();

        let step = IVec3::new(step_of(dir.x), step_of(dir.y), step_of(dir.z));

        // Distance in t-units to cross one full voxel on each axis.
        let t_delta = Vec3::new(
            safe_inv(dir.x.abs()),
            safe_inv(dir.y.abs()),
            safe_inv(dir.z.abs()),
        );

        // Distance in t-units to the first voxel boundary on each axis.
        let mut t_max = Vec3::new(
            initial_t_max(sub.x, dir.x, t_delta.x),
            initial_t_max(sub.y, dir.y, t_delta.y),
            initial_t_max(sub.z, dir.z, t_delta.z),
        );

        let mut normal = IVec3::ZERO;
        let mut t = 0.0_f32;

        loop {
            if self.is_pointable(voxel, liquids_pointable) {
                // Starting inside a node: face the ray's origin side.
                if normal == IVec3::ZERO {
                    normal = dominant_back_normal(dir);
                }
                return Some(NodeHit {
                    under: voxel,
                    normal,
                    distance: t,
                });
            }

            if t_max.x < t_max.y && t_max.x < t_max.z {
                t = t_max.x;
                t_max.x += t_delta.x;
                voxel.x += step.x;
                normal = IVec3::new(-step.x, 0, 0);
            } else if t_max.y < t_max.z {
                t = t_max.y;
                t_max.y += t_delta.y;
                voxel.y += step.y;
                normal = IVec3::new(0, -step.y, 0);
            } else {
                t = t_max.z;
                t_max.z += t_delta.z;
                voxel.z += step.z;
                normal = IVec3::new(0, 0, -step.z);
            }

            if t > ray.max_distance {
                return None;
            }
        }
    }

    fn cast_objects(&self, ray: &Ray) -> Option<(ObjectId, f32)> {
        let mut best: Option<(ObjectId, f32)> = None;
        for object in self
            .world
            .objects_near(ray.origin, ray.max_distance + OBJECT_SEARCH_MARGIN)
        {
            if !object.pointable {
                continue;
            }
            let (min, max) = object.world_box();
            let Some(t) = ray_box_distance(ray, min, max) else {
                continue;
            };
            trace!(id = object.id, distance = t, "Ray crosses object");
            if best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((object.id, t));
            }
        }
        best
    }
}

fn step_of(component: f32) -> i32 {
    if component >= 0.0 { 1 } else { -1 }
}

/// Safely compute 1.0 / x, clamping to `f32::MAX` when x ≈ 0.
fn safe_inv(x: f32) -> f32 {
    if x.abs() < f32::EPSILON {
        f32::MAX
    } else {
        1.0 / x
    }
}

/// Parametric distance to the first voxel boundary along one axis.
fn initial_t_max(sub: f32, dir_component: f32, t_delta: f32) -> f32 {
    if dir_component > 0.0 {
        (1.0 - sub) * t_delta
    } else if dir_component < 0.0 {
        sub * t_delta
    } else {
        f32::MAX
    }
}

/// Unit normal pointing back against the ray's dominant axis.
fn dominant_back_normal(dir: Vec3) -> IVec3 {
    let a = dir.abs();
    if a.x >= a.y && a.x >= a.z {
        IVec3::new(-step_of(dir.x), 0, 0)
    } else if a.y >= a.z {
        IVec3::new(0, -step_of(dir.y), 0)
    } else {
        IVec3::new(0, 0, -step_of(dir.z))
    }
}

/// Entry distance of `ray` into the box `[min, max]`, within the ray length.
fn ray_box_distance(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = 0.0_f32;
    let mut t_far = ray.max_distance;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < f32::EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    Some(t_near)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestWorld, test_nodes};

    fn ray_from_center(dir: Vec3, max_distance: f32) -> Ray {
        Ray::new(Vec3::splat(0.5), dir, max_distance)
    }

    #[test]
    fn test_empty_world_points_at_nothing() {
        let (nodes, _) = test_nodes();
        let world = TestWorld::new();
        let resolver = TargetResolver::new(&world, &nodes);
        for dir in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, 2.0, -3.0)] {
            let target = resolver.resolve(&ray_from_center(dir, 20.0), false, true);
            assert_eq!(target, PointedTarget::Nothing);
        }
    }

    #[test]
    fn test_hits_node_with_entry_face() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(5, 0, 0), c.stone);
        let resolver = TargetResolver::new(&world, &nodes);

        let target = resolver.resolve(&ray_from_center(Vec3::X, 10.0), false, true);
        assert_eq!(
            target,
            PointedTarget::Node {
                under: IVec3::new(5, 0, 0),
                above: IVec3::new(4, 0, 0),
                normal: IVec3::NEG_X,
            }
        );
    }

    #[test]
    fn test_node_beyond_reach_is_nothing() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(5, 0, 0), c.stone);
        let resolver = TargetResolver::new(&world, &nodes);

        // Boundary of x = 5 is 4.5 away.
        let target = resolver.resolve(&ray_from_center(Vec3::X, 4.0), false, true);
        assert_eq!(target, PointedTarget::Nothing);
    }

    #[test]
    fn test_liquid_is_skipped_unless_pointable() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(2, 0, 0), c.water);
        world.put(IVec3::new(4, 0, 0), c.stone);
        let resolver = TargetResolver::new(&world, &nodes);
        let ray = ray_from_center(Vec3::X, 10.0);

        assert_eq!(
            resolver.resolve(&ray, false, true).under(),
            Some(IVec3::new(4, 0, 0))
        );
        assert_eq!(
            resolver.resolve(&ray, true, true).under(),
            Some(IVec3::new(2, 0, 0))
        );
    }

    #[test]
    fn test_unloaded_space_is_transparent() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.loaded = 2;
        world.put(IVec3::new(1, 0, 0), c.grass);
        let resolver = TargetResolver::new(&world, &nodes);

        // Grass is pointable; everything past x = 2 is unloaded.
        let target = resolver.resolve(&ray_from_center(Vec3::X, 10.0), false, true);
        assert_eq!(target.under(), Some(IVec3::new(1, 0, 0)));

        world.nodes.clear();
        let resolver = TargetResolver::new(&world, &nodes);
        let target = resolver.resolve(&ray_from_center(Vec3::X, 10.0), false, true);
        assert_eq!(target, PointedTarget::Nothing);
    }

    #[test]
    fn test_downward_ray_hits_top_face() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(0, -3, 0), c.stone);
        let resolver = TargetResolver::new(&world, &nodes);

        let target = resolver.resolve(&ray_from_center(Vec3::NEG_Y, 10.0), false, true);
        assert_eq!(
            target,
            PointedTarget::Node {
                under: IVec3::new(0, -3, 0),
                above: IVec3::new(0, -2, 0),
                normal: IVec3::Y,
            }
        );
    }

    #[test]
    fn test_closer_object_wins() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(6, 0, 0), c.stone);
        world.add_object(9, Vec3::new(3.5, 0.5, 0.5));
        let resolver = TargetResolver::new(&world, &nodes);
        let ray = ray_from_center(Vec3::X, 10.0);

        assert_eq!(resolver.resolve(&ray, false, true), PointedTarget::Object { id: 9 });
        // Objects are ignored while a dig holds the button.
        assert_eq!(
            resolver.resolve(&ray, false, false).under(),
            Some(IVec3::new(6, 0, 0))
        );
    }

    #[test]
    fn test_closer_node_wins_over_object() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::new(2, 0, 0), c.stone);
        world.add_object(9, Vec3::new(5.5, 0.5, 0.5));
        let resolver = TargetResolver::new(&world, &nodes);

        let target = resolver.resolve(&ray_from_center(Vec3::X, 10.0), false, true);
        assert_eq!(target.under(), Some(IVec3::new(2, 0, 0)));
    }

    #[test]
    fn test_object_off_axis_is_missed() {
        let (nodes, _) = test_nodes();
        let mut world = TestWorld::new();
        world.add_object(4, Vec3::new(3.5, 3.0, 0.5));
        let resolver = TargetResolver::new(&world, &nodes);

        let target = resolver.resolve(&ray_from_center(Vec3::X, 10.0), false, true);
        assert_eq!(target, PointedTarget::Nothing);
    }

    #[test]
    fn test_ray_starting_inside_node() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::ZERO, c.stone);
        let resolver = TargetResolver::new(&world, &nodes);

        let target = resolver.resolve(&ray_from_center(Vec3::NEG_Z, 4.0), false, true);
        assert_eq!(
            target,
            PointedTarget::Node {
                under: IVec3::ZERO,
                above: IVec3::new(0, 0, 1),
                normal: IVec3::Z,
            }
        );
    }

    #[test]
    fn test_degenerate_ray_points_at_nothing() {
        let (nodes, c) = test_nodes();
        let mut world = TestWorld::new();
        world.put(IVec3::ZERO, c.stone);
        let resolver = TargetResolver::new(&world, &nodes);
        assert_eq!(
            resolver.resolve(&Ray::empty(Vec3::splat(0.5)), false, true),
            PointedTarget::Nothing
        );
    }

    #[test]
    fn test_slab_test_distance() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 10.0);
        let t = ray_box_distance(&ray, Vec3::new(2.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(t, Some(2.0));
        assert_eq!(
            ray_box_distance(&ray, Vec3::new(-3.0, -1.0, -1.0), Vec3::new(-2.0, 1.0, 1.0)),
            None
        );
    }
}
