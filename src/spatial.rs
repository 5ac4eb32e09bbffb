//! Spatial query port.
//!
//! The engine asks its host what lies along a ray or inside a sphere and
//! how to resolve a run identifier into segment data. [`SpatialQuery`] is
//! that boundary; [`Scene`] is an in-memory implementation over
//! axis-aligned boxes used by tests, benchmarks and the bundled binaries.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{HangerError, HangerResult};
use crate::geometry::{Point3, Vec3, EPSILON};
use crate::segment::{ElementId, RunSegment};

/// Category of a host element
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Floor,
    Roof,
    StructuralFraming,
    Joist,
    Ceiling,
    Wall,
    Conduit,
    CableTray,
    Other(String),
}

/// Set of categories a query is restricted to. An empty filter matches
/// every category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryFilter(BTreeSet<Category>);

impl CategoryFilter {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self(categories.into_iter().collect())
    }

    /// Filter that matches everything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, category: &Category) -> bool {
        self.0.is_empty() || self.0.contains(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

/// A ray cast request
#[derive(Debug, Clone, PartialEq)]
pub struct RayQuery {
    pub origin: Point3,
    /// Unit direction
    pub direction: Vec3,
    pub filter: CategoryFilter,
    pub max_distance: Option<f64>,
    pub exclude: Vec<ElementId>,
}

impl RayQuery {
    /// Create a ray query; the direction is normalized
    pub fn new(origin: Point3, direction: Vec3, filter: CategoryFilter) -> Self {
        let norm = direction.norm();
        let direction = if norm < EPSILON {
            direction
        } else {
            direction / norm
        };
        Self {
            origin,
            direction,
            filter,
            max_distance: None,
            exclude: Vec::new(),
        }
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = ElementId>) -> Self {
        self.exclude.extend(ids);
        self
    }
}

/// One collision returned by a ray cast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub point: Point3,
    pub distance: f64,
    /// Category of the element hit, `None` when the host cannot tell
    pub category: Option<Category>,
    pub element: ElementId,
}

/// Host-side spatial services consumed by the engine.
///
/// Calls are blocking. Collisions may come back in any order and an empty
/// result is not an error. Implementations report host failures as
/// [`HangerError::SpatialQuery`].
pub trait SpatialQuery {
    /// Cast a ray and return every collision along it
    fn cast_ray(&self, query: &RayQuery) -> HangerResult<Vec<RayHit>>;

    /// Return the ids of elements of the given categories intersecting a sphere
    fn cast_sphere(
        &self,
        center: &Point3,
        radius: f64,
        filter: &CategoryFilter,
    ) -> HangerResult<Vec<ElementId>>;

    /// Resolve a run id into its segment data
    fn segment(&self, id: ElementId) -> HangerResult<Option<RunSegment>>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn cast_ray(&self, query: &RayQuery) -> HangerResult<Vec<RayHit>> {
        (**self).cast_ray(query)
    }

    fn cast_sphere(
        &self,
        center: &Point3,
        radius: f64,
        filter: &CategoryFilter,
    ) -> HangerResult<Vec<ElementId>> {
        (**self).cast_sphere(center, radius, filter)
    }

    fn segment(&self, id: ElementId) -> HangerResult<Option<RunSegment>> {
        (**self).segment(id)
    }
}

/// Axis-aligned box tagged with a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstruction {
    pub id: ElementId,
    pub category: Category,
    pub min: Point3,
    pub max: Point3,
}

impl Obstruction {
    /// Create a box; corners are reordered so that `min <= max`
    pub fn new(id: impl Into<ElementId>, category: Category, a: Point3, b: Point3) -> Self {
        Self {
            id: id.into(),
            category,
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Horizontal plate covering `[x0, x1] x [y0, y1]` whose underside sits
    /// at `bottom`
    pub fn slab(
        id: impl Into<ElementId>,
        category: Category,
        x: [f64; 2],
        y: [f64; 2],
        bottom: f64,
        thickness: f64,
    ) -> Self {
        Self::new(
            id,
            category,
            Point3::new(x[0], y[0], bottom),
            Point3::new(x[1], y[1], bottom + thickness),
        )
    }

    /// Slab-method intersection. Returns the entry distance, or 0 when the
    /// origin is inside the box.
    fn intersect(&self, origin: &Point3, dir: &Vec3) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }

    fn distance_to(&self, p: &Point3) -> f64 {
        let mut sq = 0.0;
        for axis in 0..3 {
            let v = p[axis];
            let excess = if v < self.min[axis] {
                self.min[axis] - v
            } else if v > self.max[axis] {
                v - self.max[axis]
            } else {
                0.0
            };
            sq += excess * excess;
        }
        sq.sqrt()
    }
}

/// In-memory spatial scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub obstructions: Vec<Obstruction>,
    #[serde(default)]
    pub segments: HashMap<ElementId, RunSegment>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_obstruction(&mut self, obstruction: Obstruction) {
        self.obstructions.push(obstruction);
    }

    pub fn with_obstruction(mut self, obstruction: Obstruction) -> Self {
        self.add_obstruction(obstruction);
        self
    }

    /// Register a run so it can be looked up and found by sphere queries
    pub fn add_segment(&mut self, segment: RunSegment) {
        self.segments.insert(segment.id, segment);
    }
}

impl SpatialQuery for Scene {
    fn cast_ray(&self, query: &RayQuery) -> HangerResult<Vec<RayHit>> {
        if query.direction.norm() < EPSILON {
            return Err(HangerError::SpatialQuery(
                "ray direction has zero length".to_string(),
            ));
        }
        let hits = self
            .obstructions
            .iter()
            .filter(|o| query.filter.matches(&o.category) && !query.exclude.contains(&o.id))
            .filter_map(|o| {
                let t = o.intersect(&query.origin, &query.direction)?;
                if query.max_distance.is_some_and(|max| t > max) {
                    return None;
                }
                Some(RayHit {
                    point: query.origin + query.direction * t,
                    distance: t,
                    category: Some(o.category.clone()),
                    element: o.id,
                })
            })
            .collect();
        Ok(hits)
    }

    fn cast_sphere(
        &self,
        center: &Point3,
        radius: f64,
        filter: &CategoryFilter,
    ) -> HangerResult<Vec<ElementId>> {
        let mut ids: Vec<ElementId> = self
            .obstructions
            .iter()
            .filter(|o| filter.matches(&o.category) && o.distance_to(center) <= radius)
            .map(|o| o.id)
            .collect();

        if filter.matches(&Category::Conduit) {
            for seg in self.segments.values() {
                let t = seg.line.parameter_of(center).clamp(0.0, seg.length());
                let closest = seg.line.point_at(t);
                if (center - closest).norm() - seg.radius() <= radius {
                    ids.push(seg.id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn segment(&self, id: ElementId) -> HangerResult<Option<RunSegment>> {
        Ok(self.segments.get(&id).cloned())
    }
}
