use std::collections::{HashMap, HashSet};

use crate::geometry::{Aabb, Ray};

/// Coarse pair pruning over body AABBs. Ids are opaque to the broadphase;
/// the world keys them by body slot.
pub trait BroadphaseDetector {
    fn add(&mut self, id: u32, aabb: Aabb);
    fn remove(&mut self, id: u32);
    fn update(&mut self, id: u32, aabb: Aabb);
    fn clear(&mut self);
    /// Candidate overlapping pairs, canonically ordered (smaller id first,
    /// list sorted) so downstream processing is deterministic.
    fn pairs(&self) -> Vec<(u32, u32)>;
    /// Ids whose AABB overlaps the query box.
    fn query(&self, aabb: &Aabb) -> Vec<u32>;
    /// Ids whose AABB the ray could pass through within `max_dist`.
    fn raycast(&self, ray: &Ray, max_dist: f64) -> Vec<u32>;
}

/// Uniform-grid spatial hash: each AABB is inserted into every cell it
/// touches; pairs are bodies sharing at least one cell.
pub struct SpatialHash {
    inv_cell_size: f64,
    cells: HashMap<(i32, i32), Vec<u32>>,
    aabbs: HashMap<u32, Aabb>,
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 4.0 };
        Self {
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            aabbs: HashMap::new(),
        }
    }

    fn cell_range(&self, aabb: &Aabb) -> (i32, i32, i32, i32) {
        (
            (aabb.min.x * self.inv_cell_size).floor() as i32,
            (aabb.min.y * self.inv_cell_size).floor() as i32,
            (aabb.max.x * self.inv_cell_size).floor() as i32,
            (aabb.max.y * self.inv_cell_size).floor() as i32,
        )
    }

    fn insert_cells(&mut self, id: u32, aabb: &Aabb) {
        let (x0, y0, x1, y1) = self.cell_range(aabb);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    fn remove_cells(&mut self, id: u32, aabb: &Aabb) {
        let (x0, y0, x1, y1) = self.cell_range(aabb);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(ids) = self.cells.get_mut(&(cx, cy)) {
                    ids.retain(|&other| other != id);
                    if ids.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
    }
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl BroadphaseDetector for SpatialHash {
    fn add(&mut self, id: u32, aabb: Aabb) {
        if let Some(old) = self.aabbs.insert(id, aabb) {
            self.remove_cells(id, &old);
        }
        self.insert_cells(id, &aabb);
    }

    fn remove(&mut self, id: u32) {
        if let Some(old) = self.aabbs.remove(&id) {
            self.remove_cells(id, &old);
        }
    }

    fn update(&mut self, id: u32, aabb: Aabb) {
        self.add(id, aabb);
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.aabbs.clear();
    }

    fn pairs(&self) -> Vec<(u32, u32)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for cell in self.cells.values() {
            let n = cell.len();
            for i in 0..n {
                for j in (i + 1)..n {
                    let (a, b) = if cell[i] < cell[j] {
                        (cell[i], cell[j])
                    } else {
                        (cell[j], cell[i])
                    };
                    if !seen.insert((a, b)) {
                        continue;
                    }
                    // Grid cells over-approximate; confirm the AABBs touch.
                    if self.aabbs[&a].overlaps(&self.aabbs[&b]) {
                        pairs.push((a, b));
                    }
                }
            }
        }
        // Hash iteration order is arbitrary; canonicalize for determinism.
        pairs.sort_unstable();
        pairs
    }

    fn query(&self, aabb: &Aabb) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .aabbs
            .iter()
            .filter(|(_, b)| b.overlaps(aabb))
            .map(|(&id, _)| id)
            .collect();
        out.sort_unstable();
        out
    }

    fn raycast(&self, ray: &Ray, max_dist: f64) -> Vec<u32> {
        // Conservative: test the ray's bounding box against each AABB.
        let end = ray.point_at(max_dist);
        let ray_box = Aabb::new(ray.origin.min(end), ray.origin.max(end));
        let mut out: Vec<u32> = self
            .aabbs
            .iter()
            .filter(|(_, b)| b.overlaps(&ray_box) && ray_intersects_aabb(ray, b, max_dist))
            .map(|(&id, _)| id)
            .collect();
        out.sort_unstable();
        out
    }
}

fn ray_intersects_aabb(ray: &Ray, aabb: &Aabb, max_dist: f64) -> bool {
    let mut tmin = 0.0f64;
    let mut tmax = max_dist;
    for axis in 0..2 {
        let (o, d, lo, hi) = if axis == 0 {
            (ray.origin.x, ray.direction.x, aabb.min.x, aabb.max.x)
        } else {
            (ray.origin.y, ray.direction.y, aabb.min.y, aabb.max.y)
        };
        if d.abs() < 1e-12 {
            if o < lo || o > hi {
                return false;
            }
        } else {
            let inv = 1.0 / d;
            let (t1, t2) = ((lo - o) * inv, (hi - o) * inv);
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
            if tmin > tmax {
                return false;
            }
        }
    }
    true
}
