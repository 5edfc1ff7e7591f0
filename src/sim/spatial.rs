//! Uniform grid broad phase
//!
//! Bodies are bucketed into every cell their bounding square touches. Buckets hold
//! ids only; entries whose body is gone or flagged for removal are dropped lazily
//! the next time a query walks their bucket.

use std::collections::HashMap;

use glam::{IVec2, Vec2};

use super::body::EntityId;
use crate::cell_range;

/// Spatial hash over circle bounds
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<IVec2, Vec<EntityId>>,
    /// Cell span of each inserted id, so an entry can be moved
    spans: HashMap<EntityId, (IVec2, IVec2)>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            spans: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `p`
    #[inline]
    pub fn cell_of(&self, p: Vec2) -> IVec2 {
        (p * self.inv_cell_size).floor().as_ivec2()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.spans.clear();
    }

    /// Number of non-empty buckets
    pub fn cell_count(&self) -> usize {
        self.cells.values().filter(|b| !b.is_empty()).count()
    }

    /// Whether `id` currently occupies any cell
    pub fn contains(&self, id: EntityId) -> bool {
        self.spans.contains_key(&id)
    }

    /// Add `id` to every cell touched by the circle; an id already present is moved
    pub fn insert(&mut self, id: EntityId, center: Vec2, radius: f32) {
        if self.spans.contains_key(&id) {
            self.remove(id);
        }
        let (min, max) = cell_range(center, radius, self.inv_cell_size);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                self.cells.entry(IVec2::new(x, y)).or_default().push(id);
            }
        }
        self.spans.insert(id, (min, max));
    }

    /// Drop `id` from the cells it was inserted into
    pub fn remove(&mut self, id: EntityId) {
        let Some((min, max)) = self.spans.remove(&id) else {
            return;
        };
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                if let Some(bucket) = self.cells.get_mut(&IVec2::new(x, y)) {
                    bucket.retain(|&e| e != id);
                }
            }
        }
    }

    /// Visit every entry sharing a cell with the circle, except `id` itself.
    ///
    /// Entries for which `is_live` is false are evicted from each bucket before
    /// it is walked. A neighbor spanning several cells is visited once per shared cell.
    pub fn query<L, V>(&mut self, id: EntityId, center: Vec2, radius: f32, is_live: L, mut visit: V)
    where
        L: Fn(EntityId) -> bool,
        V: FnMut(EntityId),
    {
        let (min, max) = cell_range(center, radius, self.inv_cell_size);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                let Some(bucket) = self.cells.get_mut(&IVec2::new(x, y)) else {
                    continue;
                };
                let spans = &mut self.spans;
                bucket.retain(|&e| {
                    let live = is_live(e);
                    if !live {
                        spans.remove(&e);
                    }
                    live
                });
                for &other in bucket.iter() {
                    if other != id {
                        visit(other);
                    }
                }
            }
        }
    }
}
