//! Uniform-grid spatial index for broad-phase collision
//!
//! The world is cut into square buckets of `cell_size`. Each entity is filed
//! under the buckets its four bounding corners land in, so a neighbor query
//! only has to look at a handful of buckets instead of every entity.
//!
//! Cell indices use truncating division (`(coord / cell_size) as i32`), not
//! floor. Coordinates in `(-cell_size, 0)` therefore share cell 0 with
//! `[0, cell_size)`, making the cells around the origin asymmetric. Changing
//! this would move bucket boundaries for every negative coordinate.

use std::collections::HashMap;

use glam::Vec2;

use super::entity::{Entity, EntityId};
use super::rect::Rect;
use crate::config::{ConfigError, GridConfig};

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
}

impl CellKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Bucketed spatial index, rebuilt from scratch every tick
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    config: GridConfig,
    columns: usize,
    rows: usize,
    /// Pre-allocated buckets covering the world extent, row-major
    buckets: Vec<Vec<EntityId>>,
    /// Cells outside the world extent, created on demand and dropped on clear
    overflow: HashMap<CellKey, Vec<EntityId>>,
}

impl SpatialGrid {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let columns = config.columns();
        let rows = config.rows();
        log::debug!(
            "Spatial grid {}x{} cells ({} world units per cell)",
            columns,
            rows,
            config.cell_size
        );
        Ok(Self {
            config,
            columns,
            rows,
            buckets: vec![Vec::new(); columns * rows],
            overflow: HashMap::new(),
        })
    }

    /// Number of pre-allocated buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Reset every bucket to empty. The pre-allocated table is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.overflow.clear();
    }

    /// Cell containing a world point (truncating division)
    #[inline]
    pub fn cell_of(&self, point: Vec2) -> CellKey {
        CellKey::new(
            (point.x / self.config.cell_size) as i32,
            (point.y / self.config.cell_size) as i32,
        )
    }

    /// World position of a cell's top-left corner
    #[inline]
    pub fn cell_origin(&self, key: CellKey) -> Vec2 {
        Vec2::new(key.x as f32, key.y as f32) * self.config.cell_size
    }

    /// Distinct cells under the four corners of `rect`
    pub fn cells_for(&self, rect: &Rect) -> Vec<CellKey> {
        let mut keys = Vec::with_capacity(4);
        for corner in rect.corners() {
            let key = self.cell_of(corner);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn slot(&self, key: CellKey) -> Option<usize> {
        if key.x < 0 || key.y < 0 {
            return None;
        }
        let (x, y) = (key.x as usize, key.y as usize);
        if x >= self.columns || y >= self.rows {
            return None;
        }
        Some(y * self.columns + x)
    }

    /// File an entity under each distinct cell its bounds touch
    pub fn insert(&mut self, entity: &Entity) {
        for key in self.cells_for(&entity.bounds()) {
            match self.slot(key) {
                Some(slot) => self.buckets[slot].push(entity.id),
                None => {
                    log::trace!("{} outside grid extent at cell {:?}", entity.id, key);
                    self.overflow.entry(key).or_default().push(entity.id);
                }
            }
        }
    }

    /// Entities in the buckets `entity` occupies
    ///
    /// Includes `entity` itself when it was inserted, and repeats a neighbor
    /// once per shared bucket. Callers deduplicate.
    pub fn nearby(&self, entity: &Entity) -> Vec<EntityId> {
        self.nearby_rect(&entity.bounds())
    }

    /// Entities in every bucket `area` overlaps, including overflow cells.
    /// Same duplicate rules as `nearby`.
    pub fn nearby_rect(&self, area: &Rect) -> Vec<EntityId> {
        let lo = self.cell_of(area.min);
        let hi = self.cell_of(area.max());
        let mut result = Vec::new();
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                result.extend_from_slice(self.bucket(CellKey::new(x, y)));
            }
        }
        result
    }

    /// Contents of one bucket (empty for unknown cells)
    pub fn bucket(&self, key: CellKey) -> &[EntityId] {
        match self.slot(key) {
            Some(slot) => self.buckets[slot].as_slice(),
            None => self.overflow.get(&key).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Origins of the pre-allocated cells inside `area` (boundary inclusive),
    /// row by row. Used for the debug grid overlay.
    pub fn cells_in(&self, area: &Rect) -> Vec<Vec2> {
        let lo = self.cell_of(area.min);
        let hi = self.cell_of(area.max());
        let x_lo = lo.x.max(0);
        let y_lo = lo.y.max(0);
        let x_hi = hi.x.min(self.columns as i32 - 1);
        let y_hi = hi.y.min(self.rows as i32 - 1);

        let mut origins = Vec::new();
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                origins.push(self.cell_origin(CellKey::new(x, y)));
            }
        }
        origins
    }

    /// Total number of (entity, bucket) entries
    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum::<usize>()
            + self.overflow.values().map(Vec::len).sum::<usize>()
    }
}
