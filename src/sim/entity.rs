//! Entity identity and game-object data
//!
//! Every simulated object (player, projectile, tile, item) is an `Entity`
//! owned by the `Entities` store. Other systems refer to entities only by
//! `EntityId`.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Stable, never-reused entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source owned by the simulation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a new entity ID
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Whether `id` has ever been handed out
    pub fn was_allocated(&self, id: EntityId) -> bool {
        id.0 > 0 && id.0 < self.next
    }
}

/// How a tile reacts to things walking into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileInteraction {
    /// Walls: stop players, absorb projectiles
    Blocking,
    /// Floor decoration, never takes part in collision
    #[default]
    Passable,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Coins(u32),
    Health(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub health: u32,
    pub max_health: u32,
    pub kills: u32,
    pub deaths: u32,
    pub coins: u32,
    /// Ticks left in the current dash (0 = not dashing)
    pub dash_ticks: u32,
    pub dash_cooldown: u32,
    pub fire_cooldown: u32,
    /// Last non-zero facing direction, used for firing without aim input
    pub facing: Vec2,
    /// Respawn location
    pub spawn: Vec2,
}

impl PlayerData {
    pub fn new(max_health: u32, spawn: Vec2) -> Self {
        Self {
            health: max_health,
            max_health,
            kills: 0,
            deaths: 0,
            coins: 0,
            dash_ticks: 0,
            dash_cooldown: 0,
            fire_cooldown: 0,
            facing: Vec2::X,
            spawn,
        }
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_ticks > 0
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileData {
    /// The player that fired it
    pub parent: EntityId,
    pub damage: u32,
    pub ttl_ticks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileData {
    pub interaction: TileInteraction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemData {
    pub kind: ItemKind,
}

/// Role-specific entity state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerData),
    Projectile(ProjectileData),
    Tile(TileData),
    Item(ItemData),
}

/// A simulated game object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Top-left corner of the bounding box
    pub position: Vec2,
    /// Displacement per tick
    pub velocity: Vec2,
    pub size: Vec2,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: EntityId, position: Vec2, size: Vec2, kind: EntityKind) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            size,
            kind,
        }
    }

    /// Current bounding rectangle
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Bounding rectangle one tick ahead (`position + velocity`)
    #[inline]
    pub fn projected_bounds(&self) -> Rect {
        Rect::new(self.position + self.velocity, self.size)
    }

    /// Area covered by the move from current to projected bounds
    pub fn swept_bounds(&self) -> Rect {
        self.bounds().union(&self.projected_bounds())
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Exact comparison: any non-zero velocity counts as moving
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn as_player(&self) -> Option<&PlayerData> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_blocking_tile(&self) -> bool {
        matches!(
            &self.kind,
            EntityKind::Tile(TileData {
                interaction: TileInteraction::Blocking
            })
        )
    }
}

/// Canonical owner of all live entities, iterated in id order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    map: BTreeMap<EntityId, Entity>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any previous one with the same id
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.map.insert(entity.id, entity)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.map.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.map.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.map.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.map.values_mut()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.map.keys().copied().collect()
    }

    pub fn players(&self) -> impl Iterator<Item = (&Entity, &PlayerData)> {
        self.map
            .values()
            .filter_map(|e| e.as_player().map(|p| (e, p)))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
