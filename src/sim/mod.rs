//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collider;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod message;
pub mod rect;
pub mod tick;
pub mod world;

use serde::{Deserialize, Serialize};

pub use ai::AiController;
pub use collider::{
    Collider, ColliderState, ItemCollider, PlayerCollider, ProjectileCollider, SimpleCollider,
    TileCollider,
};
pub use collision::{CollisionContext, CollisionSystem};
pub use entity::{
    Entities, Entity, EntityId, EntityKind, IdAllocator, ItemData, ItemKind, PlayerData,
    ProjectileData, TileData, TileInteraction,
};
pub use grid::{CellKey, SpatialGrid};
pub use message::{Envelope, Mailbox, Message};
pub use rect::Rect;
pub use tick::{PlayerCommand, TickInput, tick};
pub use world::World;

/// Simulation clock passed to collision responses and stamped on messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameTime {
    /// Ticks elapsed since the world was created
    pub tick: u64,
    /// Length of the current tick in seconds
    pub dt: f32,
}

impl GameTime {
    /// Advance by one fixed step
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.dt = dt;
    }

    /// Elapsed simulated seconds (assumes a fixed step)
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 * self.dt
    }
}
