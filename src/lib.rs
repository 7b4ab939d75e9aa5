//! Arena Shooter - A top-down arena shooter simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spatial grid, collision, world tick)
//! - `config`: Data-driven arena and balance configuration

pub mod config;
pub mod sim;

pub use config::{ArenaConfig, ConfigError, GridConfig, PlayerTuning, ProjectileTuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena dimensions (world units)
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;
    /// Edge length of one spatial grid bucket
    pub const GRID_CELL_SIZE: f32 = 64.0;

    /// Tile edge length
    pub const TILE_SIZE: f32 = 32.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 24.0;
    /// Units per tick
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_MAX_HEALTH: u32 = 5;
    pub const DASH_MULTIPLIER: f32 = 3.0;
    pub const DASH_TICKS: u32 = 10;
    pub const DASH_COOLDOWN_TICKS: u32 = 90;
    pub const FIRE_COOLDOWN_TICKS: u32 = 15;
    /// Health lost by a player rammed during a dash
    pub const DASH_DAMAGE: u32 = 1;

    /// Projectile defaults
    pub const PROJECTILE_SIZE: f32 = 6.0;
    /// Units per tick
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_DAMAGE: u32 = 1;
    pub const PROJECTILE_LIFETIME_TICKS: u32 = 120;

    /// Item defaults
    pub const ITEM_SIZE: f32 = 12.0;
    pub const HEALTH_PACK_AMOUNT: u32 = 2;
}
