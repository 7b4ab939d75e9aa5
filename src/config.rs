//! Arena configuration
//!
//! Construction-time only: the grid extent and balance values are read once
//! when a `World` is built and never change afterwards.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Configuration errors
///
/// These indicate a setup defect, not a transient condition. Nothing retries.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Grid extent or cell size is unusable
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A balance value is out of range
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// Malformed JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Spatial grid layout: `{width, height, cell_size}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Total grid extent along X
    pub width: f32,
    /// Total grid extent along Y
    pub height: f32,
    /// Square bucket edge length
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            cell_size: GRID_CELL_SIZE,
        }
    }
}

impl GridConfig {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "width must be positive, got {}",
                self.width
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidGrid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        // Keeps the bucket table within i32 cell indices
        if self.width / self.cell_size > i32::MAX as f32 / 2.0
            || self.height / self.cell_size > i32::MAX as f32 / 2.0
        {
            return Err(ConfigError::InvalidGrid(format!(
                "{}x{} world is too large for cell size {}",
                self.width, self.height, self.cell_size
            )));
        }
        Ok(())
    }

    /// Number of pre-allocated buckets along each axis (boundary inclusive)
    pub fn columns(&self) -> usize {
        (self.width / self.cell_size) as usize + 1
    }

    pub fn rows(&self) -> usize {
        (self.height / self.cell_size) as usize + 1
    }
}

/// Player balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: f32,
    /// Movement per tick
    pub speed: f32,
    pub max_health: u32,
    /// Speed multiplier while dashing
    pub dash_multiplier: f32,
    pub dash_ticks: u32,
    pub dash_cooldown_ticks: u32,
    pub fire_cooldown_ticks: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            max_health: PLAYER_MAX_HEALTH,
            dash_multiplier: DASH_MULTIPLIER,
            dash_ticks: DASH_TICKS,
            dash_cooldown_ticks: DASH_COOLDOWN_TICKS,
            fire_cooldown_ticks: FIRE_COOLDOWN_TICKS,
        }
    }
}

/// Projectile balance values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub size: f32,
    /// Movement per tick
    pub speed: f32,
    pub damage: u32,
    pub lifetime_ticks: u32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            size: PROJECTILE_SIZE,
            speed: PROJECTILE_SPEED,
            damage: PROJECTILE_DAMAGE,
            lifetime_ticks: PROJECTILE_LIFETIME_TICKS,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Run seed for AI reproducibility
    pub seed: u64,
    pub grid: GridConfig,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            grid: GridConfig::default(),
            player: PlayerTuning::default(),
            projectile: ProjectileTuning::default(),
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded arena config: {}x{} grid, cell {}",
            config.grid.width,
            config.grid.height,
            config.grid.cell_size
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        let p = &self.player;
        if !(p.size > 0.0 && p.size.is_finite()) {
            return Err(ConfigError::InvalidTuning(format!(
                "player size must be positive, got {}",
                p.size
            )));
        }
        if !(p.speed >= 0.0 && p.speed.is_finite()) {
            return Err(ConfigError::InvalidTuning(format!(
                "player speed must be non-negative, got {}",
                p.speed
            )));
        }
        if p.max_health == 0 {
            return Err(ConfigError::InvalidTuning(
                "player max_health must be at least 1".to_string(),
            ));
        }
        if !(p.dash_multiplier >= 1.0 && p.dash_multiplier.is_finite()) {
            return Err(ConfigError::InvalidTuning(format!(
                "dash_multiplier must be >= 1, got {}",
                p.dash_multiplier
            )));
        }

        let pr = &self.projectile;
        if !(pr.size > 0.0 && pr.size.is_finite()) {
            return Err(ConfigError::InvalidTuning(format!(
                "projectile size must be positive, got {}",
                pr.size
            )));
        }
        if !(pr.speed > 0.0 && pr.speed.is_finite()) {
            return Err(ConfigError::InvalidTuning(format!(
                "projectile speed must be positive, got {}",
                pr.speed
            )));
        }
        if pr.lifetime_ticks == 0 {
            return Err(ConfigError::InvalidTuning(
                "projectile lifetime_ticks must be at least 1".to_string(),
            ));
        }

        // Entities are filed by their corners, so none may span a whole cell
        let largest = p.size.max(pr.size).max(TILE_SIZE).max(ITEM_SIZE);
        if self.grid.cell_size < largest {
            return Err(ConfigError::InvalidGrid(format!(
                "cell_size {} is smaller than the largest entity edge {}",
                self.grid.cell_size, largest
            )));
        }

        Ok(())
    }
}
