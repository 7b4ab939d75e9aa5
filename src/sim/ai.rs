//! Bot players
//!
//! Each bot owns a seeded PCG stream and makes one decision per tick on the
//! simulation thread, so a run with the same seed plays out identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Entities, EntityId};
use super::tick::PlayerCommand;

/// Bots shoot at players closer than this
const ENGAGE_RANGE: f32 = 320.0;
/// Bots try to ram players closer than this
const RAM_RANGE: f32 = 60.0;
const FIRE_CHANCE: f64 = 0.08;
const DASH_CHANCE: f64 = 0.05;
/// Chance a new wander leg is spent standing still
const IDLE_CHANCE: f64 = 0.2;
/// Aim error in radians
const AIM_JITTER: f32 = 0.15;

#[derive(Debug, Clone)]
pub struct AiController {
    rng: Pcg32,
    wander: Vec2,
    /// Ticks until a new wander direction is picked
    retarget_in: u32,
}

impl AiController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wander: Vec2::ZERO,
            retarget_in: 0,
        }
    }

    /// Per-bot seed derived from the run seed and the bot's id
    pub fn for_entity(run_seed: u64, id: EntityId) -> Self {
        Self::new(run_seed ^ (id.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Pick this tick's command for `me`
    pub fn decide(&mut self, me: EntityId, entities: &Entities) -> PlayerCommand {
        let Some(entity) = entities.get(me) else {
            return PlayerCommand::default();
        };
        if entity.as_player().is_none_or(|p| !p.is_alive()) {
            return PlayerCommand::default();
        }

        if self.retarget_in == 0 {
            self.wander = if self.rng.random_bool(IDLE_CHANCE) {
                Vec2::ZERO
            } else {
                Vec2::from_angle(self.rng.random_range(0.0..std::f32::consts::TAU))
            };
            self.retarget_in = self.rng.random_range(20..60);
        } else {
            self.retarget_in -= 1;
        }

        let center = entity.center();
        let nearest = entities
            .players()
            .filter(|(e, p)| e.id != me && p.is_alive())
            .map(|(e, _)| e.center() - center)
            .min_by(|a, b| {
                a.length_squared()
                    .partial_cmp(&b.length_squared())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let mut command = PlayerCommand {
            movement: self.wander,
            ..Default::default()
        };

        if let Some(offset) = nearest {
            let distance = offset.length();
            if distance < ENGAGE_RANGE && self.rng.random_bool(FIRE_CHANCE) {
                let jitter = self.rng.random_range(-AIM_JITTER..AIM_JITTER);
                command.fire = true;
                command.aim = Some(Vec2::from_angle(jitter).rotate(offset.normalize_or_zero()));
            }
            if distance < RAM_RANGE {
                command.movement = offset.normalize_or_zero();
                command.dash = self.rng.random_bool(DASH_CHANCE);
            }
        }

        command
    }
}
