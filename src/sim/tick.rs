//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically. Order within a
//! tick:
//! 1. Player and bot commands set velocities and post `Fire`/`Dash`
//! 2. Messages are delivered (projectiles spawn)
//! 3. The collision system rebuilds its grid
//! 4. Every collider runs its motion-gated check
//! 5. Entities scheduled for destruction are torn down
//! 6. Movement is integrated, timers and projectile lifetimes tick down
//! 7. Messages posted by collisions are delivered (pickups, kills, drops)

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collider;
use super::collision::CollisionContext;
use super::entity::{EntityId, EntityKind};
use super::message::Message;
use super::world::World;
use crate::consts::SIM_DT;

/// One player's intent for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Desired movement direction (normalized on use, zero = stand still)
    pub movement: Vec2,
    /// Aim direction; falls back to the facing direction
    pub aim: Option<Vec2>,
    pub fire: bool,
    pub dash: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Commands for human-controlled players. A command for a bot overrides
    /// the bot's own decision for this tick.
    pub commands: BTreeMap<EntityId, PlayerCommand>,
}

impl TickInput {
    pub fn with(mut self, player: EntityId, command: PlayerCommand) -> Self {
        self.commands.insert(player, command);
        self
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    world.time.advance(SIM_DT);
    let time = world.time;

    // Bots decide on the simulation thread
    let mut commands = input.commands.clone();
    for (id, bot) in world.bots.iter_mut() {
        if !commands.contains_key(id) {
            commands.insert(*id, bot.decide(*id, &world.entities));
        }
    }
    for (id, command) in &commands {
        apply_command(world, *id, command);
    }
    world.dispatch_messages();

    // Collision: rebuild, then check every moving collider
    world.collision.update(&world.entities, time);
    let doomed = {
        let mut ctx = CollisionContext::new(&mut world.entities, &mut world.mailbox);
        for component in world.components.values() {
            collider::update(component.as_ref(), &world.collision, &mut ctx, time);
        }
        ctx.into_pending_destroy()
    };
    for id in doomed {
        world.destroy(id);
    }

    // Integrate and age
    let mut expired = Vec::new();
    for entity in world.entities.iter_mut() {
        entity.position += entity.velocity;
        match &mut entity.kind {
            EntityKind::Player(p) => {
                p.dash_ticks = p.dash_ticks.saturating_sub(1);
                p.dash_cooldown = p.dash_cooldown.saturating_sub(1);
                p.fire_cooldown = p.fire_cooldown.saturating_sub(1);
            }
            EntityKind::Projectile(p) => {
                p.ttl_ticks = p.ttl_ticks.saturating_sub(1);
                if p.ttl_ticks == 0 {
                    expired.push(entity.id);
                }
            }
            _ => {}
        }
    }
    for id in expired {
        log::trace!("{} expired", id);
        world.destroy(id);
    }

    world.dispatch_messages();
}

fn apply_command(world: &mut World, id: EntityId, command: &PlayerCommand) {
    let tuning = &world.config.player;
    let time = world.time;
    let Some(entity) = world.entities.get_mut(id) else {
        return;
    };
    let Some(player) = entity.as_player_mut() else {
        return;
    };
    if !player.is_alive() {
        entity.velocity = Vec2::ZERO;
        return;
    }

    let direction = command.movement.normalize_or_zero();
    if direction != Vec2::ZERO {
        player.facing = direction;
    }
    let speed = if player.is_dashing() {
        tuning.speed * tuning.dash_multiplier
    } else {
        tuning.speed
    };
    let aim = command.aim.unwrap_or(player.facing);
    entity.velocity = direction * speed;

    if command.dash {
        world.mailbox.broadcast(id, Message::Dash, time);
    }
    if command.fire {
        world.mailbox.broadcast(id, Message::Fire { direction: aim }, time);
    }
}
