//! Simulation context
//!
//! `World` owns every entity, the collider components attached to them, the
//! collision system, the message queue and the id allocator.

use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec2;

use super::GameTime;
use super::ai::AiController;
use super::collider::{
    self, Collider, ColliderState, ItemCollider, PlayerCollider, ProjectileCollider, TileCollider,
};
use super::collision::CollisionSystem;
use super::entity::{
    Entities, Entity, EntityId, EntityKind, IdAllocator, ItemData, ItemKind, PlayerData,
    ProjectileData, TileData, TileInteraction,
};
use super::message::{Envelope, Mailbox, Message};
use crate::config::{ArenaConfig, ConfigError};
use crate::consts::{ITEM_SIZE, TILE_SIZE};

#[derive(Debug)]
pub struct World {
    pub config: ArenaConfig,
    pub time: GameTime,
    pub entities: Entities,
    pub collision: CollisionSystem,
    pub mailbox: Mailbox,
    /// Collider component of each entity that has one
    pub(crate) components: BTreeMap<EntityId, Rc<dyn Collider>>,
    pub(crate) bots: BTreeMap<EntityId, AiController>,
    ids: IdAllocator,
}

impl World {
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let collision = CollisionSystem::new(config.grid)?;
        log::info!(
            "World created: {}x{} arena, seed {}",
            config.grid.width,
            config.grid.height,
            config.seed
        );
        Ok(Self {
            config,
            time: GameTime::default(),
            entities: Entities::new(),
            collision,
            mailbox: Mailbox::new(),
            components: BTreeMap::new(),
            bots: BTreeMap::new(),
            ids: IdAllocator::new(),
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Add an entity and initialize its collider component
    pub fn spawn(&mut self, entity: Entity, collider: Option<Rc<dyn Collider>>) -> EntityId {
        let id = entity.id;
        if let Some(component) = collider {
            collider::initialize(component.clone(), &entity, &mut self.collision);
            self.components.insert(id, component);
        }
        self.entities.insert(entity);
        id
    }

    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let tuning = &self.config.player;
        let entity = Entity::new(
            id,
            position,
            Vec2::splat(tuning.size),
            EntityKind::Player(PlayerData::new(tuning.max_health, position)),
        );
        log::info!("Player {} spawned at {}", id, position);
        self.spawn(entity, Some(Rc::new(PlayerCollider::new(id))))
    }

    /// Spawn a player driven by a seeded bot
    pub fn spawn_bot(&mut self, position: Vec2) -> EntityId {
        let id = self.spawn_player(position);
        self.bots
            .insert(id, AiController::for_entity(self.config.seed, id));
        id
    }

    pub fn spawn_tile(&mut self, position: Vec2, interaction: TileInteraction) -> EntityId {
        let id = self.next_entity_id();
        let entity = Entity::new(
            id,
            position,
            Vec2::splat(TILE_SIZE),
            EntityKind::Tile(TileData { interaction }),
        );
        self.spawn(entity, Some(Rc::new(TileCollider::new(id))))
    }

    /// Item centered on `position`
    pub fn spawn_item(&mut self, position: Vec2, kind: ItemKind) -> EntityId {
        let id = self.next_entity_id();
        let size = Vec2::splat(ITEM_SIZE);
        let entity = Entity::new(
            id,
            position - size * 0.5,
            size,
            EntityKind::Item(ItemData { kind }),
        );
        log::debug!("Item {} ({:?}) spawned at {}", id, kind, position);
        self.spawn(entity, Some(Rc::new(ItemCollider::new(id))))
    }

    /// Projectile leaving the center of `parent` along `direction`.
    /// Returns None if the parent is gone or the direction is zero.
    pub fn spawn_projectile(&mut self, parent: EntityId, direction: Vec2) -> Option<EntityId> {
        let origin = self.entities.get(parent)?.center();
        let direction = direction.try_normalize()?;

        let id = self.next_entity_id();
        let tuning = &self.config.projectile;
        let size = Vec2::splat(tuning.size);
        let mut entity = Entity::new(
            id,
            origin - size * 0.5,
            size,
            EntityKind::Projectile(ProjectileData {
                parent,
                damage: tuning.damage,
                ttl_ticks: tuning.lifetime_ticks,
            }),
        );
        entity.velocity = direction * tuning.speed;
        Some(self.spawn(entity, Some(Rc::new(ProjectileCollider::new(id, parent)))))
    }

    /// Ring of blocking tiles just inside the arena edge
    pub fn spawn_border_walls(&mut self) -> usize {
        let columns = (self.config.grid.width / TILE_SIZE) as u32;
        let rows = (self.config.grid.height / TILE_SIZE) as u32;
        let mut count = 0;
        for col in 0..columns {
            for row in 0..rows {
                if col == 0 || row == 0 || col + 1 == columns || row + 1 == rows {
                    let position = Vec2::new(col as f32, row as f32) * TILE_SIZE;
                    self.spawn_tile(position, TileInteraction::Blocking);
                    count += 1;
                }
            }
        }
        log::info!("Spawned {} border walls", count);
        count
    }

    /// Tear down an entity: destroy its collider, drop bot control, remove it
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if let Some(component) = self.components.remove(&id) {
            collider::destroy(component.as_ref(), &mut self.collision);
        }
        self.bots.remove(&id);
        let removed = self.entities.remove(id).is_some();
        if removed {
            log::trace!("{} destroyed", id);
        }
        removed
    }

    /// None for ids that never had a collider
    pub fn collider_state(&self, id: EntityId) -> Option<ColliderState> {
        if self.collision.is_registered(id) {
            Some(ColliderState::Registered)
        } else if self.components.contains_key(&id) {
            Some(ColliderState::Unregistered)
        } else if self.ids.was_allocated(id) && !self.entities.contains(id) {
            Some(ColliderState::Destroyed)
        } else {
            None
        }
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerData> {
        self.entities.get(id).and_then(Entity::as_player)
    }

    /// Deliver every queued message, including ones posted while delivering
    pub fn dispatch_messages(&mut self) {
        while let Some(envelope) = self.mailbox.pop() {
            self.deliver(envelope);
        }
    }

    fn deliver(&mut self, envelope: Envelope) {
        let Envelope {
            target,
            message,
            time,
        } = envelope;

        match message {
            Message::Fire { direction } => {
                let ready = self
                    .player(target)
                    .is_some_and(|p| p.is_alive() && p.fire_cooldown == 0);
                if ready && self.spawn_projectile(target, direction).is_some() {
                    let cooldown = self.config.player.fire_cooldown_ticks;
                    if let Some(p) = self.player_mut(target) {
                        p.fire_cooldown = cooldown;
                    }
                }
            }
            Message::Dash => {
                let tuning = self.config.player.clone();
                let Some(entity) = self.entities.get_mut(target) else {
                    return;
                };
                let Some(p) = entity.as_player_mut() else {
                    return;
                };
                if p.is_alive() && !p.is_dashing() && p.dash_cooldown == 0 {
                    p.dash_ticks = tuning.dash_ticks;
                    p.dash_cooldown = tuning.dash_cooldown_ticks;
                    entity.velocity *= tuning.dash_multiplier;
                    log::debug!("{} dashes", target);
                }
            }
            Message::ItemPickup { item, kind } => {
                if let Some(p) = self.player_mut(target) {
                    match kind {
                        ItemKind::Coins(n) => p.coins = p.coins.saturating_add(n),
                        ItemKind::Health(n) => {
                            p.health = p.health.saturating_add(n).min(p.max_health)
                        }
                    }
                    log::debug!("{} picked up {} ({:?})", target, item, kind);
                }
            }
            Message::DropCoins { position, count } => {
                if count > 0 {
                    self.spawn_item(position, ItemKind::Coins(count));
                }
            }
            Message::Damaged { amount, source } => {
                log::debug!("{} took {} damage from {}", target, amount, source);
            }
            Message::Killed { by } => self.handle_kill(target, by, time),
        }
    }

    /// Credit the killer, spill the victim's coins and respawn it
    fn handle_kill(&mut self, victim: EntityId, killer: EntityId, time: GameTime) {
        if killer != victim {
            if let Some(p) = self.player_mut(killer) {
                p.kills += 1;
            }
        }

        let max_health = self.config.player.max_health;
        let Some(entity) = self.entities.get_mut(victim) else {
            return;
        };
        let drop_at = entity.center();
        let Some(p) = entity.as_player_mut() else {
            return;
        };
        let coins = std::mem::take(&mut p.coins);
        p.deaths += 1;
        p.health = max_health;
        p.dash_ticks = 0;
        p.dash_cooldown = 0;
        p.fire_cooldown = 0;
        let spawn = p.spawn;
        entity.position = spawn;
        entity.velocity = Vec2::ZERO;

        log::info!(
            "Tick {}: {} killed by {}, dropped {} coins",
            time.tick,
            victim,
            killer,
            coins
        );
        self.mailbox.broadcast(
            victim,
            Message::DropCoins {
                position: drop_at,
                count: coins,
            },
            time,
        );
    }

    fn player_mut(&mut self, id: EntityId) -> Option<&mut PlayerData> {
        self.entities.get_mut(id).and_then(Entity::as_player_mut)
    }
}
