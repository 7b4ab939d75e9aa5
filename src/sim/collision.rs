//! Collision system: collider registry and broad-phase entry point
//!
//! Per tick the system rebuilds its spatial grid from every registered entity
//! (`update`), then moving colliders ask it for nearby candidates
//! (`check_collisions`). The grid and the registry are only mutated here;
//! colliders reach the rest of the world through a `CollisionContext`.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::GameTime;
use super::collider::Collider;
use super::entity::{Entities, Entity, EntityId};
use super::grid::SpatialGrid;
use super::message::{Mailbox, Message};
use super::rect::Rect;
use crate::config::{ConfigError, GridConfig};

/// Mutable world access handed to collision responses
///
/// Destruction is deferred: responses request it and the world applies the
/// requests after every collider of the tick has run, so the registry is not
/// mutated while it is being queried.
pub struct CollisionContext<'a> {
    pub entities: &'a mut Entities,
    pub mailbox: &'a mut Mailbox,
    pending_destroy: BTreeSet<EntityId>,
}

impl<'a> CollisionContext<'a> {
    pub fn new(entities: &'a mut Entities, mailbox: &'a mut Mailbox) -> Self {
        Self {
            entities,
            mailbox,
            pending_destroy: BTreeSet::new(),
        }
    }

    pub fn broadcast(&mut self, target: EntityId, message: Message, time: GameTime) {
        self.mailbox.broadcast(target, message, time);
    }

    pub fn request_destroy(&mut self, id: EntityId) {
        if self.pending_destroy.insert(id) {
            log::debug!("{} scheduled for destruction", id);
        }
    }

    pub fn is_pending_destroy(&self, id: EntityId) -> bool {
        self.pending_destroy.contains(&id)
    }

    pub fn into_pending_destroy(self) -> BTreeSet<EntityId> {
        self.pending_destroy
    }

    /// Reduce a player's health, posting `Damaged` and, on the killing blow,
    /// `Killed`. Returns true if this hit killed the target.
    pub fn apply_damage(
        &mut self,
        target: EntityId,
        source: EntityId,
        amount: u32,
        time: GameTime,
    ) -> bool {
        let Some(victim) = self.entities.get_mut(target).and_then(Entity::as_player_mut) else {
            return false;
        };
        if !victim.is_alive() || amount == 0 {
            return false;
        }

        let dealt = amount.min(victim.health);
        victim.health -= dealt;
        let killed = victim.health == 0;
        log::debug!("{} hit {} for {} ({} hp left)", source, target, dealt, victim.health);

        self.broadcast(target, Message::Damaged { amount: dealt, source }, time);
        if killed {
            self.broadcast(target, Message::Killed { by: source }, time);
        }
        killed
    }
}

/// Registry of collision participants plus the spatial index over them
#[derive(Debug)]
pub struct CollisionSystem {
    grid: SpatialGrid,
    colliders: BTreeMap<EntityId, Rc<dyn Collider>>,
}

impl CollisionSystem {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: SpatialGrid::new(config)?,
            colliders: BTreeMap::new(),
        })
    }

    /// Bind `collider` to `id`, replacing any previous binding.
    /// Takes effect in the grid at the next `update`.
    pub fn register(&mut self, id: EntityId, collider: Rc<dyn Collider>) {
        if self.colliders.insert(id, collider).is_some() {
            log::debug!("{} re-registered, previous collider replaced", id);
        } else {
            log::trace!("{} registered", id);
        }
    }

    /// Remove the binding for `id`. Unknown ids are ignored.
    pub fn unregister(&mut self, id: EntityId) -> bool {
        let removed = self.colliders.remove(&id).is_some();
        if removed {
            log::trace!("{} unregistered", id);
        }
        removed
    }

    pub fn is_registered(&self, id: EntityId) -> bool {
        self.colliders.contains_key(&id)
    }

    /// The entity registered under `id`, if it is both registered and alive
    pub fn game_object<'e>(&self, id: EntityId, entities: &'e Entities) -> Option<&'e Entity> {
        if !self.is_registered(id) {
            return None;
        }
        entities.get(id)
    }

    pub fn collider(&self, id: EntityId) -> Option<&Rc<dyn Collider>> {
        self.colliders.get(&id)
    }

    /// Registered colliders in id order
    pub fn colliders(&self) -> impl Iterator<Item = (EntityId, &dyn Collider)> {
        self.colliders.iter().map(|(id, c)| (*id, c.as_ref()))
    }

    /// Registered entities that are still alive, in id order
    pub fn game_objects<'e>(&'e self, entities: &'e Entities) -> impl Iterator<Item = &'e Entity> {
        self.colliders.keys().filter_map(|id| entities.get(*id))
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Rebuild the grid from every registered entity
    pub fn update(&mut self, entities: &Entities, time: GameTime) {
        self.grid.clear();
        let mut indexed = 0usize;
        for id in self.colliders.keys() {
            match entities.get(*id) {
                Some(entity) => {
                    self.grid.insert(entity);
                    indexed += 1;
                }
                None => log::debug!("{} registered but has no entity, skipped", id),
            }
        }
        log::trace!("Tick {}: indexed {} entities", time.tick, indexed);
    }

    /// Distinct registered neighbors of `entity`, excluding itself, in id order
    pub fn nearby(&self, entity: &Entity) -> Vec<EntityId> {
        self.nearby_in(&entity.bounds(), entity.id)
    }

    /// Distinct registered entities in the buckets `area` overlaps, except `me`
    pub fn nearby_in(&self, area: &Rect, me: EntityId) -> Vec<EntityId> {
        let mut candidates = self.grid.nearby_rect(area);
        candidates.sort_unstable();
        candidates.dedup();
        candidates.retain(|id| *id != me && self.is_registered(*id));
        candidates
    }

    /// Broad phase plus narrow phase for one collider.
    ///
    /// Each distinct candidate is tested once, so a response fires at most
    /// once per pair per call even when the two share several buckets.
    /// Candidates already scheduled for destruction are skipped, and the scan
    /// stops once the collider's own entity is scheduled. Returns the number
    /// of responses dispatched.
    pub fn check_collisions(
        &self,
        collider: &dyn Collider,
        ctx: &mut CollisionContext<'_>,
        time: GameTime,
    ) -> usize {
        let me = collider.entity_id();
        let candidates = match ctx.entities.get(me) {
            Some(entity) => self.nearby_in(&collider.query_bounds(entity), me),
            None => return 0,
        };

        let mut hits = 0;
        for other in candidates {
            if ctx.is_pending_destroy(me) {
                break;
            }
            if ctx.is_pending_destroy(other) {
                continue;
            }
            let hit = match (ctx.entities.get(me), ctx.entities.get(other)) {
                (Some(this), Some(that)) => collider.is_collision(this, that),
                _ => false,
            };
            if hit {
                log::debug!("Tick {}: {} collides with {}", time.tick, me, other);
                collider.collide(other, ctx, time);
                hits += 1;
            }
        }
        hits
    }
}
