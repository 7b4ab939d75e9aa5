//! Collider components
//!
//! A collider answers two questions for its entity: "do I intersect X?"
//! (`is_collision`, the narrow phase) and "what happens when I do?"
//! (`collide`). Each entity role gets its own collider type.
//!
//! Narrow-phase policy by role:
//! - simple, tile, item: current bounds against current bounds
//! - player, projectile: projected bounds (one tick ahead) against the other's
//!   current bounds, so movers stop or hit before overlapping. Their broad
//!   phase covers the swept area, which can reach into a neighboring cell.
//!
//! Lifecycle: unregistered -> registered -> destroyed. `initialize` and
//! `destroy` move a collider through it; a destroyed collider must not be used
//! again.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;

use super::GameTime;
use super::collision::{CollisionContext, CollisionSystem};
use super::entity::{Entity, EntityId, EntityKind, ItemKind};
use super::message::Message;
use super::rect::Rect;
use crate::consts::DASH_DAMAGE;

/// Where a collider is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderState {
    /// Attached but not taking part in collision (e.g. passable tiles)
    Unregistered,
    Registered,
    /// Torn down; the id will never be reused
    Destroyed,
}

pub trait Collider: fmt::Debug {
    /// The owning entity (fixed at construction)
    fn entity_id(&self) -> EntityId;

    /// Whether `initialize` should register this collider for `entity`
    fn registers(&self, _entity: &Entity) -> bool {
        true
    }

    /// Area the broad phase searches for candidates
    fn query_bounds(&self, this: &Entity) -> Rect {
        this.bounds()
    }

    /// Narrow-phase test. Never true for the entity itself.
    fn is_collision(&self, this: &Entity, other: &Entity) -> bool {
        this.id != other.id && this.bounds().intersects(&other.bounds())
    }

    /// Role-specific response to touching `other`
    fn collide(&self, other: EntityId, ctx: &mut CollisionContext<'_>, time: GameTime);
}

/// Register `collider` if its role allows it for `entity`
pub fn initialize(
    collider: Rc<dyn Collider>,
    entity: &Entity,
    system: &mut CollisionSystem,
) -> ColliderState {
    if collider.registers(entity) {
        system.register(entity.id, collider);
        ColliderState::Registered
    } else {
        log::trace!("{} collider stays unregistered", entity.id);
        ColliderState::Unregistered
    }
}

/// Motion-gated per-tick step: only a moving entity runs a collision check.
///
/// The velocity test is exact; any non-zero component counts as moving.
pub fn update(
    collider: &dyn Collider,
    system: &CollisionSystem,
    ctx: &mut CollisionContext<'_>,
    time: GameTime,
) -> usize {
    match ctx.entities.get(collider.entity_id()) {
        Some(entity) if entity.is_moving() => system.check_collisions(collider, ctx, time),
        _ => 0,
    }
}

/// Unregister `collider`. Terminal.
pub fn destroy(collider: &dyn Collider, system: &mut CollisionSystem) -> ColliderState {
    system.unregister(collider.entity_id());
    ColliderState::Destroyed
}

/// Plain bounds test with no response
#[derive(Debug, Clone)]
pub struct SimpleCollider {
    entity: EntityId,
}

impl SimpleCollider {
    pub fn new(entity: EntityId) -> Self {
        Self { entity }
    }
}

impl Collider for SimpleCollider {
    fn entity_id(&self) -> EntityId {
        self.entity
    }

    fn collide(&self, _other: EntityId, _ctx: &mut CollisionContext<'_>, _time: GameTime) {}
}

/// Tiles only take part in collision when they block movement
#[derive(Debug, Clone)]
pub struct TileCollider {
    entity: EntityId,
}

impl TileCollider {
    pub fn new(entity: EntityId) -> Self {
        Self { entity }
    }
}

impl Collider for TileCollider {
    fn entity_id(&self) -> EntityId {
        self.entity
    }

    fn registers(&self, entity: &Entity) -> bool {
        entity.is_blocking_tile()
    }

    fn collide(&self, _other: EntityId, _ctx: &mut CollisionContext<'_>, _time: GameTime) {}
}

/// Items are passive; the player collider handles pickup
#[derive(Debug, Clone)]
pub struct ItemCollider {
    entity: EntityId,
}

impl ItemCollider {
    pub fn new(entity: EntityId) -> Self {
        Self { entity }
    }
}

impl Collider for ItemCollider {
    fn entity_id(&self) -> EntityId {
        self.entity
    }

    fn collide(&self, _other: EntityId, _ctx: &mut CollisionContext<'_>, _time: GameTime) {}
}

/// What a player ran into
enum PlayerContact {
    Wall,
    Item(ItemKind),
    Player { alive: bool },
    Ignore,
}

#[derive(Debug, Clone)]
pub struct PlayerCollider {
    entity: EntityId,
}

impl PlayerCollider {
    pub fn new(entity: EntityId) -> Self {
        Self { entity }
    }

    fn stop(&self, ctx: &mut CollisionContext<'_>) {
        if let Some(me) = ctx.entities.get_mut(self.entity) {
            me.velocity = Vec2::ZERO;
        }
    }

    fn is_dashing(&self, ctx: &CollisionContext<'_>) -> bool {
        ctx.entities
            .get(self.entity)
            .and_then(Entity::as_player)
            .is_some_and(|p| p.is_dashing())
    }
}

impl Collider for PlayerCollider {
    fn entity_id(&self) -> EntityId {
        self.entity
    }

    fn query_bounds(&self, this: &Entity) -> Rect {
        this.swept_bounds()
    }

    fn is_collision(&self, this: &Entity, other: &Entity) -> bool {
        this.id != other.id && this.projected_bounds().intersects(&other.bounds())
    }

    /// Walls stop the player, items get picked up, and other players either
    /// block (normal movement) or take a hit (while dashing).
    fn collide(&self, other: EntityId, ctx: &mut CollisionContext<'_>, time: GameTime) {
        let contact = match ctx.entities.get(other) {
            Some(e) if e.is_blocking_tile() => PlayerContact::Wall,
            Some(Entity {
                kind: EntityKind::Item(item),
                ..
            }) => PlayerContact::Item(item.kind),
            Some(Entity {
                kind: EntityKind::Player(p),
                ..
            }) => PlayerContact::Player {
                alive: p.is_alive(),
            },
            _ => PlayerContact::Ignore,
        };

        match contact {
            PlayerContact::Wall => self.stop(ctx),
            PlayerContact::Item(kind) => {
                if ctx.is_pending_destroy(other) {
                    return;
                }
                ctx.broadcast(self.entity, Message::ItemPickup { item: other, kind }, time);
                ctx.request_destroy(other);
            }
            PlayerContact::Player { alive } => {
                if alive && self.is_dashing(ctx) {
                    ctx.apply_damage(other, self.entity, DASH_DAMAGE, time);
                } else {
                    self.stop(ctx);
                }
            }
            PlayerContact::Ignore => {}
        }
    }
}

/// Damages the first player it reaches and dies on any solid contact.
/// Never touches the player that fired it.
#[derive(Debug, Clone)]
pub struct ProjectileCollider {
    entity: EntityId,
    parent: EntityId,
}

impl ProjectileCollider {
    pub fn new(entity: EntityId, parent: EntityId) -> Self {
        Self { entity, parent }
    }

}

impl Collider for ProjectileCollider {
    fn entity_id(&self) -> EntityId {
        self.entity
    }

    fn query_bounds(&self, this: &Entity) -> Rect {
        this.swept_bounds()
    }

    fn is_collision(&self, this: &Entity, other: &Entity) -> bool {
        if other.id == this.id || other.id == self.parent {
            return false;
        }
        this.projected_bounds().intersects(&other.bounds())
    }

    fn collide(&self, other: EntityId, ctx: &mut CollisionContext<'_>, time: GameTime) {
        if other == self.parent {
            return;
        }
        let (is_player, is_wall) = match ctx.entities.get(other) {
            Some(e) => (e.as_player().is_some(), e.is_blocking_tile()),
            None => return,
        };
        let damage = match ctx.entities.get(self.entity).map(|e| &e.kind) {
            Some(EntityKind::Projectile(p)) => p.damage,
            _ => 1,
        };

        if is_player {
            ctx.apply_damage(other, self.parent, damage, time);
            ctx.request_destroy(self.entity);
        } else if is_wall {
            ctx.request_destroy(self.entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::sim::entity::{
        Entities, ItemData, PlayerData, ProjectileData, TileData, TileInteraction,
    };
    use crate::sim::message::Mailbox;

    fn player(id: u32, x: f32, y: f32) -> Entity {
        Entity::new(
            EntityId(id),
            Vec2::new(x, y),
            Vec2::splat(10.0),
            EntityKind::Player(PlayerData::new(3, Vec2::new(x, y))),
        )
    }

    fn tile(id: u32, x: f32, y: f32, interaction: TileInteraction) -> Entity {
        Entity::new(
            EntityId(id),
            Vec2::new(x, y),
            Vec2::splat(10.0),
            EntityKind::Tile(TileData { interaction }),
        )
    }

    fn projectile(id: u32, parent: u32, x: f32, y: f32) -> Entity {
        Entity::new(
            EntityId(id),
            Vec2::new(x, y),
            Vec2::splat(4.0),
            EntityKind::Projectile(ProjectileData {
                parent: EntityId(parent),
                damage: 1,
                ttl_ticks: 10,
            }),
        )
    }

    fn system() -> CollisionSystem {
        CollisionSystem::new(GridConfig::new(200.0, 200.0, 50.0)).unwrap()
    }

    fn health(entities: &Entities, id: u32) -> u32 {
        entities
            .get(EntityId(id))
            .and_then(Entity::as_player)
            .map(|p| p.health)
            .unwrap()
    }

    #[test]
    fn test_tile_registers_only_when_blocking() {
        let mut sys = system();
        let wall = tile(1, 0.0, 0.0, TileInteraction::Blocking);
        let floor = tile(2, 20.0, 0.0, TileInteraction::Passable);

        let state = initialize(Rc::new(TileCollider::new(wall.id)), &wall, &mut sys);
        assert_eq!(state, ColliderState::Registered);
        let state = initialize(Rc::new(TileCollider::new(floor.id)), &floor, &mut sys);
        assert_eq!(state, ColliderState::Unregistered);

        assert!(sys.is_registered(wall.id));
        assert!(!sys.is_registered(floor.id));
    }

    #[test]
    fn test_destroy_unregisters() {
        let mut sys = system();
        let item = Entity::new(
            EntityId(1),
            Vec2::ZERO,
            Vec2::splat(5.0),
            EntityKind::Item(ItemData {
                kind: ItemKind::Coins(1),
            }),
        );
        let collider: Rc<dyn Collider> = Rc::new(ItemCollider::new(item.id));
        initialize(collider.clone(), &item, &mut sys);
        assert_eq!(destroy(collider.as_ref(), &mut sys), ColliderState::Destroyed);
        assert!(!sys.is_registered(item.id));
    }

    #[test]
    fn test_stationary_entity_never_checks() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut sys = system();
        let mut me = player(1, 0.0, 0.0);
        me.velocity = Vec2::ZERO;
        entities.insert(me);
        entities.insert(tile(2, 0.0, 0.0, TileInteraction::Blocking));
        let collider = PlayerCollider::new(EntityId(1));
        sys.register(EntityId(1), Rc::new(collider.clone()));
        sys.register(EntityId(2), Rc::new(TileCollider::new(EntityId(2))));
        sys.update(&entities, GameTime::default());

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        assert_eq!(update(&collider, &sys, &mut ctx, GameTime::default()), 0);
    }

    #[test]
    fn test_tiny_velocity_still_checks() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut sys = system();
        let mut me = player(1, 0.0, 0.0);
        me.velocity = Vec2::new(1e-30, 0.0);
        entities.insert(me);
        entities.insert(tile(2, 5.0, 0.0, TileInteraction::Blocking));
        let collider = PlayerCollider::new(EntityId(1));
        sys.register(EntityId(1), Rc::new(collider.clone()));
        sys.register(EntityId(2), Rc::new(TileCollider::new(EntityId(2))));
        sys.update(&entities, GameTime::default());

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        assert_eq!(update(&collider, &sys, &mut ctx, GameTime::default()), 1);
        assert_eq!(ctx.entities.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_player_stops_at_blocking_tile() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut me = player(1, 0.0, 0.0);
        me.velocity = Vec2::new(3.0, 0.0);
        entities.insert(me);
        // Current bounds touch only; projected bounds overlap
        let wall = tile(2, 11.0, 0.0, TileInteraction::Blocking);
        entities.insert(wall.clone());

        let collider = PlayerCollider::new(EntityId(1));
        let this = entities.get(EntityId(1)).unwrap();
        let that = entities.get(EntityId(2)).unwrap();
        assert!(!this.bounds().intersects(&that.bounds()));
        assert!(collider.is_collision(this, that));

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        assert_eq!(entities.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);

        let after = entities.get(EntityId(2)).unwrap();
        assert_eq!(after.position, wall.position);
        assert_eq!(after.velocity, wall.velocity);
        assert!(after.is_blocking_tile());
    }

    #[test]
    fn test_player_picks_up_item_once() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        entities.insert(player(1, 0.0, 0.0));
        entities.insert(Entity::new(
            EntityId(2),
            Vec2::new(2.0, 2.0),
            Vec2::splat(5.0),
            EntityKind::Item(ItemData {
                kind: ItemKind::Coins(4),
            }),
        ));

        let collider = PlayerCollider::new(EntityId(1));
        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        assert!(ctx.is_pending_destroy(EntityId(2)));
        drop(ctx);

        let pickups: Vec<_> = mailbox.pending_for(EntityId(1)).cloned().collect();
        assert_eq!(
            pickups,
            vec![Message::ItemPickup {
                item: EntityId(2),
                kind: ItemKind::Coins(4)
            }]
        );
    }

    #[test]
    fn test_dashing_player_damages_hostile() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut me = player(1, 0.0, 0.0);
        me.velocity = Vec2::new(5.0, 0.0);
        me.as_player_mut().unwrap().dash_ticks = 3;
        entities.insert(me);
        entities.insert(player(2, 12.0, 0.0));

        let collider = PlayerCollider::new(EntityId(1));
        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        assert_eq!(health(ctx.entities, 2), 2);
        assert_ne!(ctx.entities.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_walking_player_is_blocked_by_player() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut me = player(1, 0.0, 0.0);
        me.velocity = Vec2::new(5.0, 0.0);
        entities.insert(me);
        entities.insert(player(2, 12.0, 0.0));

        let collider = PlayerCollider::new(EntityId(1));
        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        assert_eq!(health(ctx.entities, 2), 3);
        assert_eq!(ctx.entities.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_projectile_damages_struck_player_and_self_destructs() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut sys = system();
        entities.insert(player(1, 100.0, 100.0)); // shooter
        entities.insert(player(2, 20.0, 0.0)); // target
        let mut shot = projectile(3, 1, 14.0, 3.0);
        shot.velocity = Vec2::new(4.0, 0.0);
        entities.insert(shot);

        let collider: Rc<dyn Collider> = Rc::new(ProjectileCollider::new(EntityId(3), EntityId(1)));
        for id in [1, 2] {
            sys.register(EntityId(id), Rc::new(PlayerCollider::new(EntityId(id))));
        }
        sys.register(EntityId(3), collider.clone());
        sys.update(&entities, GameTime::default());

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        let hits = update(collider.as_ref(), &sys, &mut ctx, GameTime::default());
        assert_eq!(hits, 1);
        assert_eq!(health(ctx.entities, 2), 2);
        assert_eq!(health(ctx.entities, 1), 3);
        assert!(ctx.is_pending_destroy(EntityId(3)));
    }

    #[test]
    fn test_projectile_ignores_parent() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        entities.insert(player(1, 0.0, 0.0));
        let mut shot = projectile(2, 1, 3.0, 3.0);
        shot.velocity = Vec2::new(4.0, 0.0);
        entities.insert(shot);

        let collider = ProjectileCollider::new(EntityId(2), EntityId(1));
        let this = entities.get(EntityId(2)).unwrap();
        let shooter = entities.get(EntityId(1)).unwrap();
        assert!(!collider.is_collision(this, shooter));

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(1), &mut ctx, GameTime::default());
        assert_eq!(health(ctx.entities, 1), 3);
        assert!(!ctx.is_pending_destroy(EntityId(2)));
    }

    #[test]
    fn test_projectile_dies_on_wall() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        entities.insert(projectile(1, 99, 0.0, 0.0));
        entities.insert(tile(2, 5.0, 0.0, TileInteraction::Blocking));

        let collider = ProjectileCollider::new(EntityId(1), EntityId(99));
        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        collider.collide(EntityId(2), &mut ctx, GameTime::default());
        assert!(ctx.is_pending_destroy(EntityId(1)));
        assert!(ctx.entities.get(EntityId(2)).is_some());
    }

    #[test]
    fn test_player_stops_at_wall_in_next_cell() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut sys = system();
        // Player fills x 38..48 (cell 0 only), wall fills 50..60 (cell 1 only)
        let mut me = player(1, 38.0, 0.0);
        me.velocity = Vec2::new(3.0, 0.0);
        entities.insert(me);
        entities.insert(tile(2, 50.0, 0.0, TileInteraction::Blocking));
        let collider: Rc<dyn Collider> = Rc::new(PlayerCollider::new(EntityId(1)));
        sys.register(EntityId(1), collider.clone());
        sys.register(EntityId(2), Rc::new(TileCollider::new(EntityId(2))));
        sys.update(&entities, GameTime::default());
        assert!(sys.nearby(entities.get(EntityId(1)).unwrap()).is_empty());

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        assert_eq!(update(collider.as_ref(), &sys, &mut ctx, GameTime::default()), 1);
        assert_eq!(ctx.entities.get(EntityId(1)).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_projectile_hits_player_in_next_cell() {
        let mut entities = Entities::new();
        let mut mailbox = Mailbox::new();
        let mut sys = system();
        entities.insert(player(1, 150.0, 150.0)); // shooter
        entities.insert(player(2, 50.0, 0.0)); // target, cell 1 only
        let mut shot = projectile(3, 1, 44.0, 2.0);
        shot.velocity = Vec2::new(4.0, 0.0);
        entities.insert(shot);

        let collider: Rc<dyn Collider> = Rc::new(ProjectileCollider::new(EntityId(3), EntityId(1)));
        for id in [1, 2] {
            sys.register(EntityId(id), Rc::new(PlayerCollider::new(EntityId(id))));
        }
        sys.register(EntityId(3), collider.clone());
        sys.update(&entities, GameTime::default());

        let mut ctx = CollisionContext::new(&mut entities, &mut mailbox);
        assert_eq!(update(collider.as_ref(), &sys, &mut ctx, GameTime::default()), 1);
        assert_eq!(health(ctx.entities, 2), 2);
        assert!(ctx.is_pending_destroy(EntityId(3)));
    }

    #[test]
    fn test_simple_collider_uses_current_bounds() {
        let a = player(1, 5.0, 5.0);
        let mut b = player(2, 4.0, 4.0);
        let collider = SimpleCollider::new(a.id);
        assert!(collider.is_collision(&a, &b));
        assert!(!collider.is_collision(&a, &a));

        // Moving away does not matter for the reactive test
        b.position = Vec2::new(40.0, 40.0);
        b.velocity = Vec2::new(-36.0, -36.0);
        assert!(!collider.is_collision(&a, &b));
    }
}
