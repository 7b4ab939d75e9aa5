//! Messages broadcast from an entity to its own components
//!
//! Collision responses and player commands never call into other components
//! directly; they post a `Message` addressed to an entity and the world
//! dispatches the queue at fixed points in the tick.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::GameTime;
use super::entity::{EntityId, ItemKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Fire a projectile in `direction` (normalized by the receiver)
    Fire { direction: Vec2 },
    /// Start a dash if off cooldown
    Dash,
    /// The entity touched an item
    ItemPickup { item: EntityId, kind: ItemKind },
    /// Spill coins at a position
    DropCoins { position: Vec2, count: u32 },
    /// Health was reduced by `amount`
    Damaged { amount: u32, source: EntityId },
    /// Health reached zero
    Killed { by: EntityId },
}

/// A message in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub target: EntityId,
    pub message: Message,
    pub time: GameTime,
}

/// FIFO queue of broadcast messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mailbox {
    queue: VecDeque<Envelope>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcast(&mut self, target: EntityId, message: Message, time: GameTime) {
        log::trace!("{} <- {:?}", target, message);
        self.queue.push_back(Envelope {
            target,
            message,
            time,
        });
    }

    pub fn pop(&mut self) -> Option<Envelope> {
        self.queue.pop_front()
    }

    /// Messages waiting for `target`, oldest first
    pub fn pending_for(&self, target: EntityId) -> impl Iterator<Item = &Message> {
        self.queue
            .iter()
            .filter(move |e| e.target == target)
            .map(|e| &e.message)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
