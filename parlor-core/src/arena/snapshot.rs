use crate::arena::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Continuous entities in the duel arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EntityId {
    /// Starter's paddle (left half)
    PaddleStarter,
    /// Responder's paddle (right half)
    PaddleResponder,
    Ball,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::PaddleStarter => write!(f, "paddle-starter"),
            EntityId::PaddleResponder => write!(f, "paddle-responder"),
            EntityId::Ball => write!(f, "ball"),
        }
    }
}

/// Position and velocity of one entity at snapshot time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl EntityState {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            vx: vel.x,
            vy: vel.y,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }
}

/// Point-in-time capture of all continuous entities, emitted by the
/// authoritative side at a bounded interval. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub entities: BTreeMap<EntityId, EntityState>,
    /// Authoritative simulation clock, milliseconds
    pub timestamp_ms: u64,
}

impl ArenaSnapshot {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            entities: BTreeMap::new(),
            timestamp_ms,
        }
    }

    pub fn with_entity(mut self, id: EntityId, state: EntityState) -> Self {
        self.entities.insert(id, state);
        self
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let snap = ArenaSnapshot::new(1234)
            .with_entity(
                EntityId::Ball,
                EntityState::new(Vec2::new(1.0, 2.0), Vec2::new(-3.0, 0.5)),
            )
            .with_entity(
                EntityId::PaddleStarter,
                EntityState::new(Vec2::new(5.0, 6.0), Vec2::ZERO),
            );

        let json = serde_json::to_string(&snap).unwrap();
        let back: ArenaSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back, snap);
        assert_eq!(back.get(EntityId::Ball).unwrap().position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_entity_ordering_is_stable() {
        // BTreeMap keys serialize in a fixed order
        let snap = ArenaSnapshot::new(0)
            .with_entity(EntityId::Ball, EntityState::default())
            .with_entity(EntityId::PaddleStarter, EntityState::default());

        let keys: Vec<EntityId> = snap.entities.keys().copied().collect();
        assert_eq!(keys, vec![EntityId::PaddleStarter, EntityId::Ball]);
    }
}
