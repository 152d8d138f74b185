//! Game Events
//!
//! Events generated during simulation for logging, presentation and replay
//! comparison.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::core::vec3::Vec3;
use crate::game::state::{EntityId, ObstacleKind};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Hits first
    Hit = 0,
    /// Then removals
    Removal = 1,
    /// Then effect expiries and boosts
    Effect = 2,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// An obstacle was placed on the slope
    ObstacleSpawned {
        obstacle_id: EntityId,
        kind: ObstacleKind,
        position: Vec3,
    },

    /// An obstacle was reclaimed after a hit
    ObstacleRemoved {
        obstacle_id: EntityId,
        kind: ObstacleKind,
    },

    /// A skier hit a slowdown obstacle
    SlowdownApplied {
        skier_id: EntityId,
        factor: f32,
    },

    /// A skier is back to full speed after a slowdown
    SlowdownRecovered {
        skier_id: EntityId,
    },

    /// A skier hit something solid
    KnockbackStarted {
        skier_id: EntityId,
    },

    /// A skier may move again
    KnockbackEnded {
        skier_id: EntityId,
    },

    /// A skier started boosting
    BoostStarted {
        skier_id: EntityId,
    },

    /// A skier's boost ran out
    BoostEnded {
        skier_id: EntityId,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Entity involved (for tie-breaking)
    pub entity: EntityId,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let entity = match &data {
            GameEventData::ObstacleSpawned { obstacle_id, .. } => *obstacle_id,
            GameEventData::ObstacleRemoved { obstacle_id, .. } => *obstacle_id,
            GameEventData::SlowdownApplied { skier_id, .. }
            | GameEventData::SlowdownRecovered { skier_id }
            | GameEventData::KnockbackStarted { skier_id }
            | GameEventData::KnockbackEnded { skier_id }
            | GameEventData::BoostStarted { skier_id }
            | GameEventData::BoostEnded { skier_id } => *skier_id,
        };

        Self { tick, priority, entity, data }
    }

    /// Create obstacle spawned event.
    pub fn obstacle_spawned(tick: u32, obstacle_id: EntityId, kind: ObstacleKind, position: Vec3) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::ObstacleSpawned { obstacle_id, kind, position },
        )
    }

    /// Create obstacle removed event.
    pub fn obstacle_removed(tick: u32, obstacle_id: EntityId, kind: ObstacleKind) -> Self {
        Self::new(
            tick,
            EventPriority::Removal,
            GameEventData::ObstacleRemoved { obstacle_id, kind },
        )
    }

    /// Create slowdown applied event.
    pub fn slowdown_applied(tick: u32, skier_id: EntityId, factor: f32) -> Self {
        Self::new(tick, EventPriority::Hit, GameEventData::SlowdownApplied { skier_id, factor })
    }

    /// Create knockback started event.
    pub fn knockback_started(tick: u32, skier_id: EntityId) -> Self {
        Self::new(tick, EventPriority::Hit, GameEventData::KnockbackStarted { skier_id })
    }

    /// Create slowdown recovered event.
    pub fn slowdown_recovered(tick: u32, skier_id: EntityId) -> Self {
        Self::new(tick, EventPriority::Effect, GameEventData::SlowdownRecovered { skier_id })
    }

    /// Create knockback ended event.
    pub fn knockback_ended(tick: u32, skier_id: EntityId) -> Self {
        Self::new(tick, EventPriority::Effect, GameEventData::KnockbackEnded { skier_id })
    }

    /// Create boost started event.
    pub fn boost_started(tick: u32, skier_id: EntityId) -> Self {
        Self::new(tick, EventPriority::Effect, GameEventData::BoostStarted { skier_id })
    }

    /// Create boost ended event.
    pub fn boost_ended(tick: u32, skier_id: EntityId) -> Self {
        Self::new(tick, EventPriority::Effect, GameEventData::BoostEnded { skier_id })
    }
}

impl GameEventData {
    fn rank(&self) -> u8 {
        match self {
            GameEventData::ObstacleSpawned { .. } => 0,
            GameEventData::ObstacleRemoved { .. } => 1,
            GameEventData::SlowdownApplied { .. } => 2,
            GameEventData::SlowdownRecovered { .. } => 3,
            GameEventData::KnockbackStarted { .. } => 4,
            GameEventData::KnockbackEnded { .. } => 5,
            GameEventData::BoostStarted { .. } => 6,
            GameEventData::BoostEnded { .. } => 7,
        }
    }

    /// Total order over payloads. Floats compare by `total_cmp`.
    fn total_cmp(&self, other: &Self) -> Ordering {
        use GameEventData::*;

        match (self, other) {
            (
                ObstacleSpawned { obstacle_id: a, kind: ka, position: pa },
                ObstacleSpawned { obstacle_id: b, kind: kb, position: pb },
            ) => a
                .cmp(b)
                .then(cmp_kind(*ka, *kb))
                .then(pa.x.total_cmp(&pb.x))
                .then(pa.y.total_cmp(&pb.y))
                .then(pa.z.total_cmp(&pb.z)),
            (
                ObstacleRemoved { obstacle_id: a, kind: ka },
                ObstacleRemoved { obstacle_id: b, kind: kb },
            ) => a.cmp(b).then(cmp_kind(*ka, *kb)),
            (
                SlowdownApplied { skier_id: a, factor: fa },
                SlowdownApplied { skier_id: b, factor: fb },
            ) => a.cmp(b).then(fa.total_cmp(fb)),
            (SlowdownRecovered { skier_id: a }, SlowdownRecovered { skier_id: b })
            | (KnockbackStarted { skier_id: a }, KnockbackStarted { skier_id: b })
            | (KnockbackEnded { skier_id: a }, KnockbackEnded { skier_id: b })
            | (BoostStarted { skier_id: a }, BoostStarted { skier_id: b })
            | (BoostEnded { skier_id: a }, BoostEnded { skier_id: b }) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn cmp_kind(a: ObstacleKind, b: ObstacleKind) -> Ordering {
    match (a, b) {
        (ObstacleKind::Slowdown { factor: fa }, ObstacleKind::Slowdown { factor: fb }) => {
            fa.total_cmp(&fb)
        }
        _ => a.discriminant().cmp(&b.discriminant()),
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Sort by: tick, then priority, then entity, then payload
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.entity.cmp(&other.entity))
            .then_with(|| self.data.total_cmp(&other.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let skier = EntityId(1);
        let rock = EntityId(2);

        let hit = GameEvent::knockback_started(10, skier);
        let removal = GameEvent::obstacle_removed(10, rock, ObstacleKind::Plain);
        let later = GameEvent::slowdown_applied(11, skier, 0.5);

        // Same tick, hits before removals
        assert!(hit < removal);
        assert!(removal < later);

        let mut events = vec![later.clone(), removal.clone(), hit.clone()];
        events.sort();
        assert_eq!(events, vec![hit, removal, later]);
    }

    #[test]
    fn test_equality_covers_payload() {
        let skier = EntityId(1);
        let half = GameEvent::slowdown_applied(5, skier, 0.5);
        let third = GameEvent::slowdown_applied(5, skier, 0.3);
        assert_ne!(half, third);
        assert!(third < half);
        assert_eq!(half, GameEvent::slowdown_applied(5, skier, 0.5));

        let plain = GameEvent::obstacle_removed(5, EntityId(2), ObstacleKind::Plain);
        let flag = GameEvent::obstacle_removed(5, EntityId(2), ObstacleKind::Slowdown { factor: 0.5 });
        assert_ne!(plain, flag);

        // Same key, different variant
        assert_ne!(GameEvent::boost_started(5, skier), GameEvent::boost_ended(5, skier));
    }

    #[test]
    fn test_entity_extracted() {
        let event = GameEvent::boost_ended(3, EntityId(4));
        assert_eq!(event.entity, EntityId(4));
        assert_eq!(event.priority, EventPriority::Effect);
    }
}
