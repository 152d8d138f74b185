//! Run State
//!
//! Entity registry for a single run. Entities are addressed by monotonic
//! `EntityId` handles and kept in a BTreeMap for deterministic iteration.
//! Removal is two-phase: an entity is marked during contact processing and
//! reclaimed by [`RunState::cleanup`] at the end of the tick, so a handle
//! stays valid for the whole tick that removed it.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::core::hash::{compute_state_hash, StateHash, StateHasher};
use crate::core::vec3::Vec3;
use crate::game::config::SkierConfig;
use crate::game::events::GameEvent;
use crate::game::motion::MotionController;

// =============================================================================
// ENTITY ID
// =============================================================================

/// Index-based entity handle. Never reused within a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

// =============================================================================
// TAGS AND ROLES
// =============================================================================

/// Tag used by contact filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tag {
    /// The controlled skier
    Player = 0,
    /// Something to hit
    Obstacle = 1,
    /// Scenery
    Untagged = 2,
}

/// Obstacle behaviour on contact.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Pass-through; removes itself when the skier touches it
    Plain,
    /// Pass-through; slows the skier, then removes itself
    Slowdown {
        /// Speed factor applied on hit, in [0, 1]
        factor: f32,
    },
    /// Solid; knocks the skier back and stays in place
    Knockback,
}

impl ObstacleKind {
    /// Single-use obstacles remove themselves on their first hit.
    pub fn is_one_shot(self) -> bool {
        !matches!(self, ObstacleKind::Knockback)
    }

    pub(crate) fn discriminant(self) -> u8 {
        match self {
            ObstacleKind::Plain => 0,
            ObstacleKind::Slowdown { .. } => 1,
            ObstacleKind::Knockback => 2,
        }
    }
}

/// What an entity is.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityRole {
    /// A controllable skier
    Skier(Box<MotionController>),
    /// An obstacle on the slope
    Obstacle(ObstacleKind),
    /// Anything else (carries a tag but no behaviour)
    Prop,
}

/// A registered entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Handle
    pub id: EntityId,
    /// Contact tag
    pub tag: Tag,
    /// Spawn position
    pub position: Vec3,
    /// Behaviour
    pub role: EntityRole,
    /// Marked for removal at the end of this tick
    pub pending_removal: bool,
}

impl Entity {
    /// Motion controller, if this entity is a skier.
    pub fn controller(&self) -> Option<&MotionController> {
        match &self.role {
            EntityRole::Skier(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Mutable motion controller, if this entity is a skier.
    pub fn controller_mut(&mut self) -> Option<&mut MotionController> {
        match &mut self.role {
            EntityRole::Skier(c) => Some(c.as_mut()),
            _ => None,
        }
    }

    /// Obstacle kind, if this entity is an obstacle.
    pub fn obstacle_kind(&self) -> Option<ObstacleKind> {
        match self.role {
            EntityRole::Obstacle(kind) => Some(kind),
            _ => None,
        }
    }

    /// Is this entity still taking part in the simulation?
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.pending_removal
    }
}

/// An entity reclaimed by [`RunState::cleanup`].
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedEntity {
    /// Former handle
    pub id: EntityId,
    /// Its tag
    pub tag: Tag,
    /// Obstacle kind, if it was one
    pub obstacle: Option<ObstacleKind>,
}

// =============================================================================
// RUN STATE
// =============================================================================

/// Complete state of a run.
#[derive(Clone, Debug)]
pub struct RunState {
    /// Ticks simulated so far
    pub tick: u32,

    /// All entities (BTreeMap for deterministic iteration)
    pub entities: BTreeMap<EntityId, Entity>,

    /// Next entity ID (monotonic counter)
    pub next_entity_id: u32,

    /// Events generated this tick (drained by `take_events`)
    pub pending_events: Vec<GameEvent>,
}

impl RunState {
    /// Create an empty run.
    pub fn new() -> Self {
        Self {
            tick: 0,
            entities: BTreeMap::new(),
            next_entity_id: 0,
            pending_events: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn insert(&mut self, tag: Tag, position: Vec3, role: EntityRole) -> EntityId {
        let id = self.allocate_id();
        self.entities.insert(
            id,
            Entity { id, tag, position, role, pending_removal: false },
        );
        id
    }

    /// Spawn a player-tagged skier.
    pub fn spawn_skier(&mut self, position: Vec3, config: SkierConfig) -> EntityId {
        let controller = MotionController::new(config);
        self.insert(Tag::Player, position, EntityRole::Skier(Box::new(controller)))
    }

    /// Spawn an obstacle-tagged obstacle.
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, position: Vec3) -> EntityId {
        let id = self.insert(Tag::Obstacle, position, EntityRole::Obstacle(kind));
        self.push_event(GameEvent::obstacle_spawned(self.tick, id, kind, position));
        id
    }

    /// Spawn a behaviourless entity with an arbitrary tag.
    pub fn spawn_prop(&mut self, tag: Tag, position: Vec3) -> EntityId {
        self.insert(tag, position, EntityRole::Prop)
    }

    /// Get an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Motion controller of a skier.
    pub fn controller(&self, id: EntityId) -> Option<&MotionController> {
        self.entities.get(&id).and_then(Entity::controller)
    }

    /// Mutable motion controller of a skier.
    pub fn controller_mut(&mut self, id: EntityId) -> Option<&mut MotionController> {
        self.entities.get_mut(&id).and_then(Entity::controller_mut)
    }

    /// IDs of every live skier, in ID order.
    pub fn skier_ids(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.is_live() && e.controller().is_some())
            .map(|e| e.id)
            .collect()
    }

    /// Mark an entity for removal.
    ///
    /// Returns `true` only for the call that did the marking; unknown or
    /// already-marked entities return `false`.
    pub fn mark_for_removal(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if !entity.pending_removal => {
                entity.pending_removal = true;
                true
            }
            _ => false,
        }
    }

    /// Reclaim every marked entity.
    pub fn cleanup(&mut self) -> Vec<RemovedEntity> {
        let doomed: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.pending_removal)
            .map(|e| e.id)
            .collect();

        doomed
            .into_iter()
            .filter_map(|id| self.entities.remove(&id))
            .map(|e| RemovedEntity { id: e.id, tag: e.tag, obstacle: e.obstacle_kind() })
            .collect()
    }

    /// Number of registered entities (including ones pending removal).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            hasher.update_u32(self.next_entity_id);
            for entity in self.entities.values() {
                hash_entity(entity, hasher);
            }
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_entity(entity: &Entity, hasher: &mut StateHasher) {
    hasher.update_u32(entity.id.0);
    hasher.update_u8(entity.tag as u8);
    hasher.update_vec3(entity.position);
    hasher.update_bool(entity.pending_removal);
    match &entity.role {
        EntityRole::Skier(controller) => {
            hasher.update_u8(0);
            controller.hash_into(hasher);
        }
        EntityRole::Obstacle(kind) => {
            hasher.update_u8(1);
            hasher.update_u8(kind.discriminant());
            if let ObstacleKind::Slowdown { factor } = kind {
                hasher.update_f32(*factor);
            }
        }
        EntityRole::Prop => hasher.update_u8(2),
    }
}

// =============================================================================
// TESTS
// =============================================================================
