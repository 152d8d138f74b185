//! Collision Reactions
//!
//! Maps host contact notifications to gameplay effects. Reactions never
//! touch a skier directly: they mark obstacles for removal and queue
//! [`ReactorCommand`]s that the tick applies once every contact has been
//! seen. Marking is idempotent, so a one-shot obstacle reported twice in
//! the same tick still fires once.
//!
//! | Obstacle          | Contact | Other tag | Effect                      |
//! |-------------------|---------|-----------|-----------------------------|
//! | `Plain`           | trigger | player    | remove self                 |
//! | `Slowdown`        | trigger | player    | slow skier, remove self     |
//! | any obstacle tag  | solid   | (skier)   | knock skier back, persist   |

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::vec3::Vec3;
use crate::game::host::Host;
use crate::game::state::{EntityId, EntityRole, ObstacleKind, RunState, Tag};

/// Horizontal radius of a skier for proximity contacts.
pub const SKIER_RADIUS: f32 = 0.5;

/// Horizontal radius of an obstacle for proximity contacts.
pub const OBSTACLE_RADIUS: f32 = 0.5;

/// How two bodies touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// Pass-through overlap, no physical response
    Trigger,
    /// Physically resolved collision
    Solid,
}

/// A contact-begin notification between two entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// First participant
    pub a: EntityId,
    /// Second participant
    pub b: EntityId,
    /// Contact style
    pub kind: ContactKind,
}

impl Contact {
    /// Trigger-style contact.
    pub fn trigger(a: EntityId, b: EntityId) -> Self {
        Self { a, b, kind: ContactKind::Trigger }
    }

    /// Solid contact.
    pub fn solid(a: EntityId, b: EntityId) -> Self {
        Self { a, b, kind: ContactKind::Solid }
    }
}

/// Deferred effect on a skier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReactorCommand {
    /// Slow the skier by `factor`
    ApplySlowdown {
        /// Target skier
        skier: EntityId,
        /// Speed factor
        factor: f32,
    },
    /// Knock the skier back
    Knockback {
        /// Target skier
        skier: EntityId,
    },
}

/// Collects the effects of a tick's contacts.
#[derive(Debug, Default)]
pub struct CollisionReactor {
    commands: Vec<ReactorCommand>,
}

impl CollisionReactor {
    /// Empty reactor.
    pub fn new() -> Self {
        Self::default()
    }

    /// React to one contact, from both participants' point of view.
    pub fn handle(&mut self, state: &mut RunState, contact: &Contact) {
        if contact.a == contact.b {
            return;
        }
        self.react(state, contact.a, contact.b, contact.kind);
        self.react(state, contact.b, contact.a, contact.kind);
    }

    /// Queued commands, in contact order.
    pub fn commands(&self) -> &[ReactorCommand] {
        &self.commands
    }

    /// Take queued commands (consumes them).
    pub fn drain(&mut self) -> Vec<ReactorCommand> {
        std::mem::take(&mut self.commands)
    }

    fn react(&mut self, state: &mut RunState, this: EntityId, other: EntityId, kind: ContactKind) {
        let (this_role, other_tag, other_is_skier) = {
            let (Some(this_entity), Some(other_entity)) = (state.get(this), state.get(other)) else {
                debug!(this = this.0, other = other.0, "contact with unknown entity ignored");
                return;
            };
            if !this_entity.is_live() || !other_entity.is_live() {
                return;
            }
            let role = match &this_entity.role {
                EntityRole::Obstacle(k) => Reactor::Obstacle(*k),
                EntityRole::Skier(_) => Reactor::Skier,
                EntityRole::Prop => return,
            };
            (role, other_entity.tag, other_entity.controller().is_some())
        };

        match (this_role, kind) {
            (Reactor::Obstacle(obstacle), ContactKind::Trigger) if obstacle.is_one_shot() => {
                if other_tag != Tag::Player {
                    return;
                }
                if !state.mark_for_removal(this) {
                    return;
                }
                debug!(obstacle = this.0, skier = other.0, "collision with player detected");

                if let ObstacleKind::Slowdown { factor } = obstacle {
                    if other_is_skier {
                        self.commands.push(ReactorCommand::ApplySlowdown { skier: other, factor });
                    } else {
                        debug!(entity = other.0, "player-tagged entity has no controller, slowdown skipped");
                    }
                }
            }
            (Reactor::Skier, ContactKind::Solid) if other_tag == Tag::Obstacle => {
                self.commands.push(ReactorCommand::Knockback { skier: this });
            }
            _ => {}
        }
    }
}

#[derive(Clone, Copy)]
enum Reactor {
    Obstacle(ObstacleKind),
    Skier,
}

/// Check if two circles overlap on the horizontal plane.
#[inline]
pub fn circles_overlap(pos_a: Vec3, radius_a: f32, pos_b: Vec3, radius_b: f32) -> bool {
    let combined = radius_a + radius_b;
    (pos_a - pos_b).horizontal().length_squared() <= combined * combined
}

/// Proximity-based contact source for hosts without colliders.
///
/// Reports a contact only on the tick a skier/obstacle pair starts
/// overlapping, matching contact-begin semantics.
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: BTreeSet<(EntityId, EntityId)>,
}

impl ContactTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find new skier/obstacle overlaps, in (skier, obstacle) ID order.
    ///
    /// Knockback obstacles produce solid contacts, the rest trigger contacts.
    pub fn detect<H: Host + ?Sized>(&mut self, state: &RunState, host: &H) -> Vec<Contact> {
        let mut now = BTreeSet::new();
        let mut contacts = Vec::new();

        for skier_id in state.skier_ids() {
            let skier_pos = host.position(skier_id);

            for obstacle in state.entities.values() {
                let Some(kind) = obstacle.obstacle_kind() else { continue };
                if !obstacle.is_live() {
                    continue;
                }
                if !circles_overlap(skier_pos, SKIER_RADIUS, obstacle.position, OBSTACLE_RADIUS) {
                    continue;
                }

                let pair = (skier_id, obstacle.id);
                if !self.touching.contains(&pair) {
                    contacts.push(match kind {
                        ObstacleKind::Knockback => Contact::solid(skier_id, obstacle.id),
                        _ => Contact::trigger(obstacle.id, skier_id),
                    });
                }
                now.insert(pair);
            }
        }

        self.touching = now;
        contacts
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::SkierConfig;
    use crate::game::host::HeadlessHost;

    fn world() -> (RunState, EntityId) {
        let mut state = RunState::new();
        let skier = state.spawn_skier(Vec3::ZERO, SkierConfig::default());
        (state, skier)
    }

    #[test]
    fn test_plain_obstacle_removes_itself() {
        let (mut state, skier) = world();
        let rock = state.spawn_obstacle(ObstacleKind::Plain, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::trigger(rock, skier));

        assert!(state.get(rock).unwrap().pending_removal);
        assert!(reactor.commands().is_empty());
    }

    #[test]
    fn test_slowdown_obstacle_queues_slowdown() {
        let (mut state, skier) = world();
        let flag = state.spawn_obstacle(ObstacleKind::Slowdown { factor: 0.3 }, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        // Participant order does not matter
        reactor.handle(&mut state, &Contact::trigger(skier, flag));

        assert!(state.get(flag).unwrap().pending_removal);
        assert_eq!(
            reactor.drain(),
            vec![ReactorCommand::ApplySlowdown { skier, factor: 0.3 }]
        );
    }

    #[test]
    fn test_double_trigger_same_tick_fires_once() {
        let (mut state, skier) = world();
        let flag = state.spawn_obstacle(ObstacleKind::Slowdown { factor: 0.5 }, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::trigger(flag, skier));
        reactor.handle(&mut state, &Contact::trigger(flag, skier));

        assert_eq!(reactor.commands().len(), 1);
        assert_eq!(state.cleanup().len(), 1);
    }

    #[test]
    fn test_tag_mismatch_is_no_op() {
        let mut state = RunState::new();
        let tree = state.spawn_prop(Tag::Untagged, Vec3::ZERO);
        let rock = state.spawn_obstacle(ObstacleKind::Plain, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::trigger(rock, tree));

        assert!(!state.get(rock).unwrap().pending_removal);
        assert!(reactor.commands().is_empty());
    }

    #[test]
    fn test_player_tag_without_controller_still_removes() {
        let mut state = RunState::new();
        let dummy = state.spawn_prop(Tag::Player, Vec3::ZERO);
        let flag = state.spawn_obstacle(ObstacleKind::Slowdown { factor: 0.5 }, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::trigger(flag, dummy));

        assert!(state.get(flag).unwrap().pending_removal);
        assert!(reactor.commands().is_empty());
    }

    #[test]
    fn test_solid_contact_knocks_back_and_persists() {
        let (mut state, skier) = world();
        let tree = state.spawn_obstacle(ObstacleKind::Knockback, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::solid(skier, tree));
        reactor.handle(&mut state, &Contact::solid(tree, skier));

        assert!(!state.get(tree).unwrap().pending_removal);
        assert_eq!(
            reactor.drain(),
            vec![ReactorCommand::Knockback { skier }, ReactorCommand::Knockback { skier }]
        );
    }

    #[test]
    fn test_trigger_with_knockback_obstacle_does_nothing() {
        let (mut state, skier) = world();
        let tree = state.spawn_obstacle(ObstacleKind::Knockback, Vec3::ZERO);
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::trigger(skier, tree));

        assert!(reactor.commands().is_empty());
        assert!(!state.get(tree).unwrap().pending_removal);
    }

    #[test]
    fn test_unknown_and_self_contacts_ignored() {
        let (mut state, skier) = world();
        let mut reactor = CollisionReactor::new();

        reactor.handle(&mut state, &Contact::solid(skier, EntityId(42)));
        reactor.handle(&mut state, &Contact::solid(skier, skier));

        assert!(reactor.commands().is_empty());
    }

    #[test]
    fn test_circles_overlap_ignores_height() {
        assert!(circles_overlap(Vec3::ZERO, 0.5, Vec3::new(0.9, 10.0, 0.0), 0.5));
        assert!(!circles_overlap(Vec3::ZERO, 0.5, Vec3::new(1.1, 0.0, 0.0), 0.5));
    }

    #[test]
    fn test_tracker_reports_enter_only() {
        let (mut state, skier) = world();
        let tree = state.spawn_obstacle(ObstacleKind::Knockback, Vec3::new(0.0, 0.0, -0.5));
        let mut host = HeadlessHost::new();
        host.insert_body(skier, Vec3::ZERO);
        let mut tracker = ContactTracker::new();

        assert_eq!(tracker.detect(&state, &host), vec![Contact::solid(skier, tree)]);
        assert!(tracker.detect(&state, &host).is_empty());

        // Leave and come back
        host.insert_body(skier, Vec3::new(5.0, 0.0, 0.0));
        assert!(tracker.detect(&state, &host).is_empty());
        host.insert_body(skier, Vec3::ZERO);
        assert_eq!(tracker.detect(&state, &host).len(), 1);
    }
}
