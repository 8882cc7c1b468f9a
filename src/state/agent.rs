use std::fmt;

use crate::infra::{Direction, Vec2};
use crate::state::NodeId;

/// Identifies one pursuer in emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PursuerId(pub usize);

impl fmt::Display for PursuerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pursuer-{}", self.0)
    }
}

/// Kinematic state of the pursued agent or of a pursuer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    pub position: Vec2,
    /// `None` means standing still.
    pub direction: Option<Direction>,
    /// Last node whose region the agent entered. Only updated on node entry.
    pub current_node: Option<NodeId>,
    /// Units per second.
    pub speed: f32,
}

impl AgentState {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            direction: None,
            current_node: None,
            speed,
        }
    }

    pub fn at_node(node: NodeId, position: Vec2, speed: f32) -> Self {
        Self {
            position,
            direction: None,
            current_node: Some(node),
            speed,
        }
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    /// Unit vector of the current direction, zero when standing still.
    pub fn direction_vector(&self) -> Vec2 {
        self.direction.map(Direction::vector).unwrap_or(Vec2::ZERO)
    }

    pub fn distance_to(&self, other: &AgentState) -> f32 {
        self.position.distance(&other.position)
    }
}
