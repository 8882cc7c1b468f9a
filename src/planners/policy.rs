use std::fmt;

use tracing::{debug, trace};

use crate::infra::{Direction, Vec2};
use crate::planners::{ChaseContext, ChaseStrategy};
use crate::state::Node;

/// What a trained policy sees at a decision point.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyObservation {
    /// Unit vector from the pursuer toward the target.
    pub relative_target: Vec2,
    /// Available directions at the node as unit vectors, in enumeration order.
    pub available: Vec<Vec2>,
    /// Current heading, zero when standing still.
    pub current: Vec2,
}

impl PolicyObservation {
    pub const FEATURE_SIZE: usize = 8;

    pub fn new(node: &Node, pursuer_position: Vec2, target: Vec2, current: Option<Direction>) -> Self {
        Self {
            relative_target: (target - pursuer_position).normalized(),
            available: node
                .available_directions()
                .iter()
                .map(|direction| direction.vector())
                .collect(),
            current: current.map(Direction::vector).unwrap_or(Vec2::ZERO),
        }
    }

    /// Flat feature vector: target bearing, one availability flag per
    /// direction, then the current heading.
    pub fn to_features(&self) -> [f32; Self::FEATURE_SIZE] {
        let mut features = [0.0; Self::FEATURE_SIZE];
        features[0] = self.relative_target.x;
        features[1] = self.relative_target.y;
        for (slot, direction) in Direction::ALL.iter().enumerate() {
            if self.available.contains(&direction.vector()) {
                features[2 + slot] = 1.0;
            }
        }
        features[6] = self.current.x;
        features[7] = self.current.y;
        features
    }
}

/// An externally trained model. Returns an index into
/// [`PolicyObservation::available`], or `None` when it has no opinion.
pub trait DirectionPolicy {
    fn act(&mut self, observation: &PolicyObservation) -> Option<usize>;
}

impl<F> DirectionPolicy for F
where
    F: FnMut(&PolicyObservation) -> Option<usize>,
{
    fn act(&mut self, observation: &PolicyObservation) -> Option<usize> {
        self(observation)
    }
}

/// Chase driven by a [`DirectionPolicy`].
///
/// Answers that are out of range, or that reverse the pursuer while another
/// way is open, are replaced by the previous choice when it is still
/// available and by the first available direction otherwise.
pub struct PolicyChase {
    policy: Box<dyn DirectionPolicy>,
    previous: Option<Direction>,
    rejected: u64,
}

impl PolicyChase {
    pub fn new(policy: Box<dyn DirectionPolicy>) -> Self {
        Self {
            policy,
            previous: None,
            rejected: 0,
        }
    }

    /// How many policy answers were replaced by the fallback.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn fallback(&self, node: &Node) -> Option<Direction> {
        self.previous
            .filter(|&direction| node.is_available(direction))
            .or_else(|| node.available_directions().first().copied())
    }
}

impl fmt::Debug for PolicyChase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PolicyChase")
            .field("previous", &self.previous)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl ChaseStrategy for PolicyChase {
    fn name(&self) -> &'static str {
        "policy"
    }

    fn decide(&mut self, ctx: &ChaseContext, node: &Node) -> Option<Direction> {
        let observation = PolicyObservation::new(
            node,
            ctx.pursuer.position,
            ctx.target.position,
            ctx.pursuer.direction,
        );
        let available = node.available_directions();
        let answer = self.policy.act(&observation);
        let proposed = answer.and_then(|index| available.get(index).copied());

        let reverse = ctx.pursuer.direction.map(Direction::opposite);
        let accepted = proposed.filter(|&direction| available.len() <= 1 || Some(direction) != reverse);

        let choice = match accepted {
            Some(direction) => Some(direction),
            None => {
                self.rejected += 1;
                let fallback = self.fallback(node);
                debug!(?answer, ?fallback, node = %node.id(), "Policy answer rejected");
                fallback
            }
        };
        trace!(?choice, "Policy decision");
        self.previous = choice;
        choice
    }

    fn reset(&mut self) {
        self.previous = None;
    }

    fn status(&self) -> String {
        format!("{} rejected answers", self.rejected)
    }
}
