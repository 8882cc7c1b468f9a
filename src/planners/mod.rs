//! Chase strategies: the interchangeable algorithms that pick a pursuer's
//! direction whenever it enters a node while chasing.
//!
//! ```text
//! node-entry event
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────┐
//! │  ChaseStrategy::decide(ctx, node)            │
//! │  - Greedy:     best dot product toward target │
//! │  - AStar:      route to predicted target      │
//! │  - QLearning:  epsilon-greedy over Q-table    │
//! │  - Policy:     externally trained model       │
//! └──────────────────────────────────────────────┘
//!     │
//!     ▼
//! Option<Direction>  (None = hold position)
//! ```

pub mod astar;
pub mod greedy;
pub mod policy;
pub mod qlearning;

pub use astar::{AStarChase, AStarConfig};
pub use greedy::GreedyChase;
pub use policy::{DirectionPolicy, PolicyChase, PolicyObservation};
pub use qlearning::{
    QEntry, QLearningChase, QLearningConfig, QTable, RewardConfig, StateEncoding, StateKey,
};

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::infra::{Direction, Vec2};
use crate::state::{AgentState, Graph, Node};

/// Read-only view of the world handed to a strategy.
#[derive(Debug, Clone, Copy)]
pub struct ChaseContext<'a> {
    pub graph: &'a Graph,
    pub pursuer: &'a AgentState,
    pub target: &'a AgentState,
    /// Seconds from the controller's clock.
    pub now: f64,
}

/// Capability shared by every chase algorithm: given a node-entry event,
/// decide a direction.
pub trait ChaseStrategy: fmt::Debug {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Per-frame hook for periodic work. Only called while chasing.
    fn update(&mut self, _ctx: &ChaseContext) {}

    /// Direction to take from `node`, or `None` to hold position.
    fn decide(&mut self, ctx: &ChaseContext, node: &Node) -> Option<Direction>;

    /// Drop transient state (caches, pending transitions). Learned values stay.
    fn reset(&mut self) {}

    /// Short description of internal state for periodic status logs.
    fn status(&self) -> String {
        String::new()
    }

    /// Learned action values, for strategies that have them.
    fn q_table(&self) -> Option<&QTable> {
        None
    }
}

/// Which chase strategy a controller is built with.
pub enum StrategyKind {
    Greedy,
    AStar(AStarConfig),
    QLearning(QLearningConfig),
    Policy(Box<dyn DirectionPolicy>),
}

impl StrategyKind {
    /// Instantiate the strategy. `seed` makes random exploration reproducible.
    pub fn build(self, seed: Option<u64>) -> Box<dyn ChaseStrategy> {
        match self {
            StrategyKind::Greedy => Box::new(GreedyChase),
            StrategyKind::AStar(config) => Box::new(AStarChase::new(config)),
            StrategyKind::QLearning(config) => {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                Box::new(QLearningChase::new(config, rng))
            }
            StrategyKind::Policy(policy) => Box::new(PolicyChase::new(policy)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Greedy => "greedy",
            StrategyKind::AStar(_) => "astar",
            StrategyKind::QLearning(_) => "qlearning",
            StrategyKind::Policy(_) => "policy",
        }
    }
}

impl fmt::Debug for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StrategyKind::Greedy => f.write_str("Greedy"),
            StrategyKind::AStar(config) => f.debug_tuple("AStar").field(config).finish(),
            StrategyKind::QLearning(config) => f.debug_tuple("QLearning").field(config).finish(),
            StrategyKind::Policy(_) => f.write_str("Policy(..)"),
        }
    }
}

// ============================================================================
// Direction helpers shared by the strategies and the behavior modes
// ============================================================================

/// Available directions at `node`, minus the reverse of `current` unless the
/// reverse is the only way out.
pub fn candidate_directions(node: &Node, current: Option<Direction>) -> Vec<Direction> {
    let available = node.available_directions();
    if available.len() <= 1 {
        return available.to_vec();
    }
    let reverse = current.map(Direction::opposite);
    available
        .iter()
        .copied()
        .filter(|&direction| Some(direction) != reverse)
        .collect()
}

/// Candidate direction with the largest dot product against the unit vector
/// from `from` to `toward`. Ties keep the first candidate.
pub fn greedy_direction(
    node: &Node,
    current: Option<Direction>,
    from: Vec2,
    toward: Vec2,
) -> Option<Direction> {
    let heading = (toward - from).normalized();
    let mut best: Option<(Direction, f32)> = None;
    for direction in candidate_directions(node, current) {
        let score = direction.vector().dot(&heading);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((direction, score));
        }
    }
    best.map(|(direction, _)| direction)
}

/// Candidate direction pointing most directly away from `threat`.
pub fn flee_direction(
    node: &Node,
    current: Option<Direction>,
    from: Vec2,
    threat: Vec2,
) -> Option<Direction> {
    let away = from - (threat - from);
    greedy_direction(node, current, from, away)
}
