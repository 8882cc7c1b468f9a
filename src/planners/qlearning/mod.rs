//! Tabular Q-learning chase.
//!
//! Each node entry is one decision step: the transition from the previous
//! decision is scored and learned, then the next direction is picked
//! epsilon-greedily from the table.

mod encoder;
mod q_table;
mod reward;

pub use encoder::{StateEncoding, StateKey};
pub use q_table::{QEntry, QTable};
pub use reward::RewardConfig;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, trace};

use crate::infra::Direction;
use crate::planners::{ChaseContext, ChaseStrategy, candidate_directions};
use crate::state::Node;

/// Learning parameters for [`QLearningChase`].
#[derive(Debug, Clone, PartialEq)]
pub struct QLearningConfig {
    /// Learning rate.
    pub alpha: f32,
    /// Discount factor.
    pub gamma: f32,
    /// Initial exploration probability.
    pub epsilon: f32,
    /// Exploration never decays below this.
    pub epsilon_min: f32,
    /// Multiplier applied to epsilon after every decision.
    pub epsilon_decay: f32,
    pub encoding: StateEncoding,
    pub reward: RewardConfig,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            encoding: StateEncoding::default(),
            reward: RewardConfig::default(),
        }
    }
}

/// The decision waiting for its outcome.
#[derive(Debug, Clone, Copy)]
struct PendingStep {
    state: StateKey,
    action: Direction,
    distance: f32,
}

#[derive(Debug, Clone)]
pub struct QLearningChase {
    config: QLearningConfig,
    epsilon: f32,
    table: QTable,
    pending: Option<PendingStep>,
    rng: StdRng,
    decisions: u64,
}

impl QLearningChase {
    pub fn new(config: QLearningConfig, rng: StdRng) -> Self {
        let epsilon = config.epsilon;
        Self {
            config,
            epsilon,
            table: QTable::new(),
            pending: None,
            rng,
            decisions: 0,
        }
    }

    /// Continue learning from a previously captured table.
    pub fn with_table(config: QLearningConfig, rng: StdRng, table: QTable) -> Self {
        Self {
            table,
            ..Self::new(config, rng)
        }
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Start over with an empty table and the initial epsilon.
    pub fn reinitialize(&mut self) {
        self.table = QTable::new();
        self.epsilon = self.config.epsilon;
        self.pending = None;
        self.decisions = 0;
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
    }

    fn select_action(&mut self, state: StateKey, candidates: &[Direction]) -> Option<Direction> {
        if candidates.is_empty() {
            return None;
        }
        if self.rng.random::<f32>() < self.epsilon {
            let choice = candidates.choose(&mut self.rng).copied();
            trace!(?choice, epsilon = self.epsilon, "Exploring");
            choice
        } else {
            self.table.best_action(state, candidates)
        }
    }
}

impl ChaseStrategy for QLearningChase {
    fn name(&self) -> &'static str {
        "qlearning"
    }

    fn decide(&mut self, ctx: &ChaseContext, node: &Node) -> Option<Direction> {
        let distance = ctx.pursuer.distance_to(ctx.target);
        let state = self
            .config
            .encoding
            .encode(node.id(), ctx.pursuer.position, ctx.target.position);
        let available = node.available_directions();

        if let Some(step) = self.pending.take() {
            let reward = self.config.reward.reward(step.distance, distance);
            let value = self.table.update(
                step.state,
                step.action,
                reward,
                state,
                available,
                self.config.alpha,
                self.config.gamma,
            );
            trace!(?step.state, action = %step.action, reward, value, "Q-value updated");
        }

        self.table.ensure(state, available);
        let candidates = candidate_directions(node, ctx.pursuer.direction);
        let choice = self.select_action(state, &candidates);
        self.decay_epsilon();
        self.decisions += 1;

        match choice {
            Some(action) => {
                self.pending = Some(PendingStep {
                    state,
                    action,
                    distance,
                });
            }
            None => debug!(node = %node.id(), "No candidate direction, holding position"),
        }
        choice
    }

    fn reset(&mut self) {
        self.pending = None;
    }

    fn status(&self) -> String {
        format!(
            "epsilon {:.3}, {} states, {} entries",
            self.epsilon,
            self.table.state_count(),
            self.table.entry_count()
        )
    }

    fn q_table(&self) -> Option<&QTable> {
        Some(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::infra::Vec2;
    use crate::planners::test_support::*;
    use crate::state::{AgentState, Graph, LevelGeometry, NodeId};

    fn chase(config: QLearningConfig) -> QLearningChase {
        QLearningChase::new(config, StdRng::seed_from_u64(42))
    }

    fn greedy_only() -> QLearningConfig {
        QLearningConfig {
            epsilon: 0.0,
            epsilon_min: 0.0,
            encoding: StateEncoding::Node,
            ..QLearningConfig::default()
        }
    }

    fn decide_at(
        chase: &mut QLearningChase,
        graph: &Graph,
        node: NodeId,
        direction: Option<Direction>,
        target: Vec2,
    ) -> Option<Direction> {
        let position = graph.node(node).unwrap().position();
        let mut pursuer = AgentState::at_node(node, position, 8.0);
        pursuer.direction = direction;
        let target = AgentState::new(target, 8.0);
        let ctx = ChaseContext {
            graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };
        chase.decide(&ctx, graph.node(node).unwrap())
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let graph = graph_from("...\n...\n...");
        let node = node_at(&graph, 1.0, 1.0);
        let config = QLearningConfig {
            epsilon: 0.5,
            epsilon_min: 0.05,
            epsilon_decay: 0.9,
            ..QLearningConfig::default()
        };
        let mut chase = chase(config);

        let mut previous = chase.epsilon();
        for _ in 0..200 {
            decide_at(&mut chase, &graph, node, None, Vec2::new(2.0, 2.0));
            assert!(chase.epsilon() <= previous);
            assert!(chase.epsilon() >= 0.05);
            previous = chase.epsilon();
        }
        assert_eq!(chase.epsilon(), 0.05);
    }

    #[test]
    fn test_exploitation_picks_first_of_equal_values() {
        let graph = graph_from("...\n...\n...");
        let node = node_at(&graph, 1.0, 1.0);
        let mut chase = chase(greedy_only());

        let choice = decide_at(&mut chase, &graph, node, Some(Direction::Down), Vec2::ZERO);
        // Up is excluded as the reverse of Down; Down is the first remaining.
        assert_eq!(choice, Some(Direction::Down));
    }

    #[test]
    fn test_visited_state_gets_entry_per_available_direction() {
        let graph = graph_from("#.#\n...\n#.#");
        let node = node_at(&graph, 1.0, 1.0);
        let mut chase = chase(greedy_only());

        decide_at(&mut chase, &graph, node, None, Vec2::ZERO);

        let state = StateKey::Node(node);
        for dir in Direction::ALL {
            assert_eq!(chase.table().get(&state, dir), Some(0.0));
        }
    }

    #[test]
    fn test_previous_step_is_learned_on_next_decision() {
        let graph = graph_from("...");
        let left = node_at(&graph, 0.0, 0.0);
        let middle = node_at(&graph, 1.0, 0.0);
        let mut chase = chase(greedy_only());
        let target = Vec2::new(2.0, 0.0);

        let first = decide_at(&mut chase, &graph, left, None, target).unwrap();
        assert_eq!(chase.table().get(&StateKey::Node(left), first), Some(0.0));

        // Distance went from 2 to 1: step penalty plus approach bonus.
        decide_at(&mut chase, &graph, middle, Some(first), target);
        let reward = RewardConfig::default().reward(2.0, 1.0);
        let expected = 0.1 * reward;
        let learned = chase.table().get(&StateKey::Node(left), first).unwrap();
        assert!((learned - expected).abs() < 1e-6);
    }

    #[test]
    fn test_positive_value_is_exploited() {
        let graph = graph_from("...\n...\n...");
        let node = node_at(&graph, 1.0, 1.0);
        let state = StateKey::Node(node);
        let mut table = QTable::new();
        table.update(state, Direction::Left, 3.0, state, &[], 1.0, 0.0);
        let mut chase = QLearningChase::with_table(greedy_only(), StdRng::seed_from_u64(1), table);

        let choice = decide_at(&mut chase, &graph, node, None, Vec2::ZERO);
        assert_eq!(choice, Some(Direction::Left));
    }

    #[test]
    fn test_full_exploration_stays_within_candidates() {
        let graph = graph_from("###\n#..\n#.#");
        let node = node_at(&graph, 1.0, 1.0);
        let config = QLearningConfig {
            epsilon: 1.0,
            epsilon_min: 1.0,
            epsilon_decay: 1.0,
            ..QLearningConfig::default()
        };
        let mut chase = chase(config);
        let node_ref = graph.node(node).unwrap();

        for _ in 0..50 {
            let choice = decide_at(&mut chase, &graph, node, Some(Direction::Left), Vec2::ZERO);
            let dir = choice.unwrap();
            assert!(node_ref.is_available(dir));
            assert_ne!(dir, Direction::Right);
        }
    }

    #[test]
    fn test_single_exit_is_taken_even_when_reversing() {
        struct Pocket;
        impl LevelGeometry for Pocket {
            fn node_positions(&self) -> Vec<Vec2> {
                vec![Vec2::ZERO]
            }
            fn is_blocked(&self, _: Vec2, direction: Direction, _: f32) -> bool {
                direction != Direction::Up
            }
        }
        let graph = Graph::build(&Pocket).unwrap();
        let mut chase = chase(greedy_only());

        // Single opening is the reverse: still taken.
        let choice = decide_at(&mut chase, &graph, NodeId(0), Some(Direction::Down), Vec2::ZERO);
        assert_eq!(choice, Some(Direction::Up));
    }

    #[test]
    fn test_reset_keeps_table_and_reinitialize_clears_it() {
        let graph = graph_from("...");
        let node = node_at(&graph, 1.0, 0.0);
        let mut chase = chase(QLearningConfig::default());

        decide_at(&mut chase, &graph, node, None, Vec2::ZERO);
        assert!(!chase.table().is_empty());

        chase.reset();
        assert!(!chase.table().is_empty());

        chase.reinitialize();
        assert!(chase.table().is_empty());
        assert_eq!(chase.epsilon(), QLearningConfig::default().epsilon);
    }
}
