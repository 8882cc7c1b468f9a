use tracing::{debug, trace};

use crate::infra::{AStar, Direction, Vec2, direction_toward};
use crate::planners::{ChaseContext, ChaseStrategy, greedy_direction};
use crate::state::{AgentState, Node};

/// Tunables for [`AStarChase`].
#[derive(Debug, Clone, PartialEq)]
pub struct AStarConfig {
    /// How far ahead, in seconds of pursuer travel, the target is predicted.
    pub lookahead_seconds: f32,
    /// Minimum time between two predictions.
    pub recompute_interval_seconds: f64,
    /// Search stops at the first node closer than this to the prediction.
    pub arrival_epsilon: f32,
    pub max_expansions: usize,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            lookahead_seconds: 0.5,
            recompute_interval_seconds: 2.0,
            arrival_epsilon: 0.5,
            max_expansions: AStar::DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Routes toward where the target is expected to be, falling back to the
/// greedy heuristic when no usable route exists.
#[derive(Debug, Clone)]
pub struct AStarChase {
    config: AStarConfig,
    predicted_target: Option<Vec2>,
    last_prediction: Option<f64>,
}

impl AStarChase {
    pub fn new(config: AStarConfig) -> Self {
        Self {
            config,
            predicted_target: None,
            last_prediction: None,
        }
    }

    pub fn config(&self) -> &AStarConfig {
        &self.config
    }

    pub fn predicted_target(&self) -> Option<Vec2> {
        self.predicted_target
    }

    /// `target_position + target_direction * pursuer_speed * lookahead`.
    pub fn predict(&self, pursuer: &AgentState, target: &AgentState) -> Vec2 {
        target.position + target.direction_vector() * (pursuer.speed * self.config.lookahead_seconds)
    }

    fn refresh_prediction(&mut self, ctx: &ChaseContext) {
        let predicted = self.predict(ctx.pursuer, ctx.target);
        trace!(x = predicted.x, y = predicted.y, "Predicted target refreshed");
        self.predicted_target = Some(predicted);
        self.last_prediction = Some(ctx.now);
    }
}

impl ChaseStrategy for AStarChase {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn update(&mut self, ctx: &ChaseContext) {
        let due = self
            .last_prediction
            .is_none_or(|last| ctx.now - last >= self.config.recompute_interval_seconds);
        if due {
            self.refresh_prediction(ctx);
        }
    }

    fn decide(&mut self, ctx: &ChaseContext, node: &Node) -> Option<Direction> {
        if self.predicted_target.is_none() {
            self.refresh_prediction(ctx);
        }
        let target = self.predicted_target.unwrap_or(ctx.target.position);

        let route = AStar::find_path(
            ctx.graph,
            node.id(),
            target,
            self.config.arrival_epsilon,
            self.config.max_expansions,
        );

        let routed = route
            .as_ref()
            .and_then(|route| route.first_step())
            .and_then(|next| ctx.graph.node(next))
            .and_then(|next| direction_toward(ctx.pursuer.position, next.position()))
            .filter(|&direction| node.is_available(direction));

        match routed {
            Some(direction) => Some(direction),
            None => {
                debug!(
                    node = %node.id(),
                    route_found = route.is_some(),
                    "No usable route, falling back to greedy"
                );
                greedy_direction(
                    node,
                    ctx.pursuer.direction,
                    ctx.pursuer.position,
                    ctx.target.position,
                )
            }
        }
    }

    fn reset(&mut self) {
        self.predicted_target = None;
        self.last_prediction = None;
    }

    fn status(&self) -> String {
        match self.predicted_target {
            Some(target) => format!("predicted target {}", target),
            None => "no prediction".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::test_support::*;
    use crate::state::{Graph, NodeId};

    fn pursuer_at(graph: &Graph, node: NodeId, direction: Option<Direction>) -> AgentState {
        let mut pursuer = AgentState::at_node(node, graph.node(node).unwrap().position(), 8.0);
        pursuer.direction = direction;
        pursuer
    }

    #[test]
    fn test_open_grid_first_step_is_up() {
        let graph = graph_from("...\n...\n...");
        let start = node_at(&graph, 0.0, 0.0);
        let pursuer = pursuer_at(&graph, start, Some(Direction::Up));
        let target = AgentState::new(Vec2::new(2.0, 2.0), 8.0);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        let mut chase = AStarChase::new(AStarConfig::default());
        let node = graph.node(start).unwrap();

        assert_eq!(chase.decide(&ctx, node), Some(Direction::Up));
        assert_eq!(chase.predicted_target(), Some(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_prediction_leads_moving_target() {
        let chase = AStarChase::new(AStarConfig::default());
        let pursuer = AgentState::new(Vec2::ZERO, 8.0);
        let mut target = AgentState::new(Vec2::new(3.0, 3.0), 6.0);
        target.direction = Some(Direction::Left);

        // 8 units/s * 0.5 s ahead of the target along its heading.
        assert_eq!(chase.predict(&pursuer, &target), Vec2::new(-1.0, 3.0));
    }

    #[test]
    fn test_prediction_refreshes_on_interval_only() {
        let graph = graph_from("...");
        let node = node_at(&graph, 0.0, 0.0);
        let pursuer = pursuer_at(&graph, node, None);
        let mut target = AgentState::new(Vec2::new(2.0, 0.0), 8.0);
        let mut chase = AStarChase::new(AStarConfig::default());

        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };
        chase.update(&ctx);
        assert_eq!(chase.predicted_target(), Some(Vec2::new(2.0, 0.0)));

        target.position = Vec2::new(1.0, 0.0);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 1.0,
        };
        chase.update(&ctx);
        assert_eq!(chase.predicted_target(), Some(Vec2::new(2.0, 0.0)));

        let ctx = ChaseContext { now: 2.0, ..ctx };
        chase.update(&ctx);
        assert_eq!(chase.predicted_target(), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_unreachable_target_falls_back_to_available_direction() {
        let graph = graph_from(
            "#####\n\
             #.#.#\n\
             #.#.#\n\
             #####",
        );
        let start = node_at(&graph, 1.0, 1.0);
        let pursuer = pursuer_at(&graph, start, Some(Direction::Down));
        let target = AgentState::new(Vec2::new(3.0, 1.0), 8.0);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        let mut chase = AStarChase::new(AStarConfig::default());
        let node = graph.node(start).unwrap();
        let decision = chase.decide(&ctx, node);

        // Dead end: the only way out is the reverse, and it must be taken.
        assert_eq!(decision, Some(Direction::Up));
        assert!(node.is_available(decision.unwrap()));
    }

    #[test]
    fn test_already_at_target_uses_greedy() {
        let graph = graph_from("...\n...\n...");
        let start = node_at(&graph, 1.0, 1.0);
        let pursuer = pursuer_at(&graph, start, Some(Direction::Right));
        let target = AgentState::new(Vec2::new(1.2, 1.0), 8.0);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        let mut chase = AStarChase::new(AStarConfig::default());
        let decision = chase.decide(&ctx, graph.node(start).unwrap());
        assert_eq!(decision, Some(Direction::Right));
    }

    #[test]
    fn test_unavailable_snapped_step_uses_greedy() {
        let graph = graph_from(
            "#####\n\
             #...#\n\
             #####",
        );
        let start = node_at(&graph, 2.0, 1.0);
        let node = graph.node(start).unwrap();
        let right = graph.node(node_at(&graph, 3.0, 1.0)).unwrap();

        // Drifted above the corridor: the step toward (3,1) snaps to Down.
        let pursuer = AgentState::at_node(start, Vec2::new(2.6, 2.0), 4.0);
        let mut target = AgentState::new(Vec2::new(1.0, 1.0), 6.0);
        target.direction = Some(Direction::Right);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        let mut chase = AStarChase::new(AStarConfig::default());
        let predicted = chase.predict(&pursuer, &target);
        assert_eq!(predicted, Vec2::new(3.0, 1.0));
        let route = AStar::find_path(&graph, start, predicted, 0.5, AStar::DEFAULT_MAX_EXPANSIONS).unwrap();
        assert_eq!(route.first_step(), Some(right.id()));
        let snapped = direction_toward(pursuer.position, right.position());
        assert_eq!(snapped, Some(Direction::Down));
        assert!(!node.is_available(Direction::Down));

        let decision = chase.decide(&ctx, node);
        let greedy = greedy_direction(node, pursuer.direction, pursuer.position, target.position);
        assert_eq!(decision, greedy);
        assert_eq!(decision, Some(Direction::Left));
    }

    #[test]
    fn test_reset_clears_prediction() {
        let graph = graph_from("...");
        let node = node_at(&graph, 0.0, 0.0);
        let pursuer = pursuer_at(&graph, node, None);
        let target = AgentState::new(Vec2::new(2.0, 0.0), 8.0);
        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        let mut chase = AStarChase::new(AStarConfig::default());
        chase.update(&ctx);
        assert!(chase.predicted_target().is_some());
        chase.reset();
        assert!(chase.predicted_target().is_none());
    }
}
