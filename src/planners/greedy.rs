use crate::infra::Direction;
use crate::planners::{ChaseContext, ChaseStrategy, greedy_direction};
use crate::state::Node;

/// Heads for whichever opening points most directly at the target's current
/// position. No lookahead, no memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyChase;

impl ChaseStrategy for GreedyChase {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn decide(&mut self, ctx: &ChaseContext, node: &Node) -> Option<Direction> {
        greedy_direction(
            node,
            ctx.pursuer.direction,
            ctx.pursuer.position,
            ctx.target.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Vec2;
    use crate::planners::test_support::*;
    use crate::state::AgentState;

    #[test]
    fn test_greedy_chase_turns_toward_target() {
        let graph = graph_from(
            "#####\n\
             #...#\n\
             #.#.#\n\
             #####",
        );
        let node_id = node_at(&graph, 1.0, 2.0);
        let node = graph.node(node_id).unwrap();
        let mut pursuer = AgentState::at_node(node_id, node.position(), 8.0);
        pursuer.direction = Some(Direction::Up);
        let target = AgentState::new(Vec2::new(3.0, 1.0), 8.0);

        let ctx = ChaseContext {
            graph: &graph,
            pursuer: &pursuer,
            target: &target,
            now: 0.0,
        };

        // Down would be a reversal, so the corner turns right.
        assert_eq!(GreedyChase.decide(&ctx, node), Some(Direction::Right));
    }
}
