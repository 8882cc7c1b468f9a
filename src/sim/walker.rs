use rand::Rng;
use rand::seq::IndexedRandom;

use crate::infra::Direction;
use crate::planners::candidate_directions;
use crate::state::Node;

/// Random walk for the pursued agent: at every node a uniformly random
/// candidate direction, never reversing unless cornered.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalker;

impl RandomWalker {
    pub fn choose(&self, node: &Node, current: Option<Direction>, rng: &mut impl Rng) -> Option<Direction> {
        candidate_directions(node, current).choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::planners::test_support::*;

    #[test]
    fn test_walker_never_reverses_in_open_space() {
        let graph = graph_from("...\n...\n...");
        let node = graph.node(node_at(&graph, 1.0, 1.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..100 {
            let dir = RandomWalker.choose(node, Some(Direction::Up), &mut rng).unwrap();
            assert_ne!(dir, Direction::Down);
        }
    }

    #[test]
    fn test_walker_turns_back_at_dead_end() {
        let graph = graph_from("###\n#.#\n#.#\n###");
        let node = graph.node(node_at(&graph, 1.0, 2.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(
            RandomWalker.choose(node, Some(Direction::Up), &mut rng),
            Some(Direction::Down)
        );
    }
}
