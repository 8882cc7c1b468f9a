use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::infra::Vec2;
use crate::state::{Graph, NodeId};

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    node: NodeId,
    f_score: f32,
    sequence: u64,
}

impl Ord for OpenEntry {
    // Min-heap on f; among equal f the entry pushed first wins.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

/// A route returned by [`AStar::find_path`].
///
/// `nodes[0]` is the start node; `costs[i]` is the path cost `g` of `nodes[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub costs: Vec<f32>,
}

impl Route {
    /// Number of edges.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The node after the start, if the route leaves the start at all.
    pub fn first_step(&self) -> Option<NodeId> {
        self.nodes.get(1).copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

pub struct AStar;

impl AStar {
    pub const DEFAULT_MAX_EXPANSIONS: usize = 5000;

    /// Shortest route from `start` to any node whose position lies within
    /// `arrival_epsilon` of `target`.
    ///
    /// Every edge costs 1 and the heuristic is the straight-line distance to
    /// `target`. Returns `None` when the open set is exhausted or the
    /// expansion limit is hit.
    #[tracing::instrument(level = "trace", skip(graph), fields(target_x = target.x, target_y = target.y))]
    pub fn find_path(
        graph: &Graph,
        start: NodeId,
        target: Vec2,
        arrival_epsilon: f32,
        max_expansions: usize,
    ) -> Option<Route> {
        let start_node = graph.node(start)?;

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
        let mut g_score: HashMap<NodeId, f32> = HashMap::new();
        let mut closed_set: HashSet<NodeId> = HashSet::new();
        let mut sequence = 0u64;

        g_score.insert(start, 0.0);
        open_set.push(OpenEntry {
            node: start,
            f_score: start_node.position().distance(&target),
            sequence,
        });

        let mut expansions = 0;

        while let Some(OpenEntry { node: current, .. }) = open_set.pop() {
            if closed_set.contains(&current) {
                continue;
            }

            let current_node = graph.node(current)?;
            if current_node.position().distance(&target) < arrival_epsilon {
                tracing::trace!(expansions, "Path found");
                return Some(reconstruct_route(&came_from, &g_score, current));
            }

            closed_set.insert(current);

            expansions += 1;
            if expansions > max_expansions {
                tracing::warn!(expansions, "Max expansions reached, target unreachable");
                return None;
            }

            let current_g = g_score.get(&current).copied().unwrap_or(f32::MAX);

            for &direction in current_node.available_directions() {
                let Some(neighbor) = current_node.neighbor(direction) else {
                    continue;
                };
                if closed_set.contains(&neighbor) {
                    continue;
                }
                let Some(neighbor_node) = graph.node(neighbor) else {
                    continue;
                };

                let tentative_g = current_g + 1.0;

                if tentative_g < g_score.get(&neighbor).copied().unwrap_or(f32::MAX) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    sequence += 1;
                    open_set.push(OpenEntry {
                        node: neighbor,
                        f_score: tentative_g + neighbor_node.position().distance(&target),
                        sequence,
                    });
                }
            }
        }

        tracing::trace!(expansions, "No path found");
        None
    }
}

fn reconstruct_route(
    came_from: &HashMap<NodeId, NodeId>,
    g_score: &HashMap<NodeId, f32>,
    mut current: NodeId,
) -> Route {
    let mut nodes = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        nodes.push(prev);
        current = prev;
    }
    nodes.reverse();
    let costs = nodes
        .iter()
        .map(|node| g_score.get(node).copied().unwrap_or(0.0))
        .collect();
    Route { nodes, costs }
}
