use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;
use crate::infra::{Direction, Vec2};
use crate::state::LevelGeometry;

/// Maximum distance a neighbor query travels along a ray.
pub const DEFAULT_LOOKAHEAD: f32 = 1.0;

// How far off the ray axis a node may sit and still be hit.
const ALIGNMENT_TOLERANCE: f32 = 0.25;

/// Stable handle of a node within its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A maze cell with its precomputed openings.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    position: Vec2,
    available: Vec<Direction>,
    neighbors: [Option<NodeId>; 4],
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Directions with one clear unit of travel, in [`Direction::ALL`] order.
    pub fn available_directions(&self) -> &[Direction] {
        &self.available
    }

    pub fn is_available(&self, direction: Direction) -> bool {
        self.available.contains(&direction)
    }

    /// Node reached by moving along `direction`, if any.
    pub fn neighbor(&self, direction: Direction) -> Option<NodeId> {
        self.neighbors[direction.index()]
    }
}

/// Static maze graph. Built once per level and shared read-only.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    lookahead: f32,
}

impl Graph {
    pub fn build(geometry: &impl LevelGeometry) -> Result<Self, GraphError> {
        Self::build_with_lookahead(geometry, DEFAULT_LOOKAHEAD)
    }

    /// Compute every node's available directions and neighbors.
    ///
    /// Fails if the geometry has no nodes or if any node is closed on all
    /// four sides.
    pub fn build_with_lookahead(
        geometry: &impl LevelGeometry,
        lookahead: f32,
    ) -> Result<Self, GraphError> {
        let positions = geometry.node_positions();
        if positions.is_empty() {
            return Err(GraphError::EmptyGeometry);
        }

        let mut nodes = Vec::with_capacity(positions.len());
        for (index, &position) in positions.iter().enumerate() {
            let id = NodeId(index);
            let available: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&direction| !geometry.is_blocked(position, direction, 1.0))
                .collect();
            if available.is_empty() {
                return Err(GraphError::NoAvailableDirections { node: id, position });
            }

            let mut neighbors = [None; 4];
            for &direction in &available {
                neighbors[direction.index()] =
                    cast_ray(&positions, index, direction, lookahead, geometry);
            }

            nodes.push(Node {
                id,
                position,
                available,
                neighbors,
            });
        }

        debug!(nodes = nodes.len(), lookahead, "Graph built");
        Ok(Self { nodes, lookahead })
    }

    pub fn lookahead(&self) -> f32 {
        self.lookahead
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn try_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.node(id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Adjacent node along `direction`, or `None` if blocked or unknown.
    pub fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        self.node(node)?.neighbor(direction)
    }

    /// Node closest to `position`; the first one wins ties.
    pub fn nearest_node(&self, position: Vec2) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for node in &self.nodes {
            let distance = node.position.distance(&position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// First node hit by a ray from `positions[origin]` along `direction`.
fn cast_ray(
    positions: &[Vec2],
    origin: usize,
    direction: Direction,
    lookahead: f32,
    geometry: &impl LevelGeometry,
) -> Option<NodeId> {
    let from = positions[origin];
    let axis = direction.vector();
    let mut hit: Option<(usize, f32)> = None;

    for (index, &position) in positions.iter().enumerate() {
        if index == origin {
            continue;
        }
        let offset = position - from;
        let along = offset.dot(&axis);
        if along <= f32::EPSILON || along > lookahead + f32::EPSILON {
            continue;
        }
        let off_axis = (offset - axis * along).length();
        if off_axis > ALIGNMENT_TOLERANCE {
            continue;
        }
        if hit.is_none_or(|(_, best)| along < best) {
            hit = Some((index, along));
        }
    }

    let (index, along) = hit?;
    if geometry.is_blocked(from, direction, along) {
        return None;
    }
    Some(NodeId(index))
}
