use crate::infra::Direction;
use crate::state::{AgentState, Graph, NodeId};

/// Constant-speed movement along graph edges.
///
/// Stands in for the physics mover and the trigger volumes of a real game: it
/// reports a node-entry event whenever the agent reaches a node centre, and
/// again on every frame the agent is parked at a node (no direction, or its
/// direction has no neighbor) so a new decision can be made.
#[derive(Debug, Clone)]
pub struct Mover {
    from: NodeId,
    edge: Option<(NodeId, Direction)>,
}

impl Mover {
    pub fn at(node: NodeId) -> Self {
        Self { from: node, edge: None }
    }

    /// Last node reached.
    pub fn node(&self) -> NodeId {
        self.from
    }

    /// Node being travelled to, if between nodes.
    pub fn heading_to(&self) -> Option<NodeId> {
        self.edge.map(|(node, _)| node)
    }

    /// Teleport the agent onto `node` and stop it.
    pub fn place(&mut self, graph: &Graph, agent: &mut AgentState, node: NodeId) {
        self.from = node;
        self.edge = None;
        if let Some(placed) = graph.node(node) {
            agent.position = placed.position();
        }
        agent.current_node = Some(node);
        agent.set_direction(None);
    }

    /// Advance `dt` seconds. Returns the node entered, if any.
    pub fn step(&mut self, graph: &Graph, agent: &mut AgentState, dt: f32) -> Option<NodeId> {
        let (toward, heading) = match self.edge {
            Some(edge) => edge,
            None => {
                let next = agent
                    .direction
                    .and_then(|direction| graph.neighbor(self.from, direction).map(|n| (n, direction)));
                match next {
                    Some(edge) => {
                        self.edge = Some(edge);
                        edge
                    }
                    None => {
                        // Parked against a wall: stop and ask again.
                        agent.set_direction(None);
                        return Some(self.from);
                    }
                }
            }
        };

        let (toward, heading) = if agent.direction == Some(heading.opposite()) {
            let reversed = (self.from, heading.opposite());
            self.from = toward;
            self.edge = Some(reversed);
            reversed
        } else {
            (toward, heading)
        };

        let destination = graph.node(toward)?.position();
        let remaining = agent.position.distance(&destination);
        let travel = agent.speed * dt;
        if travel >= remaining {
            agent.position = destination;
            agent.current_node = Some(toward);
            self.from = toward;
            self.edge = None;
            Some(toward)
        } else {
            agent.position = agent.position + heading.vector() * travel;
            None
        }
    }
}
