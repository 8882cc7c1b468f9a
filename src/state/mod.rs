mod agent;
mod geometry;
mod graph;

pub use agent::{AgentState, PursuerId};
pub use geometry::{CLASSIC_MAZE, LevelGeometry, TileMaze};
pub use graph::{DEFAULT_LOOKAHEAD, Graph, Node, NodeId};
