use serde::{Deserialize, Serialize};

use crate::infra::{Sector, Vec2};
use crate::state::NodeId;

/// Index into the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateKey {
    Node(NodeId),
    NodeSector(NodeId, Sector),
    Displacement { dx: i32, dy: i32 },
}

/// How a decision point is turned into a [`StateKey`]. One pursuer must keep
/// the same encoding for the lifetime of its table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StateEncoding {
    /// The node alone.
    Node,
    /// The node plus the octant of the target's bearing.
    #[default]
    NodeSector,
    /// Target offset divided by `cell_size`, rounded and clamped to
    /// `[-clamp, clamp]` on each axis.
    Displacement { cell_size: f32, clamp: i32 },
}

impl StateEncoding {
    pub fn displacement() -> Self {
        StateEncoding::Displacement {
            cell_size: 1.0,
            clamp: 8,
        }
    }

    pub fn encode(&self, node: NodeId, pursuer: Vec2, target: Vec2) -> StateKey {
        let offset = target - pursuer;
        match *self {
            StateEncoding::Node => StateKey::Node(node),
            StateEncoding::NodeSector => StateKey::NodeSector(node, Sector::from_offset(offset)),
            StateEncoding::Displacement { cell_size, clamp } => {
                let cell = if cell_size > 0.0 { cell_size } else { 1.0 };
                let quantize = |v: f32| ((v / cell).round() as i32).clamp(-clamp, clamp);
                StateKey::Displacement {
                    dx: quantize(offset.x),
                    dy: quantize(offset.y),
                }
            }
        }
    }
}
