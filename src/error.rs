use std::error::Error;
use std::fmt;

use crate::infra::Vec2;
use crate::state::NodeId;

/// Failures while building or querying the maze graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The level geometry produced no nodes at all.
    EmptyGeometry,
    /// A node has no opening in any direction. Every reachable cell must have
    /// at least one, so the level cannot be played.
    NoAvailableDirections { node: NodeId, position: Vec2 },
    /// The handle does not belong to this graph.
    UnknownNode(NodeId),
}

impl fmt::Display for GraphError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphError::EmptyGeometry => write!(formatter, "Level geometry contains no nodes"),
            GraphError::NoAvailableDirections { node, position } => write!(
                formatter,
                "Node {} at {} has no available directions",
                node, position
            ),
            GraphError::UnknownNode(node) => write!(formatter, "Unknown node {}", node),
        }
    }
}

impl Error for GraphError {}

/// Failures while parsing an ASCII maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    NoOpenCells,
}

impl fmt::Display for MazeError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MazeError::Empty => write!(formatter, "Maze text is empty"),
            MazeError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                formatter,
                "Maze row {} has width {} (expected {})",
                row, found, expected
            ),
            MazeError::NoOpenCells => write!(formatter, "Maze has no open cells"),
        }
    }
}

impl Error for MazeError {}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
    UnknownStrategy(String),
    UnknownEncoding(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(formatter, "Invalid value {:?} for {}", value, key)
            }
            ConfigError::UnknownStrategy(name) => {
                write!(formatter, "Unknown chase strategy {:?}", name)
            }
            ConfigError::UnknownEncoding(name) => {
                write!(formatter, "Unknown state encoding {:?}", name)
            }
        }
    }
}

impl Error for ConfigError {}
