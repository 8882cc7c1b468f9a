pub mod behavior;
pub mod config;
pub mod controller;
pub mod error;
pub mod infra;
pub mod planners;
pub mod sim;
pub mod state;

// Re-export commonly used types for convenience
pub use behavior::{BehaviorMode, BehaviorStateMachine, ModeDurations, Transition};
pub use config::{EngineConfig, StrategyChoice};
pub use controller::{CaptureOutcome, Decision, PursuerSettings, PursuitController};
pub use error::{ConfigError, GraphError, MazeError};
pub use infra::{AStar, Direction, Vec2};
pub use planners::{ChaseStrategy, StrategyKind};
pub use state::{AgentState, Graph, NodeId, PursuerId, TileMaze};
