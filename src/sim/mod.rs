//! Headless stand-in for the game shell: movers, a random-walking pursued
//! agent, collision checks and an evaluator that compares chase strategies.

mod evaluator;
mod metrics;
mod mover;
mod simulation;
mod walker;

pub use evaluator::{ComparisonRunner, EvaluationConfig, Evaluator};
pub use metrics::{EpisodeOutcome, EvaluationMetrics, MovingAverage};
pub use mover::Mover;
pub use simulation::{PursuerSlot, Simulation, SimulationConfig, StepOutcome};
pub use walker::RandomWalker;
