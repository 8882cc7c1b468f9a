use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::behavior::{BehaviorMode, ModeDurations};
use crate::controller::{PursuerSettings, PursuitController};
use crate::infra::{DefaultObserver, Vec2};
use crate::planners::StrategyKind;
use crate::sim::metrics::EvaluationMetrics;
use crate::sim::simulation::{Simulation, SimulationConfig};
use crate::state::{Graph, PursuerId, TileMaze};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub episodes: usize,
    pub simulation: SimulationConfig,
    pub seed: Option<u64>,
    pub initial_mode: BehaviorMode,
    pub durations: ModeDurations,
    pub status_log_interval_seconds: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 20,
            simulation: SimulationConfig::default(),
            seed: None,
            initial_mode: BehaviorMode::Chase,
            durations: ModeDurations::untimed(),
            status_log_interval_seconds: 5.0,
        }
    }
}

/// Runs a batch of episodes per strategy on one maze.
#[derive(Debug, Clone)]
pub struct Evaluator {
    graph: Arc<Graph>,
    retreats: Vec<Vec2>,
    pursuer_count: usize,
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(graph: Arc<Graph>, retreats: Vec<Vec2>, pursuer_count: usize, config: EvaluationConfig) -> Self {
        Self {
            graph,
            retreats,
            pursuer_count: pursuer_count.max(1),
            config,
        }
    }

    /// One pursuer per `G` in the maze, scattering to the maze corners.
    pub fn for_maze(maze: &TileMaze, graph: Arc<Graph>, config: EvaluationConfig) -> Self {
        Self::new(
            graph,
            maze.corners().to_vec(),
            maze.pursuer_spawns().len(),
            config,
        )
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn pursuer_count(&self) -> usize {
        self.pursuer_count
    }

    /// Run every episode with pursuers built by `strategy` (called once per
    /// pursuer index). Learned state carries over between episodes.
    pub fn evaluate(
        &self,
        name: &str,
        mut strategy: impl FnMut(usize) -> StrategyKind,
    ) -> EvaluationMetrics {
        let controllers = (0..self.pursuer_count)
            .map(|index| {
                let settings = PursuerSettings {
                    durations: self.config.durations,
                    retreat_corner: self
                        .retreats
                        .get(index % self.retreats.len().max(1))
                        .copied()
                        .unwrap_or_default(),
                    status_log_interval_seconds: self.config.status_log_interval_seconds,
                    seed: self.config.seed.map(|seed| seed.wrapping_add(index as u64 + 1)),
                };
                PursuitController::configure(
                    PursuerId(index),
                    Arc::clone(&self.graph),
                    self.config.initial_mode,
                    strategy(index),
                    settings,
                    0.0,
                )
            })
            .collect();

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut simulation = Simulation::new(
            Arc::clone(&self.graph),
            self.config.simulation.clone(),
            controllers,
            rng,
            DefaultObserver,
        );

        info!(
            "Evaluating {} with {} pursuers over {} episodes",
            name, self.pursuer_count, self.config.episodes
        );
        let mut metrics = EvaluationMetrics::new();
        for episode in 0..self.config.episodes {
            let outcome = simulation.run_episode();
            debug!(
                "{} episode {}: caught={}, frames={}, eaten={}",
                name, episode, outcome.caught, outcome.frames, outcome.pursuers_eaten
            );
            metrics.record_episode(&outcome);
        }

        for slot in simulation.pursuers() {
            let strategy = slot.controller.strategy();
            if let Some(table) = strategy.q_table() {
                info!(
                    "{} learned {} states ({} entries)",
                    slot.controller.id(),
                    table.state_count(),
                    table.entry_count()
                );
            }
        }
        metrics
    }
}

/// Side-by-side results of several strategies.
#[derive(Debug, Default)]
pub struct ComparisonRunner {
    results: Vec<(String, EvaluationMetrics)>,
}

impl ComparisonRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, metrics: EvaluationMetrics) {
        self.results.push((name.to_string(), metrics));
    }

    pub fn results(&self) -> &[(String, EvaluationMetrics)] {
        &self.results
    }

    /// Highest catch rate; fewer frames to catch breaks ties. Equal results
    /// keep the first recorded.
    pub fn best(&self) -> Option<&str> {
        let mut best: Option<&(String, EvaluationMetrics)> = None;
        for entry in &self.results {
            let better = best.is_none_or(|(_, current)| {
                let rate = entry.1.catch_rate();
                let current_rate = current.catch_rate();
                rate > current_rate
                    || (rate == current_rate
                        && entry.1.mean_frames_to_catch() < current.mean_frames_to_catch())
            });
            if better {
                best = Some(entry);
            }
        }
        best.map(|(name, _)| name.as_str())
    }

    pub fn log_comparison(&self) {
        info!("=== Strategy comparison ===");
        for (name, metrics) in &self.results {
            metrics.log_summary(name);
        }
        if let Some(best) = self.best() {
            info!("Best strategy: {}", best);
        }
    }
}
