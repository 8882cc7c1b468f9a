use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, trace};

use crate::controller::{CaptureOutcome, PursuitController};
use crate::infra::{Clock, FrameClock, PursuitObserver};
use crate::sim::metrics::EpisodeOutcome;
use crate::sim::mover::Mover;
use crate::sim::walker::RandomWalker;
use crate::state::{AgentState, Graph, NodeId, PursuerId};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Episode length limit.
    pub max_frames: u64,
    pub frame_seconds: f64,
    /// A pursuer closer than this touches the pursued agent.
    pub capture_distance: f32,
    pub pursued_speed: f32,
    pub pursuer_speed: f32,
    /// Pursuers never spawn closer than this to the pursued agent, space permitting.
    pub min_spawn_distance: f32,
    /// Frighten every pursuer this often, like eating a power pellet.
    pub power_interval_seconds: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_frames: 3000,
            frame_seconds: 1.0 / 60.0,
            capture_distance: 0.5,
            pursued_speed: 6.0,
            pursuer_speed: 8.0,
            min_spawn_distance: 4.0,
            power_interval_seconds: None,
        }
    }
}

/// Result of advancing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Caught(PursuerId),
}

/// One simulated pursuer.
#[derive(Debug)]
pub struct PursuerSlot {
    pub controller: PursuitController,
    pub state: AgentState,
    mover: Mover,
    spawn: NodeId,
}

impl PursuerSlot {
    pub fn spawn(&self) -> NodeId {
        self.spawn
    }
}

/// Headless, frame-driven pursuit. Controllers persist across episodes, so
/// anything a strategy learns carries over.
pub struct Simulation<O: PursuitObserver> {
    graph: Arc<Graph>,
    config: SimulationConfig,
    clock: FrameClock,
    rng: StdRng,
    walker: RandomWalker,
    pursued: AgentState,
    pursued_mover: Mover,
    pursuers: Vec<PursuerSlot>,
    observer: O,
    last_power: f64,
    frame: u64,
    eaten: u32,
}

impl<O: PursuitObserver> Simulation<O> {
    pub fn new(
        graph: Arc<Graph>,
        config: SimulationConfig,
        controllers: Vec<PursuitController>,
        rng: StdRng,
        observer: O,
    ) -> Self {
        let origin = NodeId(0);
        let position = graph.node(origin).map(|node| node.position()).unwrap_or_default();
        let pursuers = controllers
            .into_iter()
            .map(|controller| PursuerSlot {
                controller,
                state: AgentState::at_node(origin, position, config.pursuer_speed),
                mover: Mover::at(origin),
                spawn: origin,
            })
            .collect();
        Self {
            clock: FrameClock::new(config.frame_seconds),
            pursued: AgentState::at_node(origin, position, config.pursued_speed),
            pursued_mover: Mover::at(origin),
            graph,
            config,
            rng,
            walker: RandomWalker,
            pursuers,
            observer,
            last_power: 0.0,
            frame: 0,
            eaten: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn pursued(&self) -> &AgentState {
        &self.pursued
    }

    pub fn pursuers(&self) -> &[PursuerSlot] {
        &self.pursuers
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Frames since the episode started.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Random spawn points for everybody and a fresh round for every
    /// controller.
    pub fn start_episode(&mut self) {
        let now = self.clock.now();
        let nodes: Vec<NodeId> = self.graph.nodes().map(|node| node.id()).collect();
        let Some(&pursued_node) = nodes.choose(&mut self.rng) else {
            return;
        };
        self.pursued_mover = Mover::at(pursued_node);
        self.pursued_mover
            .place(&self.graph, &mut self.pursued, pursued_node);

        let far: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|node| node.position().distance(&self.pursued.position) >= self.config.min_spawn_distance)
            .map(|node| node.id())
            .collect();
        let pool = if far.is_empty() { &nodes } else { &far };

        for slot in &mut self.pursuers {
            let spawn = pool.choose(&mut self.rng).copied().unwrap_or(pursued_node);
            slot.spawn = spawn;
            slot.mover = Mover::at(spawn);
            slot.mover.place(&self.graph, &mut slot.state, spawn);
            slot.controller
                .reset(now, &mut slot.state, &mut self.observer);
        }

        self.last_power = now;
        self.frame = 0;
        self.eaten = 0;
        debug!(
            "Episode start: pursued at {}, pursuers at {:?}",
            self.pursued.position,
            self.pursuers.iter().map(|slot| slot.spawn).collect::<Vec<_>>()
        );
    }

    /// Frighten every active pursuer.
    pub fn frighten_all(&mut self) {
        let now = self.clock.now();
        for slot in &mut self.pursuers {
            slot.controller.frighten(now, &mut self.observer);
        }
    }

    pub fn step(&mut self) -> StepOutcome {
        let dt = self.clock.delta_time() as f32;
        let now = self.clock.advance();
        self.frame += 1;

        if let Some(interval) = self.config.power_interval_seconds
            && now - self.last_power >= interval
        {
            trace!("Power pellet at {:.2}s", now);
            self.frighten_all();
            self.last_power = now;
        }

        if let Some(node) = self.pursued_mover.step(&self.graph, &mut self.pursued, dt)
            && let Some(entered) = self.graph.node(node)
        {
            let direction = self
                .walker
                .choose(entered, self.pursued.direction, &mut self.rng);
            self.pursued.set_direction(direction);
        }

        for slot in &mut self.pursuers {
            slot.controller
                .update(now, &slot.state, &self.pursued, &mut self.observer);
            if let Some(node) = slot.mover.step(&self.graph, &mut slot.state, dt) {
                slot.controller.on_node_enter(
                    node,
                    now,
                    &mut slot.state,
                    &self.pursued,
                    &mut self.observer,
                );
            }
        }

        for slot in &mut self.pursuers {
            if slot.state.distance_to(&self.pursued) >= self.config.capture_distance {
                continue;
            }
            match slot
                .controller
                .on_collision_with_pursued(now, &mut self.observer)
            {
                CaptureOutcome::PursuedCaught => {
                    return StepOutcome::Caught(slot.controller.id());
                }
                CaptureOutcome::PursuerEaten => {
                    self.eaten += 1;
                    slot.mover.place(&self.graph, &mut slot.state, slot.spawn);
                    slot.controller
                        .reset(now, &mut slot.state, &mut self.observer);
                }
                CaptureOutcome::Ignored => {}
            }
        }

        StepOutcome::Running
    }

    /// Run one episode until a catch or the frame limit.
    pub fn run_episode(&mut self) -> EpisodeOutcome {
        self.start_episode();
        while self.frame < self.config.max_frames {
            if let StepOutcome::Caught(by) = self.step() {
                debug!("Episode over: {} caught the pursued agent after {} frames", by, self.frame);
                return EpisodeOutcome {
                    caught: true,
                    frames: self.frame,
                    pursuers_eaten: self.eaten,
                };
            }
        }
        debug!("Episode over: frame limit {} reached", self.config.max_frames);
        EpisodeOutcome {
            caught: false,
            frames: self.frame,
            pursuers_eaten: self.eaten,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::behavior::BehaviorMode;
    use crate::controller::PursuerSettings;
    use crate::infra::{PursuitEvent, RecordingObserver};
    use crate::planners::StrategyKind;
    use crate::state::TileMaze;

    fn simulation(kind: StrategyKind, config: SimulationConfig) -> Simulation<RecordingObserver> {
        let graph = Arc::new(Graph::build(&TileMaze::classic().unwrap()).unwrap());
        let controller = PursuitController::configure(
            PursuerId(0),
            Arc::clone(&graph),
            BehaviorMode::Chase,
            kind,
            PursuerSettings {
                seed: Some(1),
                ..PursuerSettings::default()
            },
            0.0,
        );
        Simulation::new(
            graph,
            config,
            vec![controller],
            StdRng::seed_from_u64(5),
            RecordingObserver::new(),
        )
    }

    #[test]
    fn test_greedy_eventually_catches() {
        let mut sim = simulation(StrategyKind::Greedy, SimulationConfig::default());
        let outcome = sim.run_episode();

        assert!(outcome.frames <= 3000);
        if outcome.caught {
            assert_eq!(sim.observer().pursued_caught(), 1);
        }
    }

    #[test]
    fn test_spawns_respect_minimum_distance() {
        let mut sim = simulation(StrategyKind::Greedy, SimulationConfig::default());
        for _ in 0..10 {
            sim.start_episode();
            let pursuer = &sim.pursuers()[0].state;
            assert!(pursuer.distance_to(sim.pursued()) >= 4.0);
            assert_eq!(sim.frame(), 0);
        }
    }

    #[test]
    fn test_agents_stay_on_open_cells() {
        let maze = TileMaze::classic().unwrap();
        let mut sim = simulation(StrategyKind::Greedy, SimulationConfig::default());
        sim.start_episode();

        for _ in 0..600 {
            if sim.step() != StepOutcome::Running {
                break;
            }
            assert!(!maze.is_wall_at(sim.pursued().position));
            assert!(!maze.is_wall_at(sim.pursuers()[0].state.position));
        }
    }

    #[test]
    fn test_power_interval_frightens_pursuers() {
        let config = SimulationConfig {
            power_interval_seconds: Some(0.5),
            ..SimulationConfig::default()
        };
        let mut sim = simulation(StrategyKind::Greedy, config);
        sim.start_episode();
        for _ in 0..40 {
            if sim.step() != StepOutcome::Running {
                return;
            }
        }

        let frightened = sim.observer().events.iter().any(|event| {
            matches!(
                event,
                PursuitEvent::ModeChanged {
                    to: BehaviorMode::Frightened,
                    ..
                }
            )
        });
        assert!(frightened);
    }

    #[test]
    fn test_q_table_persists_across_episodes() {
        let config = SimulationConfig {
            max_frames: 300,
            ..SimulationConfig::default()
        };
        let mut sim = simulation(StrategyKind::QLearning(Default::default()), config);

        sim.run_episode();
        let after_first = sim.pursuers()[0]
            .controller
            .strategy()
            .q_table()
            .map(|table| table.entry_count())
            .unwrap_or(0);
        sim.run_episode();
        let after_second = sim.pursuers()[0]
            .controller
            .strategy()
            .q_table()
            .map(|table| table.entry_count())
            .unwrap_or(0);

        assert!(after_first > 0);
        assert!(after_second >= after_first);
    }
}
