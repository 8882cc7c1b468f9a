use std::sync::Arc;

use tracing::{debug, info};

use crate::behavior::{BehaviorMode, BehaviorStateMachine, ModeDurations, Transition};
use crate::infra::{Direction, PursuitObserver, Vec2};
use crate::planners::{ChaseContext, ChaseStrategy, StrategyKind, flee_direction, greedy_direction};
use crate::state::{AgentState, Graph, NodeId, PursuerId};

/// Per-pursuer settings that are not part of the chase strategy itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PursuerSettings {
    pub durations: ModeDurations,
    /// Where the pursuer heads while scattering.
    pub retreat_corner: Vec2,
    /// Seconds between two status log lines.
    pub status_log_interval_seconds: f64,
    /// Seed for any randomness in the strategy.
    pub seed: Option<u64>,
}

impl Default for PursuerSettings {
    fn default() -> Self {
        Self {
            durations: ModeDurations::untimed(),
            retreat_corner: Vec2::ZERO,
            status_log_interval_seconds: 5.0,
            seed: None,
        }
    }
}

/// Outcome of a node-entry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A new direction was set on the pursuer.
    Move(Direction),
    /// No way out: the pursuer stands still.
    Hold,
    /// The event was ignored and the direction left as it was.
    Unchanged,
}

/// Outcome of touching the pursued agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    PursuerEaten,
    PursuedCaught,
    Ignored,
}

/// Façade for one pursuer: owns its behavior modes and its chase strategy,
/// turns node-entry events into direction changes and collisions into
/// capture events.
#[derive(Debug)]
pub struct PursuitController {
    id: PursuerId,
    graph: Arc<Graph>,
    behavior: BehaviorStateMachine,
    strategy: Box<dyn ChaseStrategy>,
    settings: PursuerSettings,
    active: bool,
    last_status_log: f64,
    decisions: u64,
}

impl PursuitController {
    pub fn configure(
        id: PursuerId,
        graph: Arc<Graph>,
        initial_mode: BehaviorMode,
        kind: StrategyKind,
        settings: PursuerSettings,
        now: f64,
    ) -> Self {
        debug!("Configuring {} with {} strategy in {} mode", id, kind.name(), initial_mode);
        let strategy = kind.build(settings.seed);
        Self {
            id,
            graph,
            behavior: BehaviorStateMachine::new(initial_mode, settings.durations, now),
            strategy,
            settings,
            active: true,
            last_status_log: now,
            decisions: 0,
        }
    }

    pub fn id(&self) -> PursuerId {
        self.id
    }

    pub fn mode(&self) -> BehaviorMode {
        self.behavior.active()
    }

    pub fn behavior(&self) -> &BehaviorStateMachine {
        &self.behavior
    }

    pub fn strategy(&self) -> &dyn ChaseStrategy {
        self.strategy.as_ref()
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn settings(&self) -> &PursuerSettings {
        &self.settings
    }

    /// False after the pursuer was eaten, until the next [`reset`](Self::reset).
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Per-frame work: mode timers, strategy housekeeping, status logging.
    pub fn update(
        &mut self,
        now: f64,
        pursuer: &AgentState,
        target: &AgentState,
        observer: &mut dyn PursuitObserver,
    ) {
        if !self.active {
            return;
        }
        if let Some(transition) = self.behavior.tick(now) {
            self.notify(&transition, observer);
        }
        if self.behavior.active() == BehaviorMode::Chase {
            let ctx = ChaseContext {
                graph: &self.graph,
                pursuer,
                target,
                now,
            };
            self.strategy.update(&ctx);
        }
        if now - self.last_status_log >= self.settings.status_log_interval_seconds {
            self.log_status(now, pursuer);
            self.last_status_log = now;
        }
    }

    /// Decide the pursuer's next direction after it entered `node`.
    ///
    /// The pursuer's current node is always updated. Inactive pursuers and
    /// pursuers at home leave their direction untouched.
    pub fn on_node_enter(
        &mut self,
        node: NodeId,
        now: f64,
        pursuer: &mut AgentState,
        target: &AgentState,
        observer: &mut dyn PursuitObserver,
    ) -> Decision {
        let graph = Arc::clone(&self.graph);
        let Some(entered) = graph.node(node) else {
            debug!("{} entered unknown node {}", self.id, node);
            return Decision::Unchanged;
        };
        pursuer.current_node = Some(node);
        if !self.active {
            return Decision::Unchanged;
        }

        let choice = match self.behavior.active() {
            BehaviorMode::Home => return Decision::Unchanged,
            BehaviorMode::Chase => {
                let ctx = ChaseContext {
                    graph: &graph,
                    pursuer: &*pursuer,
                    target,
                    now,
                };
                self.strategy.decide(&ctx, entered)
            }
            BehaviorMode::Scatter => greedy_direction(
                entered,
                pursuer.direction,
                pursuer.position,
                self.settings.retreat_corner,
            ),
            BehaviorMode::Frightened => {
                flee_direction(entered, pursuer.direction, pursuer.position, target.position)
            }
        };

        self.decisions += 1;
        pursuer.set_direction(choice);
        observer.on_direction_chosen(self.id, node, choice);
        match choice {
            Some(direction) => Decision::Move(direction),
            None => Decision::Hold,
        }
    }

    /// The pursuer touched the pursued agent.
    pub fn on_collision_with_pursued(
        &mut self,
        now: f64,
        observer: &mut dyn PursuitObserver,
    ) -> CaptureOutcome {
        if !self.active {
            return CaptureOutcome::Ignored;
        }
        if self.behavior.active() == BehaviorMode::Frightened {
            if let Some(transition) = self.behavior.on_eaten(now) {
                self.notify(&transition, observer);
            }
            self.active = false;
            info!("{} eaten at {:.2}s", self.id, now);
            observer.on_pursuer_caught(self.id);
            CaptureOutcome::PursuerEaten
        } else {
            info!("{} caught the pursued agent at {:.2}s", self.id, now);
            observer.on_pursued_caught(self.id);
            CaptureOutcome::PursuedCaught
        }
    }

    /// Enter frightened mode. Returns false if already frightened or inactive.
    pub fn frighten(&mut self, now: f64, observer: &mut dyn PursuitObserver) -> bool {
        self.enable_mode(BehaviorMode::Frightened, now, observer)
    }

    pub fn enable_mode(
        &mut self,
        mode: BehaviorMode,
        now: f64,
        observer: &mut dyn PursuitObserver,
    ) -> bool {
        if !self.active {
            return false;
        }
        match self.behavior.enable(mode, now) {
            Some(transition) => {
                self.notify(&transition, observer);
                true
            }
            None => false,
        }
    }

    pub fn disable_mode(
        &mut self,
        mode: BehaviorMode,
        now: f64,
        observer: &mut dyn PursuitObserver,
    ) -> bool {
        match self.behavior.disable(mode, now) {
            Some(transition) => {
                self.notify(&transition, observer);
                true
            }
            None => false,
        }
    }

    /// Start a new round: initial mode, pursuer snapped to the closest node
    /// and standing still, transient strategy state dropped. Learned values
    /// are kept.
    pub fn reset(&mut self, now: f64, pursuer: &mut AgentState, observer: &mut dyn PursuitObserver) {
        if let Some(transition) = self.behavior.reset(now) {
            self.notify(&transition, observer);
        }
        self.strategy.reset();
        self.active = true;
        self.last_status_log = now;
        pursuer.current_node = self.graph.nearest_node(pursuer.position);
        pursuer.set_direction(None);
    }

    /// Report a mode change. Leaving Chase drops the strategy's transient
    /// state so nothing decided before the switch is credited after it.
    fn notify(&mut self, transition: &Transition, observer: &mut dyn PursuitObserver) {
        if transition.from == BehaviorMode::Chase {
            debug!("{} left chase, dropping {} transient state", self.id, self.strategy.name());
            self.strategy.reset();
        }
        observer.on_mode_changed(self.id, transition);
    }

    fn log_status(&self, now: f64, pursuer: &AgentState) {
        let node = pursuer
            .current_node
            .map(|node| node.to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(
            "{} [{:.1}s] mode: {}, node: {}, pos: {}, decisions: {}, {}: {}",
            self.id,
            now,
            self.behavior.active(),
            node,
            pursuer.position,
            self.decisions,
            self.strategy.name(),
            self.strategy.status()
        );
    }
}
