//! Per-pursuer behavior modes.
//!
//! Exactly one mode is active at a time. Modes change on explicit
//! enable/disable requests, on timer expiry checked by [`BehaviorStateMachine::tick`],
//! and when a frightened pursuer is eaten. The machine never touches the
//! pursuer's direction: the next node-entry decision of the new mode does.

use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorMode {
    /// Head for the retreat corner.
    Scatter,
    /// Pursue the target with the configured chase strategy.
    Chase,
    /// Flee the target; can be eaten.
    Frightened,
    /// Parked in the holding area.
    Home,
}

impl BehaviorMode {
    pub const ALL: [BehaviorMode; 4] = [
        BehaviorMode::Scatter,
        BehaviorMode::Chase,
        BehaviorMode::Frightened,
        BehaviorMode::Home,
    ];

    /// Mode that takes over when this one is disabled or expires.
    pub fn successor(self) -> BehaviorMode {
        match self {
            BehaviorMode::Scatter => BehaviorMode::Chase,
            BehaviorMode::Chase | BehaviorMode::Frightened | BehaviorMode::Home => {
                BehaviorMode::Scatter
            }
        }
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            BehaviorMode::Scatter => "scatter",
            BehaviorMode::Chase => "chase",
            BehaviorMode::Frightened => "frightened",
            BehaviorMode::Home => "home",
        };
        f.write_str(name)
    }
}

/// How long each mode lasts before expiring. `None` means the mode only ends
/// on an explicit event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeDurations {
    pub scatter: Option<f64>,
    pub chase: Option<f64>,
    pub frightened: Option<f64>,
    pub home: Option<f64>,
}

impl ModeDurations {
    /// Event-driven only, no timers.
    pub fn untimed() -> Self {
        Self::default()
    }

    /// Arcade-like cycle used by the demo.
    pub fn classic() -> Self {
        Self {
            scatter: Some(7.0),
            chase: Some(20.0),
            frightened: Some(8.0),
            home: Some(4.0),
        }
    }

    pub fn get(&self, mode: BehaviorMode) -> Option<f64> {
        match mode {
            BehaviorMode::Scatter => self.scatter,
            BehaviorMode::Chase => self.chase,
            BehaviorMode::Frightened => self.frightened,
            BehaviorMode::Home => self.home,
        }
    }
}

/// A mode change, stamped with the clock time it happened at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: BehaviorMode,
    pub to: BehaviorMode,
    pub at: f64,
}

#[derive(Debug, Clone)]
pub struct BehaviorStateMachine {
    initial: BehaviorMode,
    active: BehaviorMode,
    entered_at: f64,
    durations: ModeDurations,
}

impl BehaviorStateMachine {
    pub fn new(initial: BehaviorMode, durations: ModeDurations, now: f64) -> Self {
        Self {
            initial,
            active: initial,
            entered_at: now,
            durations,
        }
    }

    pub fn active(&self) -> BehaviorMode {
        self.active
    }

    pub fn initial(&self) -> BehaviorMode {
        self.initial
    }

    pub fn durations(&self) -> &ModeDurations {
        &self.durations
    }

    /// Seconds spent in the active mode.
    pub fn time_in_mode(&self, now: f64) -> f64 {
        (now - self.entered_at).max(0.0)
    }

    /// Seconds until the active mode expires, if it is timed.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.durations
            .get(self.active)
            .map(|duration| (duration - self.time_in_mode(now)).max(0.0))
    }

    /// Make `mode` the active mode. Enabling the mode that is already active
    /// is a no-op and does not restart its timer.
    pub fn enable(&mut self, mode: BehaviorMode, now: f64) -> Option<Transition> {
        if mode == self.active {
            return None;
        }
        if mode == BehaviorMode::Frightened && self.active == BehaviorMode::Chase {
            debug!("Chase disabled before entering frightened");
        }
        Some(self.switch_to(mode, now))
    }

    /// End `mode` if it is the active one, handing over to its successor.
    /// Disabling an inactive mode is a no-op.
    pub fn disable(&mut self, mode: BehaviorMode, now: f64) -> Option<Transition> {
        if mode != self.active {
            return None;
        }
        Some(self.switch_to(mode.successor(), now))
    }

    /// Expire the active mode once its duration has elapsed.
    pub fn tick(&mut self, now: f64) -> Option<Transition> {
        let duration = self.durations.get(self.active)?;
        if self.time_in_mode(now) >= duration {
            self.disable(self.active, now)
        } else {
            None
        }
    }

    /// A frightened pursuer that gets eaten goes back to scattering.
    pub fn on_eaten(&mut self, now: f64) -> Option<Transition> {
        self.disable(BehaviorMode::Frightened, now)
    }

    /// Back to the initial mode with a fresh timer.
    pub fn reset(&mut self, now: f64) -> Option<Transition> {
        let transition = (self.active != self.initial).then(|| self.switch_to(self.initial, now));
        self.entered_at = now;
        transition
    }

    fn switch_to(&mut self, mode: BehaviorMode, now: f64) -> Transition {
        let transition = Transition {
            from: self.active,
            to: mode,
            at: now,
        };
        debug!("Mode {} -> {} at {:.2}s", transition.from, transition.to, now);
        self.active = mode;
        self.entered_at = now;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_is_idempotent() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Chase, ModeDurations::untimed(), 0.0);
        assert_eq!(machine.enable(BehaviorMode::Chase, 1.0), None);
        assert_eq!(machine.time_in_mode(1.0), 1.0);
    }

    #[test]
    fn test_frightened_preempts_chase() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Chase, ModeDurations::untimed(), 0.0);
        let transition = machine.enable(BehaviorMode::Frightened, 2.0).unwrap();

        assert_eq!(transition.from, BehaviorMode::Chase);
        assert_eq!(transition.to, BehaviorMode::Frightened);
        assert_eq!(machine.active(), BehaviorMode::Frightened);
    }

    #[test]
    fn test_disable_hands_over_to_successor() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Scatter, ModeDurations::untimed(), 0.0);
        assert_eq!(machine.disable(BehaviorMode::Chase, 0.5), None);

        machine.disable(BehaviorMode::Scatter, 1.0);
        assert_eq!(machine.active(), BehaviorMode::Chase);
        machine.disable(BehaviorMode::Chase, 2.0);
        assert_eq!(machine.active(), BehaviorMode::Scatter);

        machine.enable(BehaviorMode::Home, 3.0);
        machine.disable(BehaviorMode::Home, 4.0);
        assert_eq!(machine.active(), BehaviorMode::Scatter);
    }

    #[test]
    fn test_timed_cycle() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Scatter, ModeDurations::classic(), 0.0);

        assert_eq!(machine.tick(6.9), None);
        let to_chase = machine.tick(7.0).unwrap();
        assert_eq!(to_chase.to, BehaviorMode::Chase);
        assert_eq!(machine.remaining(17.0), Some(10.0));

        assert_eq!(machine.tick(27.0).unwrap().to, BehaviorMode::Scatter);
    }

    #[test]
    fn test_frightened_expires_to_scatter() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Chase, ModeDurations::classic(), 0.0);
        machine.enable(BehaviorMode::Frightened, 5.0);

        assert_eq!(machine.tick(12.0), None);
        assert_eq!(machine.tick(13.0).unwrap().to, BehaviorMode::Scatter);
    }

    #[test]
    fn test_eaten_only_applies_when_frightened() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Chase, ModeDurations::untimed(), 0.0);
        assert_eq!(machine.on_eaten(1.0), None);

        machine.enable(BehaviorMode::Frightened, 1.0);
        let transition = machine.on_eaten(2.0).unwrap();
        assert_eq!(transition.from, BehaviorMode::Frightened);
        assert_eq!(transition.to, BehaviorMode::Scatter);
    }

    #[test]
    fn test_untimed_modes_never_expire() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Chase, ModeDurations::untimed(), 0.0);
        assert_eq!(machine.tick(1_000_000.0), None);
        assert_eq!(machine.remaining(5.0), None);
    }

    #[test]
    fn test_reset_restores_initial_mode() {
        let mut machine = BehaviorStateMachine::new(BehaviorMode::Home, ModeDurations::classic(), 0.0);
        machine.tick(4.0);
        assert_eq!(machine.active(), BehaviorMode::Scatter);

        let transition = machine.reset(10.0).unwrap();
        assert_eq!(transition.to, BehaviorMode::Home);
        assert_eq!(machine.reset(11.0), None);
        assert_eq!(machine.time_in_mode(11.0), 0.0);
    }
}
