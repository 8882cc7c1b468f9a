use tracing::{debug, info, trace};

use crate::behavior::{BehaviorMode, Transition};
use crate::infra::Direction;
use crate::state::{NodeId, PursuerId};

/// Everything a pursuit controller reports to the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum PursuitEvent {
    /// The pursuer was eaten by the pursued agent while frightened.
    PursuerCaught { pursuer: PursuerId },
    /// The pursuer caught the pursued agent.
    PursuedCaught { by: PursuerId },
    ModeChanged {
        pursuer: PursuerId,
        from: BehaviorMode,
        to: BehaviorMode,
        at: f64,
    },
    DirectionChosen {
        pursuer: PursuerId,
        node: NodeId,
        direction: Option<Direction>,
    },
}

/// Trait for observing pursuit events
pub trait PursuitObserver {
    /// Called when a frightened pursuer collides with the pursued agent
    fn on_pursuer_caught(&mut self, pursuer: PursuerId);

    /// Called when a pursuer catches the pursued agent
    fn on_pursued_caught(&mut self, by: PursuerId);

    /// Called whenever a behavior mode transition happens
    fn on_mode_changed(&mut self, _pursuer: PursuerId, _transition: &Transition) {}

    /// Called after every node-entry decision
    fn on_direction_chosen(
        &mut self,
        _pursuer: PursuerId,
        _node: NodeId,
        _direction: Option<Direction>,
    ) {
    }
}

/// Logs every event.
pub struct DefaultObserver;

impl PursuitObserver for DefaultObserver {
    fn on_pursuer_caught(&mut self, pursuer: PursuerId) {
        info!("{} was eaten", pursuer);
    }

    fn on_pursued_caught(&mut self, by: PursuerId) {
        info!("Pursued agent caught by {}", by);
    }

    fn on_mode_changed(&mut self, pursuer: PursuerId, transition: &Transition) {
        debug!(
            "{}: {} -> {} at {:.2}s",
            pursuer, transition.from, transition.to, transition.at
        );
    }

    fn on_direction_chosen(&mut self, pursuer: PursuerId, node: NodeId, direction: Option<Direction>) {
        match direction {
            Some(direction) => trace!("{} at {} heads {}", pursuer, node, direction),
            None => trace!("{} at {} holds", pursuer, node),
        }
    }
}

/// Collects events in order of arrival.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<PursuitEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<PursuitEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pursued_caught(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, PursuitEvent::PursuedCaught { .. }))
            .count()
    }

    pub fn pursuers_caught(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, PursuitEvent::PursuerCaught { .. }))
            .count()
    }
}

impl PursuitObserver for RecordingObserver {
    fn on_pursuer_caught(&mut self, pursuer: PursuerId) {
        self.events.push(PursuitEvent::PursuerCaught { pursuer });
    }

    fn on_pursued_caught(&mut self, by: PursuerId) {
        self.events.push(PursuitEvent::PursuedCaught { by });
    }

    fn on_mode_changed(&mut self, pursuer: PursuerId, transition: &Transition) {
        self.events.push(PursuitEvent::ModeChanged {
            pursuer,
            from: transition.from,
            to: transition.to,
            at: transition.at,
        });
    }

    fn on_direction_chosen(&mut self, pursuer: PursuerId, node: NodeId, direction: Option<Direction>) {
        self.events.push(PursuitEvent::DirectionChosen {
            pursuer,
            node,
            direction,
        });
    }
}

pub struct CompositeObserver {
    observers: Vec<Box<dyn PursuitObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Box<dyn PursuitObserver>>) -> Self {
        Self { observers }
    }
}

impl PursuitObserver for CompositeObserver {
    fn on_pursuer_caught(&mut self, pursuer: PursuerId) {
        for observer in &mut self.observers {
            observer.on_pursuer_caught(pursuer);
        }
    }

    fn on_pursued_caught(&mut self, by: PursuerId) {
        for observer in &mut self.observers {
            observer.on_pursued_caught(by);
        }
    }

    fn on_mode_changed(&mut self, pursuer: PursuerId, transition: &Transition) {
        for observer in &mut self.observers {
            observer.on_mode_changed(pursuer, transition);
        }
    }

    fn on_direction_chosen(&mut self, pursuer: PursuerId, node: NodeId, direction: Option<Direction>) {
        for observer in &mut self.observers {
            observer.on_direction_chosen(pursuer, node, direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_counts() {
        let mut observer = RecordingObserver::new();
        observer.on_pursued_caught(PursuerId(1));
        observer.on_pursuer_caught(PursuerId(2));
        observer.on_pursued_caught(PursuerId(0));

        assert_eq!(observer.pursued_caught(), 2);
        assert_eq!(observer.pursuers_caught(), 1);
        assert_eq!(observer.take().len(), 3);
        assert!(observer.events.is_empty());
    }

    #[test]
    fn test_composite_forwards_to_all() {
        struct Counter(std::rc::Rc<std::cell::Cell<usize>>);
        impl PursuitObserver for Counter {
            fn on_pursuer_caught(&mut self, _: PursuerId) {
                self.0.set(self.0.get() + 1);
            }
            fn on_pursued_caught(&mut self, _: PursuerId) {}
        }

        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut composite = CompositeObserver::new(vec![
            Box::new(Counter(count.clone())),
            Box::new(Counter(count.clone())),
            Box::new(DefaultObserver),
        ]);
        composite.on_pursuer_caught(PursuerId(0));
        composite.on_direction_chosen(PursuerId(0), NodeId(0), None);

        assert_eq!(count.get(), 2);
    }
}
