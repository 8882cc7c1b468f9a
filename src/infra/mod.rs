mod clock;
mod observer;
mod pathfinding;
mod types;

pub use clock::{Clock, FrameClock, SystemClock};
pub use observer::{
    CompositeObserver, DefaultObserver, PursuitEvent, PursuitObserver, RecordingObserver,
};
pub use pathfinding::{AStar, Route};
pub use types::{Direction, Sector, Vec2};

// ============================================================================
// Helper functions
// ============================================================================

/// Grid direction from `from` toward `to`, if the offset snaps to one.
pub fn direction_toward(from: Vec2, to: Vec2) -> Option<Direction> {
    Direction::snap(to - from)
}
