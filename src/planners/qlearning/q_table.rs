use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::infra::Direction;
use crate::planners::qlearning::StateKey;

/// One (state, direction, value) triple of a table snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub direction: Direction,
    pub value: f32,
}

/// State → direction → value.
///
/// Entries are created lazily at 0 the first time they are read or written
/// and are never removed.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<StateKey, [Option<f32>; 4]>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from a snapshot. Order does not matter; a repeated
    /// (state, direction) pair keeps the last value.
    pub fn from_snapshot(entries: impl IntoIterator<Item = QEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.values.entry(entry.state).or_insert([None; 4])[entry.direction.index()] =
                Some(entry.value);
        }
        table
    }

    /// Every entry as a flat list, sorted for stable output.
    pub fn snapshot(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .values
            .iter()
            .flat_map(|(&state, actions)| {
                Direction::ALL.into_iter().filter_map(move |direction| {
                    actions[direction.index()].map(|value| QEntry {
                        state,
                        direction,
                        value,
                    })
                })
            })
            .collect();
        entries.sort_by_key(|entry| (entry.state, entry.direction));
        entries
    }

    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    pub fn entry_count(&self) -> usize {
        self.values
            .values()
            .map(|actions| actions.iter().filter(|value| value.is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value without creating the entry.
    pub fn get(&self, state: &StateKey, direction: Direction) -> Option<f32> {
        self.values
            .get(state)
            .and_then(|actions| actions[direction.index()])
    }

    /// Value of the pair, creating it at 0 if unseen.
    pub fn value(&mut self, state: StateKey, direction: Direction) -> f32 {
        *self.values.entry(state).or_insert([None; 4])[direction.index()].get_or_insert(0.0)
    }

    /// Make sure every listed direction has an entry for `state`.
    pub fn ensure(&mut self, state: StateKey, directions: &[Direction]) {
        let actions = self.values.entry(state).or_insert([None; 4]);
        for direction in directions {
            actions[direction.index()].get_or_insert(0.0);
        }
    }

    /// Largest value among `directions` at `state`; 0 when `directions` is empty.
    pub fn max_value(&mut self, state: StateKey, directions: &[Direction]) -> f32 {
        self.ensure(state, directions);
        directions
            .iter()
            .map(|&direction| self.value(state, direction))
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Highest-valued direction among `directions`, ties keep the first.
    pub fn best_action(&mut self, state: StateKey, directions: &[Direction]) -> Option<Direction> {
        self.ensure(state, directions);
        let mut best: Option<(Direction, f32)> = None;
        for &direction in directions {
            let value = self.value(state, direction);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((direction, value));
            }
        }
        best.map(|(direction, _)| direction)
    }

    /// One-step Q-learning update of `(state, action)` given the observed
    /// `reward` and the state that followed. Returns the new value.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        state: StateKey,
        action: Direction,
        reward: f32,
        next_state: StateKey,
        next_directions: &[Direction],
        alpha: f32,
        gamma: f32,
    ) -> f32 {
        let next_max = self.max_value(next_state, next_directions);
        let current = self.value(state, action);
        let updated = current + alpha * (reward + gamma * next_max - current);
        self.values.entry(state).or_insert([None; 4])[action.index()] = Some(updated);
        updated
    }
}
