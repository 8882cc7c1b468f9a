//! Episode statistics for strategy evaluation

use std::collections::VecDeque;

/// Moving average over the last `window_size` values
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f32>,
    window_size: usize,
    sum: f32,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.values.len() >= self.window_size
            && let Some(old) = self.values.pop_front()
        {
            self.sum -= old;
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f32
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How one episode ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    /// Whether a pursuer caught the pursued agent before the frame limit
    pub caught: bool,
    /// Frames simulated
    pub frames: u64,
    /// Pursuers eaten while frightened
    pub pursuers_eaten: u32,
}

/// Accumulated results of one strategy
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    /// Number of evaluation episodes
    pub num_episodes: usize,
    /// Episodes ending in a catch
    pub num_catches: usize,
    /// Frames summed over caught episodes only
    pub frames_to_catch: u64,
    /// Frames summed over all episodes
    pub total_frames: u64,
    pub pursuers_eaten: u32,
    /// Frames-to-catch of the most recent catches
    pub recent_frames: MovingAverage,
}

impl Default for EvaluationMetrics {
    fn default() -> Self {
        Self {
            num_episodes: 0,
            num_catches: 0,
            frames_to_catch: 0,
            total_frames: 0,
            pursuers_eaten: 0,
            recent_frames: MovingAverage::new(10),
        }
    }
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluation episode
    pub fn record_episode(&mut self, outcome: &EpisodeOutcome) {
        self.num_episodes += 1;
        self.total_frames += outcome.frames;
        self.pursuers_eaten += outcome.pursuers_eaten;
        if outcome.caught {
            self.num_catches += 1;
            self.frames_to_catch += outcome.frames;
            self.recent_frames.push(outcome.frames as f32);
        }
    }

    /// Fraction of episodes ending in a catch
    pub fn catch_rate(&self) -> f32 {
        if self.num_episodes > 0 {
            self.num_catches as f32 / self.num_episodes as f32
        } else {
            0.0
        }
    }

    /// Mean frames of the caught episodes
    pub fn mean_frames_to_catch(&self) -> f32 {
        if self.num_catches > 0 {
            self.frames_to_catch as f32 / self.num_catches as f32
        } else {
            0.0
        }
    }

    /// Print summary
    pub fn log_summary(&self, name: &str) {
        tracing::info!("=== {} ===", name);
        tracing::info!("Episodes: {}", self.num_episodes);
        tracing::info!(
            "Catches: {} ({:.1}%)",
            self.num_catches,
            self.catch_rate() * 100.0
        );
        tracing::info!("Mean frames to catch: {:.1}", self.mean_frames_to_catch());
        tracing::info!(
            "Recent frames to catch: {:.1} (last {})",
            self.recent_frames.average(),
            self.recent_frames.len()
        );
        tracing::info!("Pursuers eaten: {}", self.pursuers_eaten);
    }
}
