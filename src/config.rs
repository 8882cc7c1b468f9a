use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::behavior::ModeDurations;
use crate::error::ConfigError;
use crate::planners::{AStarConfig, QLearningConfig, StateEncoding, StrategyKind};
use crate::sim::{EvaluationConfig, SimulationConfig};

/// Chase strategy selectable from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyChoice {
    Greedy,
    AStar,
    QLearning,
}

impl StrategyChoice {
    pub const ALL: [StrategyChoice; 3] = [
        StrategyChoice::Greedy,
        StrategyChoice::AStar,
        StrategyChoice::QLearning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyChoice::Greedy => "greedy",
            StrategyChoice::AStar => "astar",
            StrategyChoice::QLearning => "qlearning",
        }
    }
}

/// Everything the demo binary can be told through `GHOSTCHASE_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Strategies to evaluate, in order.
    pub strategies: Vec<StrategyChoice>,
    pub episodes: usize,
    pub max_frames: u64,
    pub seed: Option<u64>,
    /// ASCII maze file; the built-in maze when unset.
    pub maze_path: Option<PathBuf>,
    pub astar: AStarConfig,
    pub qlearning: QLearningConfig,
    /// Run the scatter/chase timer cycle instead of chasing only.
    pub timed_modes: bool,
    /// Seconds between two power pellets.
    pub power_interval_seconds: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyChoice::ALL.to_vec(),
            episodes: 20,
            max_frames: 3000,
            seed: None,
            maze_path: None,
            astar: AStarConfig::default(),
            qlearning: QLearningConfig::default(),
            timed_modes: false,
            power_interval_seconds: None,
        }
    }
}

impl EngineConfig {
    /// Read the process environment. Call `dotenv` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("GHOSTCHASE_STRATEGY") {
            config.strategies = parse_strategies(&value)?;
        }
        if let Some(value) = lookup("GHOSTCHASE_ENCODING") {
            config.qlearning.encoding = parse_encoding(&value)?;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_EPISODES")? {
            config.episodes = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_MAX_FRAMES")? {
            config.max_frames = value;
        }
        config.seed = parse_var(&lookup, "GHOSTCHASE_SEED")?;
        config.maze_path = lookup("GHOSTCHASE_MAZE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_EPSILON")? {
            config.qlearning.epsilon = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_ALPHA")? {
            config.qlearning.alpha = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_GAMMA")? {
            config.qlearning.gamma = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_LOOKAHEAD")? {
            config.astar.lookahead_seconds = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_RECOMPUTE_INTERVAL")? {
            config.astar.recompute_interval_seconds = value;
        }
        if let Some(value) = parse_var(&lookup, "GHOSTCHASE_TIMED_MODES")? {
            config.timed_modes = value;
        }
        config.power_interval_seconds = parse_var(&lookup, "GHOSTCHASE_POWER_INTERVAL")?;

        Ok(config)
    }

    pub fn strategy_kind(&self, choice: StrategyChoice) -> StrategyKind {
        match choice {
            StrategyChoice::Greedy => StrategyKind::Greedy,
            StrategyChoice::AStar => StrategyKind::AStar(self.astar.clone()),
            StrategyChoice::QLearning => StrategyKind::QLearning(self.qlearning.clone()),
        }
    }

    pub fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            episodes: self.episodes,
            seed: self.seed,
            durations: if self.timed_modes {
                ModeDurations::classic()
            } else {
                ModeDurations::untimed()
            },
            simulation: SimulationConfig {
                max_frames: self.max_frames,
                power_interval_seconds: self.power_interval_seconds,
                ..SimulationConfig::default()
            },
            ..EvaluationConfig::default()
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
    }
}

fn parse_strategies(value: &str) -> Result<Vec<StrategyChoice>, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(StrategyChoice::ALL.to_vec()),
        "greedy" => Ok(vec![StrategyChoice::Greedy]),
        "astar" | "a*" => Ok(vec![StrategyChoice::AStar]),
        "qlearning" | "q" => Ok(vec![StrategyChoice::QLearning]),
        _ => Err(ConfigError::UnknownStrategy(value.to_string())),
    }
}

fn parse_encoding(value: &str) -> Result<StateEncoding, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "node" => Ok(StateEncoding::Node),
        "sector" => Ok(StateEncoding::NodeSector),
        "displacement" => Ok(StateEncoding::displacement()),
        _ => Err(ConfigError::UnknownEncoding(value.to_string())),
    }
}
