/// Shaping of the per-decision reward.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardConfig {
    /// Added on every decision. Negative, to favour short chases.
    pub step_penalty: f32,
    /// Added when the distance to the target shrank since the last decision.
    pub approach_bonus: f32,
    /// Added when the distance falls under `capture_threshold`.
    pub capture_bonus: f32,
    pub capture_threshold: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_penalty: -0.01,
            approach_bonus: 0.1,
            capture_bonus: 5.0,
            capture_threshold: 1.0,
        }
    }
}

impl RewardConfig {
    pub fn reward(&self, previous_distance: f32, current_distance: f32) -> f32 {
        let mut reward = self.step_penalty;
        if current_distance < previous_distance {
            reward += self.approach_bonus;
        }
        if current_distance < self.capture_threshold {
            reward += self.capture_bonus;
        }
        reward
    }
}
