//! Playback-rate ladder: the discrete rates the rate shortcuts step through.

pub use tubetweak_proto::config::DEFAULT_RATE_LADDER;
use tubetweak_proto::protocol::Direction;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLadder {
    steps: Vec<f64>,
    default_rate: f64,
}

impl RateLadder {
    /// `steps` must be ascending and positive; empty selects
    /// [`DEFAULT_RATE_LADDER`].
    pub fn new(steps: Vec<f64>, default_rate: f64) -> Self {
        let steps = if steps.is_empty() {
            DEFAULT_RATE_LADDER.to_vec()
        } else {
            steps
        };
        Self {
            steps,
            default_rate,
        }
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn min(&self) -> f64 {
        self.steps[0]
    }

    pub fn max(&self) -> f64 {
        self.steps[self.steps.len() - 1]
    }

    pub fn clamp(&self, rate: f64) -> f64 {
        rate.clamp(self.min(), self.max())
    }

    /// The next rung above or below `current`, saturating at the ends.
    /// Rates between rungs step to the nearest rung in that direction.
    pub fn step(&self, current: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Up => self
                .steps
                .iter()
                .copied()
                .find(|r| *r > current + EPSILON)
                .unwrap_or_else(|| self.max()),
            Direction::Down => self
                .steps
                .iter()
                .rev()
                .copied()
                .find(|r| *r < current - EPSILON)
                .unwrap_or_else(|| self.min()),
        }
    }
}

impl Default for RateLadder {
    fn default() -> Self {
        Self::new(Vec::new(), 1.0)
    }
}
