//! Running bounds of backpropagated values within one search.

/// Tracks the largest and smallest value seen so far and rescales values
/// into `[0, 1]` against them.
///
/// The bounds only grow during a search, so the normalised score of a fixed
/// value can change as more extreme values arrive. Until two distinct values
/// have been observed, `normalise` returns its input unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeStatistics {
    pub maximum: f32,
    pub minimum: f32,
}

impl TreeStatistics {
    /// Empty bounds: `maximum = -inf`, `minimum = +inf`.
    pub fn new() -> Self {
        Self {
            maximum: f32::NEG_INFINITY,
            minimum: f32::INFINITY,
        }
    }

    /// Widen the bounds to include `value`.
    pub fn update(&mut self, value: f32) {
        self.maximum = self.maximum.max(value);
        self.minimum = self.minimum.min(value);
    }

    /// Rescale `value` into the observed range.
    pub fn normalise(&self, value: f32) -> f32 {
        if self.maximum > self.minimum {
            (value - self.minimum) / (self.maximum - self.minimum)
        } else {
            value
        }
    }
}

impl Default for TreeStatistics {
    fn default() -> Self {
        Self::new()
    }
}
