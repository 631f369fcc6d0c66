/// Rejected draws allowed per requested value in duplicate-free sampling.
pub const DEFAULT_ATTEMPT_MULTIPLIER: usize = 10;

/// Knobs shared by [`WeightedSampler`](crate::WeightedSampler) and
/// [`BagSampler`](crate::BagSampler).
///
/// ```rust
/// use weighted_bag::{SamplerConfig, WeightedSampler};
///
/// let config = SamplerConfig::default()
///     .with_attempt_multiplier(25)
///     .with_selection_tracking(true);
/// let sampler: WeightedSampler<&str> = WeightedSampler::with_config(config);
/// assert!(sampler.table().is_tracking_selections());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    attempt_multiplier: usize,
    track_selections: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            attempt_multiplier: DEFAULT_ATTEMPT_MULTIPLIER,
            track_selections: false,
        }
    }
}

impl SamplerConfig {
    /// Cap rejected draws at `multiplier * n` for an `n`-value duplicate-free
    /// request. Zero is treated as one.
    pub fn with_attempt_multiplier(mut self, multiplier: usize) -> Self {
        self.attempt_multiplier = multiplier.max(1);
        self
    }

    /// Count every successful draw per slot (needed by
    /// [`auto_adjust_weights`](crate::WeightTable::auto_adjust_weights)).
    pub fn with_selection_tracking(mut self, enabled: bool) -> Self {
        self.track_selections = enabled;
        self
    }

    pub fn attempt_multiplier(&self) -> usize {
        self.attempt_multiplier
    }

    pub fn track_selections(&self) -> bool {
        self.track_selections
    }

    pub(crate) fn max_rejections(&self, wanted: usize) -> usize {
        self.attempt_multiplier.saturating_mul(wanted)
    }
}
