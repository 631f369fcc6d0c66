//! Cumulative-weight sampling with replacement.

use rand::{Rng, RngCore};
use tracing::{debug, trace};

use crate::config::SamplerConfig;
use crate::error::{Result, SampleError};
use crate::resolve::{Generator, resolve};
use crate::table::{SlotRef, WeightTable};
use crate::value::Value;

/// Pick a slot index by walking cumulative weights.
///
/// Draws `r = u * total` with `u` uniform in `[0, 1)` and subtracts weights
/// in insertion order until `r` goes negative. Slot `i` wins with
/// probability `w_i / total`. If rounding lets `r` survive the whole walk,
/// the last slot wins.
///
/// # Errors
/// * [`SampleError::NoValuesRegistered`] for an empty table.
/// * [`SampleError::ZeroTotalWeight`] if the total is not positive.
pub fn cumulative_index<T, R: Rng + ?Sized>(table: &WeightTable<T>, rng: &mut R) -> Result<usize> {
    if table.is_empty() {
        return Err(SampleError::NoValuesRegistered);
    }
    let total = table.total_weight();
    if total <= 0.0 {
        return Err(SampleError::ZeroTotalWeight);
    }

    let mut r = rng.random::<f64>() * total;
    for (i, w) in table.weights().enumerate() {
        r -= w;
        if r < 0.0 {
            return Ok(i);
        }
    }
    trace!(remainder = r, total, "cumulative walk fell through, taking last slot");
    Ok(table.len() - 1)
}

/// Independent weighted draws: every draw sees the full table, so values
/// repeat freely and ratios only hold in expectation.
///
/// ```rust
/// use weighted_bag::WeightedSampler;
///
/// let mut sampler = WeightedSampler::from_pairs([
///     ("common", 60.0),
///     ("uncommon", 30.0),
///     ("rare", 9.0),
///     ("legendary", 1.0),
/// ]).unwrap();
///
/// let mut rng = rand::rng();
/// let tier = sampler.generate(&mut rng).unwrap();
/// println!("you got: {:?}", tier.get());
/// ```
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    table: WeightTable<T>,
    config: SamplerConfig,
}

impl<T> Default for WeightedSampler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedSampler<T> {
    pub fn new() -> Self {
        Self::with_config(SamplerConfig::default())
    }

    pub fn with_config(config: SamplerConfig) -> Self {
        Self::from_table(WeightTable::new(), config)
    }

    /// Sample from an existing table. The config's tracking flag is applied
    /// to it.
    pub fn from_table(mut table: WeightTable<T>, config: SamplerConfig) -> Self {
        table.set_selection_tracking(config.track_selections());
        Self { table, config }
    }

    pub fn table(&self) -> &WeightTable<T> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut WeightTable<T> {
        &mut self.table
    }

    pub fn into_table(self) -> WeightTable<T> {
        self.table
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The slot the next draw would land on, without resolving or counting it.
    pub fn sample_slot<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SlotRef> {
        let index = cumulative_index(&self.table, rng)?;
        self.table
            .slots()
            .nth(index)
            .map(|(slot, _)| slot)
            .ok_or(SampleError::NoValuesRegistered)
    }
}

impl<T: PartialEq> WeightedSampler<T> {
    /// Build from `(item, weight)` pairs with the default config.
    ///
    /// # Errors
    /// See [`WeightTable::from_pairs`].
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        Ok(Self::from_table(
            WeightTable::from_pairs(pairs)?,
            SamplerConfig::default(),
        ))
    }

    /// See [`WeightTable::register`].
    pub fn register(&mut self, value: impl Into<Value<T>>, weight: f64) -> Result<SlotRef> {
        self.table.register(value, weight)
    }

    /// See [`WeightTable::register_group`].
    pub fn register_group<I>(&mut self, members: I, weight: f64) -> Result<SlotRef>
    where
        I: IntoIterator,
        I::Item: Into<Value<T>>,
    {
        self.table.register_group(members, weight)
    }

    /// See [`WeightTable::remove`].
    pub fn remove(&mut self, value: &Value<T>) -> Result<()> {
        self.table.remove(value).map(drop)
    }

    /// See [`WeightTable::probability_of`].
    pub fn probability_of(&self, value: &Value<T>) -> Result<f64> {
        self.table.probability_of(value)
    }
}

impl<T: Clone + PartialEq> WeightedSampler<T> {
    /// Draw one value, resolving groups and nested samplers.
    ///
    /// # Errors
    /// [`SampleError::NoValuesRegistered`] or [`SampleError::ZeroTotalWeight`],
    /// plus anything a nested sampler reports.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<Value<T>> {
        self.draw(rng)
    }

    /// `n` independent draws, produced lazily. Duplicates allowed.
    ///
    /// # Errors
    /// [`SampleError::InvalidCount`] if `n == 0`. Draw errors surface as
    /// items of the iterator.
    pub fn generate_multiple<'a, R: Rng>(
        &'a mut self,
        n: usize,
        rng: &'a mut R,
    ) -> Result<Draws<'a, T, R>> {
        if n == 0 {
            return Err(SampleError::InvalidCount {
                requested: n,
                available: None,
            });
        }
        Ok(Draws {
            sampler: self,
            rng,
            remaining: n,
        })
    }

    /// `n` draws with no two results sharing an identity, produced lazily.
    ///
    /// Duplicates are redrawn. After `attempt_multiplier * n` rejections the
    /// iterator yields [`SampleError::ExhaustedAttempts`] and stops.
    ///
    /// # Errors
    /// [`SampleError::InvalidCount`] if `n == 0` or `n` exceeds the slot count.
    pub fn generate_multiple_without_duplicates<'a, R: Rng>(
        &'a mut self,
        n: usize,
        rng: &'a mut R,
    ) -> Result<DistinctDraws<'a, T, R>> {
        let available = self.table.len();
        if n == 0 || n > available {
            return Err(SampleError::InvalidCount {
                requested: n,
                available: Some(available),
            });
        }
        let max_rejections = self.config.max_rejections(n);
        Ok(DistinctDraws {
            sampler: self,
            rng,
            wanted: n,
            seen: Vec::with_capacity(n),
            rejected: 0,
            max_rejections,
            done: false,
        })
    }

    fn draw(&mut self, rng: &mut dyn RngCore) -> Result<Value<T>> {
        let index = cumulative_index(&self.table, rng)?;
        let value = resolve(self.table.entry_at(index).value(), rng)?;
        self.table.record_selection(index);
        Ok(value)
    }
}

impl<T: Clone + PartialEq> Generator<T> for WeightedSampler<T> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Result<Value<T>> {
        // call the private draw explicitly to avoid trait-recursion
        self.draw(rng)
    }
}

/// Lazy draws with replacement, see [`WeightedSampler::generate_multiple`].
pub struct Draws<'a, T, R> {
    sampler: &'a mut WeightedSampler<T>,
    rng: &'a mut R,
    remaining: usize,
}

impl<T: Clone + PartialEq, R: Rng> Iterator for Draws<'_, T, R> {
    type Item = Result<Value<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sampler.draw(&mut *self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Lazy duplicate-free draws, see
/// [`WeightedSampler::generate_multiple_without_duplicates`].
pub struct DistinctDraws<'a, T, R> {
    sampler: &'a mut WeightedSampler<T>,
    rng: &'a mut R,
    wanted: usize,
    seen: Vec<Value<T>>,
    rejected: usize,
    max_rejections: usize,
    done: bool,
}

impl<T: Clone + PartialEq, R: Rng> Iterator for DistinctDraws<'_, T, R> {
    type Item = Result<Value<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.seen.len() == self.wanted {
            return None;
        }
        loop {
            let value = match self.sampler.draw(&mut *self.rng) {
                Ok(value) => value,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if !self.seen.contains(&value) {
                self.seen.push(value.clone());
                return Some(Ok(value));
            }
            self.rejected += 1;
            if self.rejected >= self.max_rejections {
                self.done = true;
                debug!(
                    rejected = self.rejected,
                    collected = self.seen.len(),
                    wanted = self.wanted,
                    "giving up on duplicate-free draw"
                );
                return Some(Err(SampleError::ExhaustedAttempts {
                    attempts: self.rejected,
                    collected: self.seen.len(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    /// Always returns the same raw bits; `random::<f64>()` then maps to a
    /// fixed point in `[0, 1)`.
    struct FixedBits(u64);

    impl RngCore for FixedBits {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for (d, s) in dst.iter_mut().zip(self.0.to_le_bytes().iter().cycle()) {
                *d = *s;
            }
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty = WeightedSampler::<&str>::new();
        assert_eq!(
            empty.generate(&mut rng).unwrap_err(),
            SampleError::NoValuesRegistered
        );
        assert!(matches!(
            empty.generate_multiple(0, &mut rng),
            Err(SampleError::InvalidCount { requested: 0, .. })
        ));

        let zero = WeightTable::from_raw_entries([(Value::Scalar("a"), 0.0)]);
        let mut zero = WeightedSampler::from_table(zero, SamplerConfig::default());
        assert_eq!(
            zero.generate(&mut rng).unwrap_err(),
            SampleError::ZeroTotalWeight
        );
    }

    #[test]
    fn roughly_matches_distribution() {
        let weights = [1.0, 2.0, 3.0, 4.0];
        let mut sampler =
            WeightedSampler::from_pairs(weights.iter().copied().enumerate()).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000usize;
        let mut counts = [0usize; 4];
        for v in sampler.generate_multiple(draws, &mut rng).unwrap() {
            counts[*v.unwrap().get().unwrap()] += 1;
        }

        let sum_w: f64 = weights.iter().sum();
        for (i, &c) in counts.iter().enumerate() {
            let p = weights[i] / sum_w;
            let emp = c as f64 / draws as f64;
            assert!((emp - p).abs() < 0.02, "i={i} emp={emp} p={p}");
        }
    }

    #[test]
    fn degenerate_singleton() {
        let mut sampler = WeightedSampler::from_pairs([("only", 5.0)]).unwrap();
        let mut rng = rand::rng();
        for _ in 0..1000 {
            assert_eq!(sampler.generate(&mut rng).unwrap(), Value::Scalar("only"));
        }
    }

    #[test]
    fn walk_follows_insertion_order() {
        let table = WeightTable::from_pairs([("a", 1.0), ("b", 1.0)]).unwrap();
        // all-zero bits map to u = 0, which lands in the first slot
        assert_eq!(cumulative_index(&table, &mut FixedBits(0)).unwrap(), 0);
        // all-one bits map to u just below 1, the last slot
        assert_eq!(cumulative_index(&table, &mut FixedBits(u64::MAX)).unwrap(), 1);
    }

    #[test]
    fn fallthrough_takes_last_slot() {
        // a NaN weight poisons the remainder so no slot ever triggers
        let table = WeightTable::from_raw_entries([
            (Value::Scalar("a"), 1.0),
            (Value::Scalar("b"), f64::NAN),
            (Value::Scalar("c"), 1.0),
        ]);
        assert_eq!(cumulative_index(&table, &mut FixedBits(0)).unwrap(), 2);
    }

    #[test]
    fn multiple_is_restartable() {
        let mut sampler = WeightedSampler::from_pairs([("a", 1.0), ("b", 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sampler.generate_multiple(3, &mut rng).unwrap().count(), 3);
        let draws = sampler.generate_multiple(7, &mut rng).unwrap();
        assert_eq!(draws.size_hint(), (7, Some(7)));
        assert_eq!(draws.count(), 7);
    }

    #[test]
    fn distinct_draws_cover_everything() {
        let mut sampler = WeightedSampler::from_table(
            WeightTable::from_pairs([("a", 3.0), ("b", 4.0), ("c", 5.0)]).unwrap(),
            SamplerConfig::default().with_attempt_multiplier(100),
        );
        let mut rng = StdRng::seed_from_u64(11);
        let got: Vec<_> = sampler
            .generate_multiple_without_duplicates(3, &mut rng)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let names: HashSet<_> = got.iter().filter_map(|v| v.get().copied()).collect();
        assert_eq!(names, HashSet::from(["a", "b", "c"]));

        assert!(matches!(
            sampler.generate_multiple_without_duplicates(4, &mut rng),
            Err(SampleError::InvalidCount {
                requested: 4,
                available: Some(3)
            })
        ));
    }

    #[test]
    fn distinct_draws_give_up_on_dominant_value() {
        let mut sampler = WeightedSampler::with_config(
            SamplerConfig::default().with_attempt_multiplier(2),
        );
        sampler.register("whale", 1e12).unwrap();
        sampler.register("minnow", 1e-12).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let results: Vec<_> = sampler
            .generate_multiple_without_duplicates(2, &mut rng)
            .unwrap()
            .collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok(Value::Scalar("whale")));
        assert_eq!(
            results[1],
            Err(SampleError::ExhaustedAttempts {
                attempts: 4,
                collected: 1
            })
        );
    }

    #[test]
    fn tracking_counts_successful_draws() {
        let mut sampler = WeightedSampler::from_table(
            WeightTable::from_pairs([("a", 1.0), ("b", 1.0)]).unwrap(),
            SamplerConfig::default().with_selection_tracking(true),
        );
        let mut rng = StdRng::seed_from_u64(8);
        for v in sampler.generate_multiple(50, &mut rng).unwrap() {
            v.unwrap();
        }
        assert_eq!(sampler.table().total_selections(), 50);
    }

    #[test]
    fn sample_slot_does_not_count() {
        let mut sampler = WeightedSampler::with_config(
            SamplerConfig::default().with_selection_tracking(true),
        );
        let a = sampler.register("a", 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample_slot(&mut rng).unwrap(), a);
        assert_eq!(sampler.table().total_selections(), 0);
    }
}
