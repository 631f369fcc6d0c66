//! Fair draws without replacement ("bag" or urn sampling).
//!
//! Each slot contributes `round(weight)` tickets to a pool. The pool is
//! shuffled once and consumed front to back; when it runs dry the next draw
//! rebuilds it from the current table. Over one complete cycle every value
//! comes out exactly `round(weight)` times, where [`WeightedSampler`]
//! only matches the ratios on average.
//!
//! [`WeightedSampler`]: crate::WeightedSampler

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::SamplerConfig;
use crate::error::{Result, SampleError};
use crate::resolve::{Generator, resolve};
use crate::table::{SlotRef, WeightTable};
use crate::value::Value;

/// Shuffled slot indices still to be handed out in this cycle.
/// Empty means the next draw refills.
#[derive(Debug, Clone, Default)]
struct Bag {
    pool: Vec<usize>,
    cursor: usize,
}

impl Bag {
    fn is_empty(&self) -> bool {
        self.cursor >= self.pool.len()
    }

    fn remaining(&self) -> usize {
        self.pool.len().saturating_sub(self.cursor)
    }
}

/// Largest pool a single refill may build.
pub const MAX_BAG_TICKETS: usize = 1 << 24;

/// Tickets per slot: `round(weight)` copies of each slot index, in slot order.
///
/// The ticket count is checked against [`MAX_BAG_TICKETS`] before anything
/// is allocated.
fn expand<T>(table: &WeightTable<T>) -> Result<Vec<usize>> {
    let tickets: f64 = table.weights().map(f64::round).filter(|&c| c >= 1.0).sum();
    if tickets > MAX_BAG_TICKETS as f64 {
        return Err(SampleError::BagTooLarge {
            tickets,
            max: MAX_BAG_TICKETS,
        });
    }
    let mut pool = Vec::with_capacity(tickets as usize);
    for (index, weight) in table.weights().enumerate() {
        let copies = weight.round();
        if copies >= 1.0 {
            pool.extend(std::iter::repeat_n(index, copies as usize));
        }
    }
    Ok(pool)
}

/// Weighted draws without replacement, refilled per cycle.
///
/// Any change to the table through this sampler throws away the cycle in
/// progress; the next draw starts a fresh one.
///
/// ```rust
/// use weighted_bag::BagSampler;
///
/// let mut bag = BagSampler::from_pairs([("a", 2.0), ("b", 1.0)]).unwrap();
/// let mut rng = rand::rng();
/// let cycle: Vec<_> = bag
///     .generate_multiple(3, &mut rng)
///     .unwrap()
///     .map(|v| *v.unwrap().get().unwrap())
///     .collect();
/// assert_eq!(cycle.iter().filter(|&&v| v == "a").count(), 2);
/// assert_eq!(cycle.iter().filter(|&&v| v == "b").count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BagSampler<T> {
    table: WeightTable<T>,
    config: SamplerConfig,
    bag: Bag,
}

impl<T> Default for BagSampler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BagSampler<T> {
    pub fn new() -> Self {
        Self::with_config(SamplerConfig::default())
    }

    pub fn with_config(config: SamplerConfig) -> Self {
        Self::from_table(WeightTable::new(), config)
    }

    pub fn from_table(mut table: WeightTable<T>, config: SamplerConfig) -> Self {
        table.set_selection_tracking(config.track_selections());
        Self {
            table,
            config,
            bag: Bag::default(),
        }
    }

    pub fn table(&self) -> &WeightTable<T> {
        &self.table
    }

    /// Mutable access to the table; discards the current cycle.
    pub fn table_mut(&mut self) -> &mut WeightTable<T> {
        self.reset();
        &mut self.table
    }

    pub fn into_table(self) -> WeightTable<T> {
        self.table
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Discard the current cycle.
    pub fn reset(&mut self) {
        self.bag = Bag::default();
    }

    /// Draws left before the next refill (0 when the bag is empty).
    pub fn remaining_in_cycle(&self) -> usize {
        self.bag.remaining()
    }

    /// Length of a full cycle for the current table, saturating at
    /// `usize::MAX`.
    pub fn cycle_len(&self) -> usize {
        self.table
            .weights()
            .map(|w| w.round())
            .filter(|&c| c >= 1.0)
            .fold(0usize, |acc, c| acc.saturating_add(c as usize))
    }

    fn refill(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        let mut pool = expand(&self.table)?;
        if pool.is_empty() {
            return Err(SampleError::NoValuesRegistered);
        }
        pool.shuffle(rng);
        debug!(
            pool = pool.len(),
            slots = self.table.len(),
            "refilled bag"
        );
        self.bag = Bag { pool, cursor: 0 };
        Ok(())
    }

    /// Take the next ticket, refilling first if the cycle is over.
    fn next_index(&mut self, rng: &mut dyn RngCore) -> Result<usize> {
        if self.bag.is_empty() {
            self.refill(rng)?;
        }
        let index = self.bag.pool[self.bag.cursor];
        self.bag.cursor += 1;
        if self.bag.is_empty() {
            self.reset();
        }
        Ok(index)
    }
}

impl<T: PartialEq> BagSampler<T> {
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

    /// See [`WeightTable::register`]. Discards the current cycle.
    pub fn register(&mut self, value: impl Into<Value<T>>, weight: f64) -> Result<SlotRef> {
        let slot = self.table.register(value, weight)?;
        self.reset();
        Ok(slot)
    }

    /// See [`WeightTable::register_group`]. Discards the current cycle.
    pub fn register_group<I>(&mut self, members: I, weight: f64) -> Result<SlotRef>
    where
        I: IntoIterator,
        I::Item: Into<Value<T>>,
    {
        let slot = self.table.register_group(members, weight)?;
        self.reset();
        Ok(slot)
    }

    /// See [`WeightTable::remove`]. Discards the current cycle.
    pub fn remove(&mut self, value: &Value<T>) -> Result<()> {
        self.table.remove(value)?;
        self.reset();
        Ok(())
    }
}

impl<T: Clone + PartialEq> BagSampler<T> {
    /// Draw the next value of the current cycle.
    ///
    /// # Errors
    /// [`SampleError::NoValuesRegistered`] if a refill produces no tickets
    /// (empty table, or every weight rounds to zero),
    /// [`SampleError::BagTooLarge`] if it would produce more than
    /// [`MAX_BAG_TICKETS`].
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<Value<T>> {
        self.draw(rng)
    }

    /// `n` sequential draws, refilling across cycle boundaries as needed.
    ///
    /// # Errors
    /// [`SampleError::InvalidCount`] if `n == 0`.
    pub fn generate_multiple<'a, R: Rng>(
        &'a mut self,
        n: usize,
        rng: &'a mut R,
    ) -> Result<BagDraws<'a, T, R>> {
        if n == 0 {
            return Err(SampleError::InvalidCount {
                requested: n,
                available: None,
            });
        }
        Ok(BagDraws {
            sampler: self,
            rng,
            remaining: n,
        })
    }

    /// Same as [`generate_multiple`](Self::generate_multiple).
    ///
    /// Within one cycle the bag never repeats a ticket, so a request that
    /// fits in a cycle (with unit weights) has no repeats. Requests spanning
    /// a refill can repeat across the boundary.
    pub fn generate_multiple_without_duplicates<'a, R: Rng>(
        &'a mut self,
        n: usize,
        rng: &'a mut R,
    ) -> Result<BagDraws<'a, T, R>> {
        self.generate_multiple(n, rng)
    }

    fn draw(&mut self, rng: &mut dyn RngCore) -> Result<Value<T>> {
        let index = self.next_index(rng)?;
        let value = resolve(self.table.entry_at(index).value(), rng)?;
        self.table.record_selection(index);
        Ok(value)
    }
}

impl<T: Clone + PartialEq> Generator<T> for BagSampler<T> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Result<Value<T>> {
        self.draw(rng)
    }
}

/// Lazy bag draws, see [`BagSampler::generate_multiple`].
pub struct BagDraws<'a, T, R> {
    sampler: &'a mut BagSampler<T>,
    rng: &'a mut R,
    remaining: usize,
}

impl<T: Clone + PartialEq, R: Rng> Iterator for BagDraws<'_, T, R> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn names(bag: &mut BagSampler<&'static str>, n: usize, rng: &mut Pcg32) -> Vec<&'static str> {
        bag.generate_multiple(n, rng)
            .unwrap()
            .map(|v| *v.unwrap().get().unwrap())
            .collect()
    }

    fn count(values: &[&str], name: &str) -> usize {
        values.iter().filter(|&&v| v == name).count()
    }

    #[test]
    fn expands_rounded_weights_in_slot_order() {
        let table = WeightTable::from_pairs([("a", 2.4), ("b", 0.4), ("c", 1.5)]).unwrap();
        assert_eq!(expand(&table).unwrap(), vec![0, 0, 2, 2]);
    }

    #[test]
    fn every_cycle_is_exact() {
        let mut bag = BagSampler::from_pairs([("a", 2.0), ("b", 1.0)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(17);
        for _ in 0..50 {
            let cycle = names(&mut bag, 3, &mut rng);
            assert_eq!(count(&cycle, "a"), 2);
            assert_eq!(count(&cycle, "b"), 1);
            assert_eq!(bag.remaining_in_cycle(), 0);
        }
    }

    #[test]
    fn refill_happens_after_exhaustion() {
        let mut bag = BagSampler::from_pairs([("a", 3.0), ("b", 2.0), ("c", 1.0)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(4);
        assert_eq!(bag.cycle_len(), 6);
        bag.generate(&mut rng).unwrap();
        assert_eq!(bag.remaining_in_cycle(), 5);
        let rest = names(&mut bag, 5, &mut rng);
        assert_eq!(rest.len(), 5);
        assert_eq!(bag.remaining_in_cycle(), 0);
        let next = names(&mut bag, 6, &mut rng);
        assert_eq!(count(&next, "a"), 3);
        assert_eq!(count(&next, "b"), 2);
        assert_eq!(count(&next, "c"), 1);
    }

    #[test]
    fn rejects_empty_and_collapsed_tables() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut empty = BagSampler::<&str>::new();
        assert_eq!(
            empty.generate(&mut rng).unwrap_err(),
            SampleError::NoValuesRegistered
        );

        let mut tiny = BagSampler::from_pairs([("a", 0.2), ("b", 0.49)]).unwrap();
        assert_eq!(
            tiny.generate(&mut rng).unwrap_err(),
            SampleError::NoValuesRegistered
        );
        assert!(matches!(
            tiny.generate_multiple(0, &mut rng),
            Err(SampleError::InvalidCount { .. })
        ));
    }

    #[test]
    fn oversized_bags_are_refused() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut bag = BagSampler::from_pairs([("a", 1e20), ("b", 1.0)]).unwrap();
        assert!(matches!(
            bag.generate(&mut rng),
            Err(SampleError::BagTooLarge { max: MAX_BAG_TICKETS, .. })
        ));
        assert_eq!(bag.remaining_in_cycle(), 0);

        // shrinking the heavy slot makes the bag usable again
        bag.register("a", 2.0).unwrap();
        assert_eq!(names(&mut bag, 3, &mut rng).len(), 3);

        let huge = BagSampler::from_pairs([("a", 1e19), ("b", 1e19)]).unwrap();
        assert_eq!(huge.cycle_len(), usize::MAX);
    }

    #[test]
    fn mutation_restarts_the_cycle() {
        let mut bag = BagSampler::from_pairs([("a", 5.0)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(9);
        bag.generate(&mut rng).unwrap();
        assert_eq!(bag.remaining_in_cycle(), 4);

        bag.remove(&"a".into()).unwrap();
        assert_eq!(bag.remaining_in_cycle(), 0);
        bag.register("b", 2.0).unwrap();
        let cycle = names(&mut bag, 2, &mut rng);
        assert_eq!(cycle, ["b", "b"]);
    }

    #[test]
    fn unit_weights_are_duplicate_free_within_a_cycle() {
        let mut bag = BagSampler::from_pairs([("x", 1.0), ("y", 1.0), ("z", 1.0)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(21);
        let mut got: Vec<_> = bag
            .generate_multiple_without_duplicates(3, &mut rng)
            .unwrap()
            .map(|v| *v.unwrap().get().unwrap())
            .collect();
        got.sort();
        assert_eq!(got, ["x", "y", "z"]);
    }

    #[test]
    fn groups_resolve_inside_the_bag() {
        let mut bag = BagSampler::<&str>::with_config(
            SamplerConfig::default().with_selection_tracking(true),
        );
        let g = bag.register_group(["wolf", "bear"], 2.0).unwrap();
        let mut rng = Pcg32::seed_from_u64(2);
        for name in names(&mut bag, 4, &mut rng) {
            assert!(name == "wolf" || name == "bear");
        }
        let group = bag.table().get(g).unwrap().value().clone();
        assert_eq!(bag.table().selection_count(&group).unwrap(), 4);
    }
}
