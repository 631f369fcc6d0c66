//! # weighted_bag
//!
//! Weighted random selection, with replacement *or* as a fair bag.
//!
//! Values are registered in a [`WeightTable`] with a positive weight. Two
//! samplers draw from it:
//!
//! 1. [`WeightedSampler`]: independent draws by cumulative-weight walk. Each
//!    value comes up with probability `weight / total`; repeats are free.
//! 2. [`BagSampler`]: draws without replacement. A pool holding
//!    `round(weight)` tickets per value is shuffled and consumed, then
//!    rebuilt. Every complete cycle hits the ratios exactly.
//!
//! A slot may also hold a [`Group`] (members share the slot and are picked
//! with equal odds) or another sampler ([`Value::nested`]), which is drawn
//! from in turn.
//!
//! ## Quick start (pairs)
//!
//! ```rust
//! use weighted_bag::WeightedSampler;
//!
//! # fn main() -> Result<(), weighted_bag::SampleError> {
//! let mut sampler = WeightedSampler::from_pairs([
//!     ("common", 60.0),
//!     ("uncommon", 30.0),
//!     ("rare", 9.0),
//!     ("legendary", 1.0),
//! ])?;
//!
//! let mut rng = rand::rng();
//! let tier = sampler.generate(&mut rng)?;
//! println!("you got: {:?}", tier.get());
//! # Ok(()) }
//! ```
//!
//! ## Quick start (enum + macro)
//!
//! ```rust,ignore
//! use weighted_bag::WeightedEnum;
//!
//! #[derive(Copy, Clone, Debug, PartialEq, WeightedEnum)]
//! enum Loot {
//!     #[weight(60)] Common,
//!     #[weight(30)] Uncommon,
//!     #[weight(9)]  Rare,
//!     #[weight(1)]  Legendary,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut bag = Loot::bag()?;
//! let mut rng = rand::rng();
//! let item = bag.generate(&mut rng)?;
//! # Ok(()) }
//! ```
//!
//! ## Randomness
//! Every draw takes the random source as an argument (`&mut R` where
//! `R: rand::Rng`). Pass a seeded generator such as `rand_pcg::Pcg32` for
//! reproducible runs.
//!
//! ## Performance
//! * **Weighted draw**: O(n) walk over the slots.
//! * **Bag draw**: O(1) amortized; a refill is O(sum of rounded weights).
//! * **Lookups by value**: O(n) scan (identity comparison, no hashing).
//!
//! ## Gotchas
//! * Weights must be positive and finite.
//! * Bag weights are rounded; a slot with weight below `0.5` never enters the bag.
//! * Registering a sampler inside itself is reported as
//!   [`SampleError::CyclicNesting`] when drawn.
//! * Not thread-safe: values use `Rc`, wrap the sampler yourself if you must share it.

#![forbid(unsafe_code)]

mod analytics;
mod bag;
mod config;
mod error;
mod group;
mod resolve;
mod table;
mod value;
mod weighted;

pub use analytics::{MIN_ADJUSTED_WEIGHT, Numeric};
pub use bag::{BagDraws, BagSampler, MAX_BAG_TICKETS};
pub use config::{DEFAULT_ATTEMPT_MULTIPLIER, SamplerConfig};
pub use error::{Result, SampleError};
pub use group::Group;
pub use resolve::Generator;
pub use table::{SlotRef, WeightTable, WeightedEntry};
pub use value::{SharedGenerator, Value};
pub use weighted::{DistinctDraws, Draws, WeightedSampler, cumulative_index};

/// Derive macros imported from `weighted_bag_macros`.
/// See the crate-level example for usage.
pub use weighted_bag_macros::{UniformEnum, WeightedEnum};

/// Trait implemented by the `WeightedEnum` derive macro.
///
/// Each variant and its `#[weight(..)]` is exposed via
/// [`WeightedEnum::ENTRIES`], which is enough to build either sampler.
pub trait WeightedEnum: Sized + 'static {
    /// All `(variant, weight)` pairs for the enum, in declaration order.
    const ENTRIES: &'static [(Self, f64)];

    /// # Errors
    /// [`SampleError::InvalidWeight`] if any declared weight is not positive
    /// and finite.
    fn weight_table() -> Result<WeightTable<Self>>
    where
        Self: Copy + PartialEq,
    {
        WeightTable::from_pairs(Self::ENTRIES.iter().copied())
    }

    /// Draws with replacement over the variants.
    fn sampler() -> Result<WeightedSampler<Self>>
    where
        Self: Copy + PartialEq,
    {
        Ok(WeightedSampler::from_table(
            Self::weight_table()?,
            SamplerConfig::default(),
        ))
    }

    /// Fair bag over the variants.
    fn bag() -> Result<BagSampler<Self>>
    where
        Self: Copy + PartialEq,
    {
        Ok(BagSampler::from_table(
            Self::weight_table()?,
            SamplerConfig::default(),
        ))
    }
}

/// Trait implemented by the `UniformEnum` derive macro.
///
/// Exposes the variants as a static slice; all of them together form a
/// [`Group`] that can be registered under a single weight.
pub trait UniformEnum: Sized + 'static {
    /// All variants in declaration order.
    const VARIANTS: &'static [Self];

    /// # Errors
    /// [`SampleError::EmptyGroup`] for an enum without variants.
    fn group() -> Result<Group<Self>>
    where
        Self: Copy,
    {
        Group::from_items(Self::VARIANTS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Coin {
        Heads,
        Tails,
    }

    impl WeightedEnum for Coin {
        const ENTRIES: &'static [(Self, f64)] = &[(Coin::Heads, 1.0), (Coin::Tails, 3.0)];
    }

    impl UniformEnum for Coin {
        const VARIANTS: &'static [Self] = &[Coin::Heads, Coin::Tails];
    }

    #[test]
    fn smoke_pairs() {
        let mut sampler = WeightedSampler::from_pairs([("a", 1.0), ("b", 3.0)]).unwrap();
        let mut rng = rand::rng();
        let _ = sampler.generate(&mut rng).unwrap();
    }

    #[test]
    fn enum_tables() {
        let table = Coin::weight_table().unwrap();
        assert_eq!(table.probability_of(&Coin::Tails.into()).unwrap(), 0.75);
        assert_eq!(Coin::bag().unwrap().cycle_len(), 4);
        assert_eq!(Coin::group().unwrap().len(), 2);
    }
}
