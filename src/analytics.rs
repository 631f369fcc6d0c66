//! Statistics and weight adjustment over a [`WeightTable`].

use tracing::{debug, trace};

use crate::error::{Result, SampleError, check_weight};
use crate::table::WeightTable;
use crate::value::Value;

/// Floor for weights rewritten by [`WeightTable::auto_adjust_weights`].
pub const MIN_ADJUSTED_WEIGHT: f64 = 0.01;

/// Values that may be read as a number for expectation and variance.
///
/// Strings count when they parse as a finite `f64` (surrounding whitespace
/// ignored).
pub trait Numeric {
    fn to_f64(&self) -> Option<f64>;
}

macro_rules! numeric_primitive {
    ($($t:ty),*) => {
        $(impl Numeric for $t {
            #[inline]
            fn to_f64(&self) -> Option<f64> {
                Some(*self as f64).filter(|x| x.is_finite())
            }
        })*
    };
}

numeric_primitive!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl Numeric for str {
    fn to_f64(&self) -> Option<f64> {
        self.trim().parse::<f64>().ok().filter(|x| x.is_finite())
    }
}

impl Numeric for String {
    fn to_f64(&self) -> Option<f64> {
        self.as_str().to_f64()
    }
}

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_f64(&self) -> Option<f64> {
        (**self).to_f64()
    }
}

impl<T> WeightTable<T> {
    /// `(weight, x)` for every slot holding a numeric scalar or reference.
    fn numeric_slots(&self) -> impl Iterator<Item = (f64, f64)> + '_
    where
        T: Numeric,
    {
        self.entries()
            .filter_map(|e| e.value().get().and_then(Numeric::to_f64).map(|x| (e.weight(), x)))
    }

    /// Weighted mean over numeric slots; `None` when there are none.
    ///
    /// Groups, nested samplers and non-numeric values are skipped.
    pub fn expected_value(&self) -> Option<f64>
    where
        T: Numeric,
    {
        let (weight, sum) = self
            .numeric_slots()
            .fold((0.0, 0.0), |(w, s), (wi, x)| (w + wi, s + wi * x));
        (weight > 0.0).then(|| sum / weight)
    }

    /// Weighted variance over the same slots as [`expected_value`](Self::expected_value).
    pub fn variance(&self) -> Option<f64>
    where
        T: Numeric,
    {
        let mean = self.expected_value()?;
        let (weight, sum) = self
            .numeric_slots()
            .fold((0.0, 0.0), |(w, s), (wi, x)| (w + wi, s + wi * (x - mean).powi(2)));
        (weight > 0.0).then(|| sum / weight)
    }

    pub fn standard_deviation(&self) -> Option<f64>
    where
        T: Numeric,
    {
        self.variance().map(f64::sqrt)
    }

    /// Scale every weight by `factor` in `(0, 1]`.
    ///
    /// # Errors
    /// * [`SampleError::InvalidFactor`] if `factor > 1` or NaN.
    /// * [`SampleError::DecayUnderflow`] if any weight would reach zero;
    ///   no weight is changed in that case.
    pub fn decay_all_weights(&mut self, factor: f64) -> Result<()> {
        let scaled = self.scaled_weights(factor, check_decay)?;
        self.apply(scaled);
        Ok(())
    }

    /// Scale every weight by `factor >= 1`.
    ///
    /// # Errors
    /// [`SampleError::InvalidFactor`] if `factor < 1` or not finite,
    /// [`SampleError::InvalidWeight`] if a weight would overflow.
    pub fn boost_all_weights(&mut self, factor: f64) -> Result<()> {
        let scaled = self.scaled_weights(factor, check_boost)?;
        self.apply(scaled);
        Ok(())
    }

    /// Nudge weights toward even selection counts.
    ///
    /// With `expected = total_selections / len`, each slot becomes
    /// `max(MIN_ADJUSTED_WEIGHT, w * (1 + strength * (1 - actual / expected)))`:
    /// slots drawn more than their share shrink, neglected ones grow.
    /// Does nothing until some selection has been recorded.
    ///
    /// # Errors
    /// [`SampleError::InvalidStrength`] unless `0 < strength <= 1`,
    /// [`SampleError::InvalidWeight`] if a grown weight would overflow.
    pub fn auto_adjust_weights(&mut self, strength: f64) -> Result<()> {
        if !(strength > 0.0 && strength <= 1.0) {
            return Err(SampleError::InvalidStrength { strength });
        }
        let total = self.total_selections();
        if total == 0 {
            debug!("no selections recorded, weights left as they are");
            return Ok(());
        }

        let expected = total as f64 / self.len() as f64;
        let adjusted = self
            .weights()
            .enumerate()
            .map(|(i, w)| {
                let ratio = self.selections_at(i) as f64 / expected;
                let new = (w * (1.0 + strength * (1.0 - ratio))).max(MIN_ADJUSTED_WEIGHT);
                trace!(slot = i, old = w, new, ratio, "adjusted weight");
                check_weight(new)
            })
            .collect::<Result<Vec<f64>>>()?;
        debug!(slots = adjusted.len(), total_selections = total, strength, "auto-adjusted weights");
        self.apply(adjusted);
        Ok(())
    }

    fn scaled_weights(
        &self,
        factor: f64,
        check: fn(f64, f64) -> Result<f64>,
    ) -> Result<Vec<f64>> {
        self.weights().map(|w| check(w, factor)).collect()
    }

    fn apply(&mut self, weights: Vec<f64>) {
        for (i, w) in weights.into_iter().enumerate() {
            self.set_weight_at(i, w);
        }
    }
}

impl<T: PartialEq + Clone> WeightTable<T> {
    /// Probability of each distinct value, in first-seen order.
    ///
    /// A group's share is split evenly between its members; a member that
    /// also appears elsewhere accumulates both shares. An empty table gives
    /// an empty distribution.
    ///
    /// # Errors
    /// [`SampleError::ZeroTotalWeight`] if the table is non-empty but its
    /// total is not positive.
    pub fn normalized_distribution(&self) -> Result<Vec<(Value<T>, f64)>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(SampleError::ZeroTotalWeight);
        }

        let mut dist: Vec<(Value<T>, f64)> = Vec::with_capacity(self.len());
        let mut add = |value: &Value<T>, p: f64| match dist.iter_mut().find(|(v, _)| v == value) {
            Some((_, acc)) => *acc += p,
            None => dist.push((value.clone(), p)),
        };
        for entry in self.entries() {
            let p = entry.weight() / total;
            match entry.value().as_group() {
                Some(group) => {
                    let share = p / group.len() as f64;
                    for member in group.members() {
                        add(member, share);
                    }
                }
                None => add(entry.value(), p),
            }
        }
        Ok(dist)
    }

    /// Shannon entropy in bits of [`normalized_distribution`](Self::normalized_distribution).
    ///
    /// Zero for a single value, `log2(n)` for `n` equally likely values.
    pub fn entropy(&self) -> Result<f64> {
        Ok(self
            .normalized_distribution()?
            .into_iter()
            .map(|(_, p)| p)
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.log2())
            .sum())
    }
}

impl<T: PartialEq> WeightTable<T> {
    /// Multiply one weight by `factor` in `(0, 1]`, returning the new weight.
    ///
    /// # Errors
    /// * [`SampleError::NotRegistered`] if `value` is absent.
    /// * [`SampleError::InvalidFactor`] if `factor > 1` or NaN.
    /// * [`SampleError::DecayUnderflow`] if the weight would reach zero.
    pub fn decay_weight(&mut self, value: &Value<T>, factor: f64) -> Result<f64> {
        self.scale_one(value, factor, check_decay)
    }

    /// Multiply one weight by `factor >= 1`, returning the new weight.
    ///
    /// # Errors
    /// * [`SampleError::NotRegistered`] if `value` is absent.
    /// * [`SampleError::InvalidFactor`] if `factor < 1` or not finite.
    pub fn boost_weight(&mut self, value: &Value<T>, factor: f64) -> Result<f64> {
        self.scale_one(value, factor, check_boost)
    }

    fn scale_one(
        &mut self,
        value: &Value<T>,
        factor: f64,
        check: fn(f64, f64) -> Result<f64>,
    ) -> Result<f64> {
        let index = self.position(value).ok_or(SampleError::NotRegistered)?;
        let weight = check(self.entry_at(index).weight(), factor)?;
        self.set_weight_at(index, weight);
        Ok(weight)
    }
}

fn check_decay(weight: f64, factor: f64) -> Result<f64> {
    if factor.is_nan() || factor > 1.0 {
        return Err(SampleError::InvalidFactor { factor });
    }
    let scaled = weight * factor;
    if factor <= 0.0 || scaled <= 0.0 {
        return Err(SampleError::DecayUnderflow { weight, factor });
    }
    Ok(scaled)
}

fn check_boost(weight: f64, factor: f64) -> Result<f64> {
    if !factor.is_finite() || factor < 1.0 {
        return Err(SampleError::InvalidFactor { factor });
    }
    let scaled = weight * factor;
    if !scaled.is_finite() {
        return Err(SampleError::InvalidWeight { weight: scaled });
    }
    Ok(scaled)
}
