//! Slot storage: `(value, weight)` pairs in insertion order.

use std::cell::Cell;

use crate::error::{Result, SampleError, check_weight};
use crate::group::Group;
use crate::value::Value;

/// Stable handle to a registered slot. Survives other slots being removed
/// and the slot's own weight changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotRef(u64);

/// A value and its weight, as stored in (or exported from) a table.
#[derive(Debug, Clone)]
pub struct WeightedEntry<T> {
    value: Value<T>,
    weight: f64,
}

impl<T> WeightedEntry<T> {
    /// # Errors
    /// [`SampleError::InvalidWeight`] if `weight` is not positive and finite.
    pub fn new(value: Value<T>, weight: f64) -> Result<Self> {
        Ok(Self {
            value,
            weight: check_weight(weight)?,
        })
    }

    pub fn value(&self) -> &Value<T> {
        &self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Export as a plain pair, e.g. to re-register elsewhere.
    pub fn into_parts(self) -> (Value<T>, f64) {
        (self.value, self.weight)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    id: SlotRef,
    entry: WeightedEntry<T>,
    selections: u64,
}

/// Ordered `(value, weight)` slots with a cached total.
///
/// Insertion order is iteration order, which is also the order the
/// cumulative draw walks. Every stored weight is positive and finite.
///
/// ```rust
/// use weighted_bag::WeightTable;
///
/// let mut table = WeightTable::from_pairs([("apple", 70.0), ("banana", 30.0)]).unwrap();
/// assert_eq!(table.total_weight(), 100.0);
/// table.register("apple", 10.0).unwrap(); // updates in place
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.probability_of(&"apple".into()).unwrap(), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct WeightTable<T> {
    slots: Vec<Slot<T>>,
    next_id: u64,
    total: Cell<Option<f64>>,
    track_selections: bool,
}

impl<T> Default for WeightTable<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
            total: Cell::new(None),
            track_selections: false,
        }
    }
}

impl<T> WeightTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots (a group counts once).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of all weights. Recomputed only after the table changed.
    pub fn total_weight(&self) -> f64 {
        if let Some(total) = self.total.get() {
            return total;
        }
        let total = self.slots.iter().map(|s| s.entry.weight).sum();
        self.total.set(Some(total));
        total
    }

    pub fn get(&self, slot: SlotRef) -> Option<&WeightedEntry<T>> {
        self.slots
            .iter()
            .find(|s| s.id == slot)
            .map(|s| &s.entry)
    }

    /// Remove a slot by handle.
    ///
    /// # Errors
    /// [`SampleError::NotRegistered`] if the handle is stale.
    pub fn remove_slot(&mut self, slot: SlotRef) -> Result<WeightedEntry<T>> {
        let index = self
            .slots
            .iter()
            .position(|s| s.id == slot)
            .ok_or(SampleError::NotRegistered)?;
        Ok(self.remove_at(index))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &WeightedEntry<T>> {
        self.slots.iter().map(|s| &s.entry)
    }

    /// `(handle, entry)` pairs in insertion order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = (SlotRef, &WeightedEntry<T>)> {
        self.slots.iter().map(|s| (s.id, &s.entry))
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value<T>> {
        self.slots.iter().map(|s| &s.entry.value)
    }

    pub fn weights(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.slots.iter().map(|s| s.entry.weight)
    }

    /// Start or stop counting draws per slot. Existing counts are kept.
    pub fn set_selection_tracking(&mut self, enabled: bool) {
        self.track_selections = enabled;
    }

    pub fn is_tracking_selections(&self) -> bool {
        self.track_selections
    }

    /// Draws recorded across all slots.
    pub fn total_selections(&self) -> u64 {
        self.slots.iter().map(|s| s.selections).sum()
    }

    pub fn reset_selection_counts(&mut self) {
        for slot in &mut self.slots {
            slot.selections = 0;
        }
    }

    pub(crate) fn entry_at(&self, index: usize) -> &WeightedEntry<T> {
        &self.slots[index].entry
    }

    pub(crate) fn selections_at(&self, index: usize) -> u64 {
        self.slots[index].selections
    }

    pub(crate) fn record_selection(&mut self, index: usize) {
        if self.track_selections {
            self.slots[index].selections += 1;
        }
    }

    /// Overwrite a weight the caller has already validated.
    pub(crate) fn set_weight_at(&mut self, index: usize, weight: f64) {
        self.slots[index].entry.weight = weight;
        self.invalidate();
    }

    fn remove_at(&mut self, index: usize) -> WeightedEntry<T> {
        let slot = self.slots.remove(index);
        self.invalidate();
        slot.entry
    }

    fn push(&mut self, entry: WeightedEntry<T>) -> SlotRef {
        let id = SlotRef(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            entry,
            selections: 0,
        });
        self.invalidate();
        id
    }

    fn invalidate(&self) {
        self.total.set(None);
    }

    /// Build a table without weight validation, to reach states that
    /// registration refuses (zero or negative weights).
    #[cfg(test)]
    pub(crate) fn from_raw_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value<T>, f64)>,
    {
        let mut table = Self::new();
        for (value, weight) in entries {
            table.push(WeightedEntry { value, weight });
        }
        table
    }
}

impl<T: PartialEq> WeightTable<T> {
    /// Build from any `(item, weight)` iterator; items become scalars.
    ///
    /// Repeated items keep their first position and their last weight.
    ///
    /// # Errors
    /// [`SampleError::InvalidWeight`] on the first bad weight; nothing is built.
    ///
    /// # Complexity
    /// O(n²) for n distinct items, since lookups scan.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut table = Self::new();
        for (item, weight) in pairs {
            table.register(item, weight)?;
        }
        Ok(table)
    }

    /// Register `value` with `weight`, or overwrite its weight if it is
    /// already present (see [`Value`] for the identity rule).
    ///
    /// # Errors
    /// [`SampleError::InvalidWeight`] if `weight` is not positive and finite.
    pub fn register(&mut self, value: impl Into<Value<T>>, weight: f64) -> Result<SlotRef> {
        let weight = check_weight(weight)?;
        let value = value.into();
        match self.position(&value) {
            Some(index) => {
                self.set_weight_at(index, weight);
                Ok(self.slots[index].id)
            }
            None => Ok(self.push(WeightedEntry { value, weight })),
        }
    }

    /// Register members that share a single slot of `weight`.
    ///
    /// # Errors
    /// [`SampleError::InvalidWeight`] first, then [`SampleError::EmptyGroup`].
    pub fn register_group<I>(&mut self, members: I, weight: f64) -> Result<SlotRef>
    where
        I: IntoIterator,
        I::Item: Into<Value<T>>,
    {
        let weight = check_weight(weight)?;
        let group = Group::new(members.into_iter().map(Into::into))?;
        Ok(self.push(WeightedEntry {
            value: Value::group(group),
            weight,
        }))
    }

    /// # Errors
    /// [`SampleError::NotRegistered`] if `value` is absent.
    pub fn remove(&mut self, value: &Value<T>) -> Result<WeightedEntry<T>> {
        let index = self.position(value).ok_or(SampleError::NotRegistered)?;
        Ok(self.remove_at(index))
    }

    pub fn contains(&self, value: &Value<T>) -> bool {
        self.position(value).is_some()
    }

    pub fn slot_of(&self, value: &Value<T>) -> Option<SlotRef> {
        self.position(value).map(|i| self.slots[i].id)
    }

    /// # Errors
    /// [`SampleError::NotRegistered`] if `value` is absent.
    pub fn weight_of(&self, value: &Value<T>) -> Result<f64> {
        self.position(value)
            .map(|i| self.slots[i].entry.weight)
            .ok_or(SampleError::NotRegistered)
    }

    /// `weight / total_weight()`.
    ///
    /// # Errors
    /// * [`SampleError::NotRegistered`] if `value` is absent.
    /// * [`SampleError::ZeroTotalWeight`] if the total is not positive.
    pub fn probability_of(&self, value: &Value<T>) -> Result<f64> {
        let weight = self.weight_of(value)?;
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(SampleError::ZeroTotalWeight);
        }
        Ok(weight / total)
    }

    /// Draws recorded for `value` since tracking started or was last reset.
    ///
    /// # Errors
    /// [`SampleError::NotRegistered`] if `value` is absent.
    pub fn selection_count(&self, value: &Value<T>) -> Result<u64> {
        self.position(value)
            .map(|i| self.slots[i].selections)
            .ok_or(SampleError::NotRegistered)
    }

    pub(crate) fn position(&self, value: &Value<T>) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.entry.value.same_identity(value))
    }
}
