use rand::Rng;

use crate::error::{Result, SampleError};
use crate::value::Value;

/// A fixed set of members sharing one weight slot.
///
/// When the slot is drawn, one member is picked with equal odds.
/// Immutable after construction; members keep their construction order.
#[derive(Debug, Clone)]
pub struct Group<T> {
    members: Vec<Value<T>>,
}

impl<T> Group<T> {
    /// Build from any iterator of values. Errors if empty.
    pub fn new<I>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value<T>>,
    {
        let members: Vec<_> = members.into_iter().collect();
        if members.is_empty() {
            return Err(SampleError::EmptyGroup);
        }
        Ok(Self { members })
    }

    /// Convenience for plain items, each registered as a scalar.
    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(items.into_iter().map(Value::Scalar))
    }

    /// Number of members.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Value<T>] {
        &self.members
    }

    /// Pick a member **by reference**, uniformly over `0..len`.
    #[inline]
    pub fn pick_one<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> &'a Value<T> {
        &self.members[rng.random_range(0..self.members.len())]
    }
}
