//! The payload stored in a weight table slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::group::Group;
use crate::resolve::Generator;

/// A sampler shared into a table as a value. Drawing the slot draws from it.
pub type SharedGenerator<T> = Rc<RefCell<dyn Generator<T>>>;

/// Anything that can be registered in a [`WeightTable`](crate::WeightTable).
///
/// Identity decides whether two values are "the same registration":
///
/// * [`Value::Scalar`] compares by value (`T: PartialEq`).
/// * [`Value::Reference`], [`Value::Group`] and [`Value::Nested`] compare by
///   pointer identity. Two structurally equal but separately allocated
///   references are different values.
/// * Values of different variants are never the same.
pub enum Value<T> {
    Scalar(T),
    Reference(Rc<T>),
    Group(Rc<Group<T>>),
    Nested(SharedGenerator<T>),
}

impl<T> Value<T> {
    /// Wrap `item` in a fresh reference; it will only ever equal its own clones.
    pub fn reference(item: T) -> Self {
        Value::Reference(Rc::new(item))
    }

    pub fn group(group: Group<T>) -> Self {
        Value::Group(Rc::new(group))
    }

    /// Register a sampler as a value of another sampler.
    ///
    /// Keep a handle with [`Value::Nested`] directly if you still need to
    /// mutate the inner sampler afterwards.
    pub fn nested<S>(sampler: S) -> Self
    where
        S: Generator<T> + 'static,
    {
        Value::Nested(Rc::new(RefCell::new(sampler)))
    }

    /// The payload of a scalar or reference value.
    pub fn get(&self) -> Option<&T> {
        match self {
            Value::Scalar(item) => Some(item),
            Value::Reference(item) => Some(item),
            Value::Group(_) | Value::Nested(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group<T>> {
        match self {
            Value::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Groups and nested samplers are resolved on draw; everything else is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Value::Scalar(_) | Value::Reference(_))
    }
}

impl<T: PartialEq> Value<T> {
    /// The lookup rule used by tables and duplicate-free draws.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => Rc::ptr_eq(a, b),
            (Value::Group(a), Value::Group(b)) => Rc::ptr_eq(a, b),
            // compare data pointers only; vtables for one type may differ across codegen units
            (Value::Nested(a), Value::Nested(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl<T: PartialEq> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl<T> From<T> for Value<T> {
    fn from(item: T) -> Self {
        Value::Scalar(item)
    }
}

impl<T> Clone for Value<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Value::Scalar(item) => Value::Scalar(item.clone()),
            Value::Reference(item) => Value::Reference(Rc::clone(item)),
            Value::Group(group) => Value::Group(Rc::clone(group)),
            Value::Nested(inner) => Value::Nested(Rc::clone(inner)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(item) => f.debug_tuple("Scalar").field(item).finish(),
            Value::Reference(item) => f.debug_tuple("Reference").field(item).finish(),
            Value::Group(group) => f.debug_tuple("Group").field(&group.members()).finish(),
            Value::Nested(inner) => write!(f, "Nested({:p})", Rc::as_ptr(inner)),
        }
    }
}
