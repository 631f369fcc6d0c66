//! Unwrapping groups and nested samplers into the leaf value a caller sees.

use rand::RngCore;

use crate::error::{Result, SampleError};
use crate::value::Value;

/// The draw contract shared by every sampler, so samplers can be nested.
///
/// Takes `&mut dyn RngCore` to stay object safe; the inherent `generate`
/// methods on the samplers accept any `R: Rng`.
pub trait Generator<T> {
    /// Draw one fully resolved value.
    fn generate(&mut self, rng: &mut dyn RngCore) -> Result<Value<T>>;
}

/// Resolve a raw slot value.
///
/// Groups pick a member uniformly (and that member is resolved in turn),
/// nested samplers draw, leaves are returned as is. Depth is whatever the
/// caller built. A sampler that ends up drawing from itself is reported as
/// [`SampleError::CyclicNesting`] instead of looping.
pub(crate) fn resolve<T: Clone>(value: &Value<T>, rng: &mut dyn RngCore) -> Result<Value<T>> {
    match value {
        Value::Group(group) => {
            let member = group.pick_one(rng);
            resolve(member, rng)
        }
        Value::Nested(inner) => {
            let mut sampler = inner
                .try_borrow_mut()
                .map_err(|_| SampleError::CyclicNesting)?;
            sampler.generate(rng)
        }
        leaf => Ok(leaf.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Group, WeightedSampler};
    use rand::{SeedableRng, rngs::StdRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Constant(u32);

    impl Generator<u32> for Constant {
        fn generate(&mut self, _rng: &mut dyn RngCore) -> Result<Value<u32>> {
            Ok(Value::Scalar(self.0))
        }
    }

    #[test]
    fn leaves_pass_through() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = resolve(&Value::Scalar(3u32), &mut rng).unwrap();
        assert_eq!(v, Value::Scalar(3));
    }

    #[test]
    fn nested_generator_is_drawn() {
        let mut rng = StdRng::seed_from_u64(2);
        let v = resolve(&Value::nested(Constant(9)), &mut rng).unwrap();
        assert_eq!(v, Value::Scalar(9));
    }

    #[test]
    fn group_of_nested_resolves_all_the_way() {
        let mut rng = StdRng::seed_from_u64(3);
        let group = Group::new([Value::nested(Constant(1)), Value::nested(Constant(2))]).unwrap();
        for _ in 0..50 {
            let v = resolve(&Value::group(group.clone()), &mut rng).unwrap();
            assert!(v == Value::Scalar(1) || v == Value::Scalar(2));
        }
    }

    #[test]
    fn self_nesting_is_reported() {
        let mut rng = StdRng::seed_from_u64(4);
        let outer = Rc::new(RefCell::new(WeightedSampler::<u32>::new()));
        let handle: Value<u32> = Value::Nested(outer.clone());
        outer.borrow_mut().register(handle.clone(), 1.0).unwrap();

        let err = resolve(&handle, &mut rng).unwrap_err();
        assert_eq!(err, SampleError::CyclicNesting);
    }
}
