//! Tolerance-bucketed lookup tables used for canonicalization.
//!
//! A [`FuzzyFactory`] maps an `N`-dimensional coordinate tuple to a canonical
//! object. Coordinates are quantized by `1 / tolerance`; because two values a
//! hair apart can round into neighbouring bins, every newly created object is
//! registered under all `2^N` corner bins (`floor` and `floor + 1` in each
//! dimension) around its coordinates. A later lookup rounds to the nearest
//! bin, which is always one of those corners for values within one
//! tolerance step.

use crate::float_types::Real;
use hashbrown::HashMap;

/// Quantized-coordinate lookup table from `[Real; N]` to a canonical `T`.
#[derive(Debug, Clone)]
pub struct FuzzyFactory<T, const N: usize> {
    lookup_table: HashMap<[i64; N], T>,
    multiplier: Real,
}

impl<T: Clone, const N: usize> FuzzyFactory<T, N> {
    /// Create an empty table. Values closer than `tolerance` in every
    /// dimension resolve to the same object.
    pub fn new(tolerance: Real) -> Self {
        Self {
            lookup_table: HashMap::new(),
            multiplier: 1.0 / tolerance,
        }
    }

    /// Return the object registered near `elements`, or call `create`, register
    /// its result under all corner bins and return it.
    pub fn lookup_or_create<F>(&mut self, elements: [Real; N], create: F) -> T
    where
        F: FnOnce() -> T,
    {
        let multiplier = self.multiplier;
        let key = elements.map(|el| (el * multiplier).round() as i64);
        if let Some(existing) = self.lookup_table.get(&key) {
            return existing.clone();
        }

        let object = create();
        let floors = elements.map(|el| (el * multiplier).floor() as i64);
        for mask in 0..(1usize << N) {
            let mut corner = floors;
            for (dimension, bin) in corner.iter_mut().enumerate() {
                if mask & (1 << dimension) != 0 {
                    *bin += 1;
                }
            }
            self.lookup_table.insert(corner, object.clone());
        }
        object
    }

    /// Number of occupied bins (not distinct objects).
    pub fn bin_count(&self) -> usize {
        self.lookup_table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_straddling_a_bin_edge_collide() {
        let mut factory: FuzzyFactory<u32, 1> = FuzzyFactory::new(1e-5);
        // rounds to bin 1
        let first = factory.lookup_or_create([1.499_99e-5], || 1);
        // rounds to bin 2, registered as floor + 1 of the first value
        let second = factory.lookup_or_create([1.500_01e-5], || 2);
        assert_eq!(first, 1);
        assert_eq!(second, 1);
    }

    #[test]
    fn distant_values_stay_distinct() {
        let mut factory: FuzzyFactory<&str, 3> = FuzzyFactory::new(1e-5);
        let a = factory.lookup_or_create([0.0, 0.0, 0.0], || "a");
        let b = factory.lookup_or_create([1.0, 0.0, 0.0], || "b");
        let a_again = factory.lookup_or_create([0.000_001, 0.0, -0.000_001], || "c");
        assert_eq!(a, "a");
        assert_eq!(b, "b");
        assert_eq!(a_again, "a");
    }

    #[test]
    fn registers_every_corner_bin() {
        let mut factory: FuzzyFactory<(), 4> = FuzzyFactory::new(1e-5);
        factory.lookup_or_create([0.25, 0.5, 0.75, 1.0], || ());
        assert_eq!(factory.bin_count(), 16);
    }
}
