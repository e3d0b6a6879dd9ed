//! Accumulator cells
//!
//! A histogram cell is one of four accumulators:
//!
//! | cell | tracks | concurrent fills |
//! |---|---|---|
//! | `f64` | count (or sum of weights) | no |
//! | [`AtomicCount`] | count (or sum of weights) | yes |
//! | [`WeightedSum`] | sum of weights and sum of squared weights | no |
//! | [`AtomicWeightedSum`] | sum of weights and sum of squared weights | yes |
//!
//! The atomic cells keep the `f64` bit pattern inside an `AtomicU64` and
//! add with a compare-and-swap loop, so any number of threads may fill the
//! same cell through a shared reference without losing updates. Each atomic
//! cell has exactly the size and alignment of its plain counterpart, which
//! is what lets a buffer of plain values be adopted as atomic cells.

use std::fmt;
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};

/// A histogram cell filled through exclusive access
pub trait Accumulator: Default + Send {
    /// Record one unweighted entry
    fn fill(&mut self);

    /// Record one entry with the given weight
    fn fill_weighted(&mut self, weight: f64);

    /// Accumulated value (count or sum of weights)
    fn value(&self) -> f64;

    /// Variance estimate of [`value`](Accumulator::value)
    fn variance(&self) -> f64;

    /// Add the content of another cell into this one
    fn merge(&mut self, other: &Self);
}

/// A histogram cell that may be filled concurrently through `&self`
pub trait AtomicAccumulator: Accumulator + Sync {
    /// Record one unweighted entry
    fn fill_shared(&self);

    /// Record one entry with the given weight
    fn fill_weighted_shared(&self, weight: f64);
}

// Plain counts: the variance of a Poisson count is the count itself.
impl Accumulator for f64 {
    #[inline]
    fn fill(&mut self) {
        *self += 1.0;
    }

    #[inline]
    fn fill_weighted(&mut self, weight: f64) {
        *self += weight;
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn variance(&self) -> f64 {
        *self
    }

    #[inline]
    fn merge(&mut self, other: &Self) {
        *self += *other;
    }
}

/// An `f64` counter that supports lock-free concurrent addition
#[repr(transparent)]
#[derive(Default)]
pub struct AtomicCount {
    bits: AtomicU64,
}

impl AtomicCount {
    /// Create a counter holding `value`
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    /// Current value
    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Overwrite the current value
    #[inline]
    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Atomically add `delta`, returning the previous value
    #[inline]
    pub fn add(&self, delta: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(previous) => return f64::from_bits(previous),
                Err(observed) => current = observed,
            }
        }
    }

    // Exclusive access needs no compare-and-swap.
    #[inline]
    fn add_exclusive(&mut self, delta: f64) {
        let bits = self.bits.get_mut();
        *bits = (f64::from_bits(*bits) + delta).to_bits();
    }
}

impl Clone for AtomicCount {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

impl PartialEq for AtomicCount {
    fn eq(&self, other: &Self) -> bool {
        self.load() == other.load()
    }
}

impl fmt::Debug for AtomicCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCount").field(&self.load()).finish()
    }
}

impl From<f64> for AtomicCount {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Accumulator for AtomicCount {
    #[inline]
    fn fill(&mut self) {
        self.add_exclusive(1.0);
    }

    #[inline]
    fn fill_weighted(&mut self, weight: f64) {
        self.add_exclusive(weight);
    }

    #[inline]
    fn value(&self) -> f64 {
        self.load()
    }

    #[inline]
    fn variance(&self) -> f64 {
        self.load()
    }

    fn merge(&mut self, other: &Self) {
        self.add_exclusive(other.load());
    }
}

impl AtomicAccumulator for AtomicCount {
    #[inline]
    fn fill_shared(&self) {
        self.add(1.0);
    }

    #[inline]
    fn fill_weighted_shared(&self, weight: f64) {
        self.add(weight);
    }
}

/// Sum of weights together with the sum of squared weights
///
/// The squared sum is the variance estimate of the weighted sum, which plain
/// counts cannot provide once entries carry weights other than one.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WeightedSum {
    pub sum_of_weights: f64,
    pub sum_of_weights_squared: f64,
}

impl WeightedSum {
    /// Create a cell from its two sums
    pub fn new(sum_of_weights: f64, sum_of_weights_squared: f64) -> Self {
        Self {
            sum_of_weights,
            sum_of_weights_squared,
        }
    }
}

impl AddAssign for WeightedSum {
    fn add_assign(&mut self, rhs: Self) {
        self.sum_of_weights += rhs.sum_of_weights;
        self.sum_of_weights_squared += rhs.sum_of_weights_squared;
    }
}

impl Accumulator for WeightedSum {
    #[inline]
    fn fill(&mut self) {
        self.fill_weighted(1.0);
    }

    #[inline]
    fn fill_weighted(&mut self, weight: f64) {
        self.sum_of_weights += weight;
        self.sum_of_weights_squared += weight * weight;
    }

    #[inline]
    fn value(&self) -> f64 {
        self.sum_of_weights
    }

    #[inline]
    fn variance(&self) -> f64 {
        self.sum_of_weights_squared
    }

    fn merge(&mut self, other: &Self) {
        *self += *other;
    }
}

/// Thread-safe [`WeightedSum`]
///
/// The two sums are updated independently, so a [`load`](Self::load) taken
/// while other threads are filling may pair a sum with a squared sum from a
/// different moment. Once all fills have completed the pair is exact.
#[repr(C)]
#[derive(Default, Clone, PartialEq)]
pub struct AtomicWeightedSum {
    sum_of_weights: AtomicCount,
    sum_of_weights_squared: AtomicCount,
}

impl AtomicWeightedSum {
    /// Create a cell from its two sums
    pub fn new(sum_of_weights: f64, sum_of_weights_squared: f64) -> Self {
        Self {
            sum_of_weights: AtomicCount::new(sum_of_weights),
            sum_of_weights_squared: AtomicCount::new(sum_of_weights_squared),
        }
    }

    /// Snapshot of both sums
    pub fn load(&self) -> WeightedSum {
        WeightedSum::new(
            self.sum_of_weights.load(),
            self.sum_of_weights_squared.load(),
        )
    }

    /// Overwrite both sums
    pub fn store(&self, sums: WeightedSum) {
        self.sum_of_weights.store(sums.sum_of_weights);
        self.sum_of_weights_squared.store(sums.sum_of_weights_squared);
    }
}

impl fmt::Debug for AtomicWeightedSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sums = self.load();
        f.debug_struct("AtomicWeightedSum")
            .field("sum_of_weights", &sums.sum_of_weights)
            .field("sum_of_weights_squared", &sums.sum_of_weights_squared)
            .finish()
    }
}

impl From<WeightedSum> for AtomicWeightedSum {
    fn from(sums: WeightedSum) -> Self {
        Self::new(sums.sum_of_weights, sums.sum_of_weights_squared)
    }
}

impl Accumulator for AtomicWeightedSum {
    #[inline]
    fn fill(&mut self) {
        self.fill_weighted(1.0);
    }

    #[inline]
    fn fill_weighted(&mut self, weight: f64) {
        self.sum_of_weights.add_exclusive(weight);
        self.sum_of_weights_squared.add_exclusive(weight * weight);
    }

    #[inline]
    fn value(&self) -> f64 {
        self.sum_of_weights.load()
    }

    #[inline]
    fn variance(&self) -> f64 {
        self.sum_of_weights_squared.load()
    }

    fn merge(&mut self, other: &Self) {
        let sums = other.load();
        self.sum_of_weights.add_exclusive(sums.sum_of_weights);
        self.sum_of_weights_squared
            .add_exclusive(sums.sum_of_weights_squared);
    }
}

impl AtomicAccumulator for AtomicWeightedSum {
    #[inline]
    fn fill_shared(&self) {
        self.fill_weighted_shared(1.0);
    }

    #[inline]
    fn fill_weighted_shared(&self, weight: f64) {
        self.sum_of_weights.add(weight);
        self.sum_of_weights_squared.add(weight * weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_plain_count() {
        let mut cell = 0.0_f64;
        cell.fill();
        cell.fill();
        cell.fill_weighted(0.5);
        assert_eq!(cell.value(), 2.5);
        assert_eq!(cell.variance(), 2.5);

        let mut other = 1.0_f64;
        other.merge(&cell);
        assert_eq!(other, 3.5);
    }

    #[test]
    fn test_weighted_sum_tracks_squares() {
        let mut cell = WeightedSum::default();
        for w in [0.5, 1.5, 2.0] {
            cell.fill_weighted(w);
        }
        assert_relative_eq!(cell.value(), 4.0);
        assert_relative_eq!(cell.variance(), 0.25 + 2.25 + 4.0);

        cell.fill();
        assert_relative_eq!(cell.value(), 5.0);
        assert_relative_eq!(cell.variance(), 7.5);
    }

    #[test]
    fn test_atomic_count_add_returns_previous() {
        let cell = AtomicCount::new(1.5);
        assert_eq!(cell.add(2.0), 1.5);
        assert_eq!(cell.load(), 3.5);
        cell.store(-1.0);
        assert_eq!(cell.load(), -1.0);
    }

    #[test]
    fn test_atomic_and_plain_agree() {
        let weights = [0.1, 2.0, 3.5, -1.0, 0.25];
        let mut plain = WeightedSum::default();
        let mut exclusive = AtomicWeightedSum::default();
        let shared = AtomicWeightedSum::default();
        for &w in &weights {
            plain.fill_weighted(w);
            exclusive.fill_weighted(w);
            shared.fill_weighted_shared(w);
        }
        assert_eq!(exclusive.load(), plain);
        assert_eq!(shared.load(), plain);
    }

    #[test]
    fn test_atomic_merge_and_clone() {
        let mut a = AtomicWeightedSum::new(1.0, 1.0);
        let b = AtomicWeightedSum::new(2.0, 4.0);
        a.merge(&b);
        assert_eq!(a.load(), WeightedSum::new(3.0, 5.0));

        let c = a.clone();
        a.fill();
        assert_eq!(c.load(), WeightedSum::new(3.0, 5.0));
        assert_eq!(a.load(), WeightedSum::new(4.0, 6.0));
    }

    #[test]
    fn test_concurrent_fills_lose_no_updates() {
        const THREADS: usize = 8;
        const FILLS: usize = 10_000;

        let count = Arc::new(AtomicCount::default());
        let sums = Arc::new(AtomicWeightedSum::default());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let count = Arc::clone(&count);
                let sums = Arc::clone(&sums);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..FILLS {
                        count.fill_shared();
                        sums.fill_weighted_shared(2.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let n = (THREADS * FILLS) as f64;
        assert_eq!(count.load(), n);
        assert_eq!(sums.load(), WeightedSum::new(2.0 * n, 4.0 * n));
    }

    proptest::proptest! {
        #[test]
        fn prop_merge_equals_sequential_fill(
            left in proptest::collection::vec(-1e3f64..1e3, 0..50),
            right in proptest::collection::vec(-1e3f64..1e3, 0..50),
        ) {
            let mut a = WeightedSum::default();
            let mut b = WeightedSum::default();
            let mut all = WeightedSum::default();
            for &w in &left {
                a.fill_weighted(w);
                all.fill_weighted(w);
            }
            for &w in &right {
                b.fill_weighted(w);
                all.fill_weighted(w);
            }
            a.merge(&b);
            assert_relative_eq!(a.value(), all.value(), epsilon = 1e-6);
            assert_relative_eq!(a.variance(), all.variance(), max_relative = 1e-9, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_debug_shows_values() {
        let cell = AtomicWeightedSum::new(1.0, 2.0);
        let debug = format!("{cell:?}");
        assert!(debug.contains("sum_of_weights: 1.0"));
        assert!(format!("{:?}", AtomicCount::new(3.0)).contains("3.0"));
    }
}
