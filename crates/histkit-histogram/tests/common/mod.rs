//! Common test utilities for histkit-histogram tests

#![allow(dead_code)]

use histkit_histogram::{AxisOptions, Category, Integer, Regular, Variable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A mixed three-axis layout: 6 + 4 + 3 bins with flow as configured
pub fn mixed_axes() -> (Regular, Integer, Category<u32>) {
    (
        Regular::new(4, -1.0, 1.0).unwrap(),
        Integer::with_options(0, 4, AxisOptions::NONE).unwrap(),
        Category::new(vec![11, 13]).unwrap(),
    )
}

/// Number of cells in [`mixed_axes`]
pub const MIXED_SIZE: usize = 6 * 4 * 3;

/// Variable-width axis used for one-dimensional checks
pub fn variable_axis() -> Variable {
    Variable::new(vec![0.0, 0.5, 2.0, 8.0]).unwrap()
}

/// Reproducible coordinates for [`mixed_axes`], some out of range
pub fn random_points(seed: u64, n: usize) -> Vec<(f64, i64, u32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            (
                rng.gen_range(-1.5..1.5),
                rng.gen_range(-1..6),
                if rng.gen_bool(0.8) { 11 } else { 12 },
            )
        })
        .collect()
}
