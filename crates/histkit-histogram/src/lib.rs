//! Multi-dimensional histograms with selectable cell storage
//!
//! This crate turns the building blocks of `histkit-core` into histograms:
//! a tuple of axes, a storage strategy, and factory functions that pick the
//! accumulator flavour.
//!
//! # Key Features
//!
//! - **Heterogeneous axes**: regular, integer, variable-width and category
//!   axes mixed freely in tuples of up to six
//! - **Four accumulator flavours**: plain or weighted, single-threaded or atomic
//! - **Memory adoption**: run a histogram on top of a buffer owned elsewhere,
//!   without copying it
//! - **Growing axes**: dense storage is re-laid out when an axis extends
//!
//! # Examples
//!
//! ## Filling a weighted histogram
//!
//! ```rust
//! use histkit_histogram::prelude::*;
//!
//! let mut hist = make_histogram_with_error((
//!     Regular::new(4, 0.0, 2.0).unwrap(),
//!     Category::new(vec!["barrel", "endcap"]).unwrap(),
//! ));
//! hist.fill_weighted(&(0.3, "barrel"), 2.0).unwrap();
//! hist.fill_weighted(&(0.4, "barrel"), 1.0).unwrap();
//!
//! let cell = hist.at(&(0.1, "barrel")).unwrap();
//! assert_eq!(cell.sum_of_weights, 3.0);
//! assert_eq!(cell.sum_of_weights_squared, 5.0);
//! ```
//!
//! ## Adopting a buffer
//!
//! ```rust
//! use histkit_histogram::prelude::*;
//!
//! let mut buffer = vec![0.0_f64; 4];
//! let storage = AdoptedStorage::from_slice(&mut buffer);
//! let mut hist = make_histogram_adopted(storage, (Integer::new(0, 2).unwrap(),)).unwrap();
//! hist.fill(&(0,)).unwrap();
//! drop(hist);
//! assert_eq!(buffer, vec![0.0, 1.0, 0.0, 0.0]);
//! ```

pub mod axes;
pub mod axis;
pub mod factories;
pub mod histogram;
pub mod storage;

pub use axes::{Axes, AxisLayout};
pub use axis::{Axis, Category, Integer, Regular, Variable, MAX_GROWTH_BINS};
pub use factories::{
    make_atomic_histogram, make_atomic_histogram_with_error,
    make_atomic_histogram_with_error_adopted, make_histogram, make_histogram_adopted,
    make_histogram_with, make_histogram_with_error,
};
pub use histogram::Histogram;
pub use storage::{
    AdoptedStorage, AtomicStorage, AtomicWeightedStorage, DefaultStorage, DenseStorage, Regrow,
    Storage, WeightedStorage,
};

// Re-export core types
pub use histkit_core::{
    Accumulator, AtomicAccumulator, AtomicCount, AtomicWeightedSum, AxisOptions, Error, Result,
    StandardLayout, WeightedSum,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        make_atomic_histogram, make_atomic_histogram_with_error,
        make_atomic_histogram_with_error_adopted, make_histogram, make_histogram_adopted,
        make_histogram_with, make_histogram_with_error, AdoptedStorage, Axes, Axis, Category,
        DenseStorage, Histogram, Integer, Regular, Storage, Variable,
    };
    pub use histkit_core::prelude::*;
}
