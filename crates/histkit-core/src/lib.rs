//! Core types for histkit histograms
//!
//! This crate provides the pieces every other histkit crate builds on:
//!
//! 1. **Accumulator cells** - plain counts, atomic counts, weighted sums and
//!    atomic weighted sums, all with a flat, fixed memory layout
//! 2. **Axis options** - a `const`-evaluable algebra over the four boundary
//!    behaviours an axis can carry (underflow, overflow, circular, growth)
//! 3. **Layout contracts** - the [`StandardLayout`] marker that gates
//!    adoption of foreign memory, and compile-time size helpers
//!
//! # Example
//!
//! ```rust
//! use histkit_core::{get_option, Accumulator, AtomicAccumulator, AtomicWeightedSum, AxisOptions};
//!
//! const OPTS: AxisOptions = get_option::<true, true, false, false>();
//! assert_eq!(OPTS, AxisOptions::UNDERFLOW | AxisOptions::OVERFLOW);
//!
//! let cell = AtomicWeightedSum::default();
//! cell.fill_weighted_shared(2.0);
//! cell.fill_weighted_shared(3.0);
//! assert_eq!(cell.value(), 5.0);
//! assert_eq!(cell.variance(), 13.0);
//! ```

pub mod accumulators;
pub mod error;
pub mod layout;
pub mod options;

pub use accumulators::{
    Accumulator, AtomicAccumulator, AtomicCount, AtomicWeightedSum, WeightedSum,
};
pub use error::{Error, Result};
pub use layout::{buffer_bytes, size_of, SizeOf, StandardLayout};
pub use options::{get_option, AxisOptions};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        get_option, Accumulator, AtomicAccumulator, AtomicCount, AtomicWeightedSum,
        AxisOptions, Error, Result, StandardLayout, WeightedSum,
    };
}
