//! Multi-dimensional histograms with selectable storage
//!
//! `histkit` bundles the workspace crates behind one dependency:
//!
//! - [`histkit_core`]: accumulator cells, axis options and layout contracts
//! - [`histkit_histogram`]: axes, storage strategies, histograms and their
//!   factories
//! - [`histkit_polars`] (feature `dataframe`, on by default): lazy, typed
//!   actions that fill histograms from Polars DataFrames
//!
//! # Example
//!
//! ```rust
//! use histkit::prelude::*;
//!
//! const OPTS: AxisOptions = get_option::<false, true, false, false>();
//!
//! let hist = make_atomic_histogram((
//!     Regular::with_options(10, 0.0, 1.0, OPTS).unwrap(),
//!     Category::new(vec!["signal", "background"]).unwrap(),
//! ));
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| hist.fill_shared(&(0.42, "signal")));
//!     }
//! });
//! assert_eq!(hist.size(), 11 * 3);
//! assert_eq!(hist.sum(), 4.0);
//! ```

pub use histkit_core;
pub use histkit_histogram;
#[cfg(feature = "dataframe")]
pub use histkit_polars;

pub use histkit_core::{buffer_bytes, get_option, size_of, AxisOptions, SizeOf, StandardLayout};
pub use histkit_histogram::{
    make_atomic_histogram, make_atomic_histogram_with_error,
    make_atomic_histogram_with_error_adopted, make_histogram, make_histogram_adopted,
    make_histogram_with, make_histogram_with_error, Histogram,
};
#[cfg(feature = "dataframe")]
pub use histkit_polars::{book_helper, BookingFrame, EngineConfig, ResultHandle};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use histkit_histogram::prelude::*;
    #[cfg(feature = "dataframe")]
    pub use histkit_polars::{
        book_helper, ActionHelper, BookingFrame, EngineConfig, FillHistogram,
        FillHistogramPerSlot, ResultHandle,
    };
}
