//! Polars integration for histkit histograms
//!
//! This crate books typed, stateful actions against a Polars DataFrame and
//! runs them lazily on a rayon pool.
//!
//! - [`BookingFrame`] / [`book_helper`]: register an [`ActionHelper`] over
//!   named columns whose Rust types are given as a tuple
//! - [`ResultHandle`]: the deferred result; asking for it runs the frame
//! - [`FillHistogram`] / [`FillHistogramPerSlot`]: ready-made helpers that
//!   fill histograms from rows
//! - [`EngineConfig`]: worker count and chunking of the event loop
//!
//! # Example
//!
//! ```rust
//! use histkit_histogram::{make_histogram, Regular};
//! use histkit_polars::{book_helper, BookingFrame, EngineConfig, FillHistogramPerSlot};
//! use polars::prelude::*;
//!
//! let df = df!["x" => [0.1f64, 0.2, 0.7, 1.5]].unwrap();
//! let frame = BookingFrame::with_config(df, EngineConfig::default().with_min_chunk_len(1)).unwrap();
//!
//! let helper = FillHistogramPerSlot::new(
//!     make_histogram((Regular::new(2, 0.0, 1.0).unwrap(),)),
//!     |(x,): (f64,)| ((x,), None::<f64>),
//! );
//! let handle = book_helper::<(f64,), _>(&frame, helper, ["x"]);
//!
//! assert_eq!(handle.get().unwrap().values(), vec![0.0, 2.0, 1.0, 1.0]);
//! ```

mod booking;
mod columns;
mod config;
mod error;
mod helper;
mod histogram;

pub use booking::{book_helper, BookingFrame, ResultHandle};
pub use columns::{ColumnTypes, ColumnValue};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use helper::ActionHelper;
pub use histogram::{FillHistogram, FillHistogramPerSlot};
