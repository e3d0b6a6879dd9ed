//! Helpers that fill histograms from DataFrame rows
//!
//! Both helpers take a projection from a row to `(coordinates, weight)`;
//! a `None` weight records an unweighted entry.
//!
//! - [`FillHistogram`] shares one histogram with atomic cells between all
//!   workers and fills it through `&self`.
//! - [`FillHistogramPerSlot`] works with any accumulator: each slot fills a
//!   private copy, and the copies are merged when the loop finishes.
//!
//! # Example
//!
//! ```rust
//! use histkit_histogram::{make_atomic_histogram_with_error, Integer, Regular};
//! use histkit_polars::{BookingFrame, FillHistogram};
//! use polars::prelude::*;
//!
//! let df = df![
//!     "pt" => [12.0f64, 35.5, 47.0, 80.0],
//!     "charge" => [-1i32, 1, 1, -1],
//!     "weight" => [1.0f64, 0.5, 2.0, 1.0],
//! ]
//! .unwrap();
//! let frame = BookingFrame::new(df);
//!
//! let hist = make_atomic_histogram_with_error((
//!     Regular::new(5, 0.0, 100.0).unwrap(),
//!     Integer::new(-1, 2).unwrap(),
//! ));
//! let helper = FillHistogram::new(hist, |(pt, charge, w): (f64, i32, f64)| {
//!     ((pt, i64::from(charge)), Some(w))
//! });
//! let handle = frame.book::<(f64, i32, f64), _>(helper, ["pt", "charge", "weight"]);
//!
//! let filled = handle.get().unwrap();
//! assert_eq!(filled.sum(), 4.5);
//! ```

use std::sync::{Mutex, PoisonError};

use histkit_histogram::{Accumulator, AtomicAccumulator, Axes, Histogram, Storage};
use tracing::debug;

use crate::columns::ColumnTypes;
use crate::error::{Error, Result};
use crate::helper::ActionHelper;

/// Fills one shared atomic histogram from every worker
pub struct FillHistogram<A, S, F> {
    hist: Histogram<A, S>,
    project: F,
}

impl<A, S, F> FillHistogram<A, S, F> {
    pub fn new(hist: Histogram<A, S>, project: F) -> Self {
        Self { hist, project }
    }
}

impl<C, A, S, F> ActionHelper<C> for FillHistogram<A, S, F>
where
    C: ColumnTypes,
    A: Axes + 'static,
    S: Storage + Send + Sync + 'static,
    S::Cell: AtomicAccumulator,
    F: Fn(C) -> (A::Values, Option<f64>) + Send + Sync + 'static,
{
    type Result = Histogram<A, S>;

    fn name(&self) -> String {
        format!("FillHistogram[rank {}]", A::RANK)
    }

    #[inline]
    fn exec(&self, _slot: usize, row: C) -> Result<()> {
        match (self.project)(row) {
            (values, Some(weight)) => self.hist.fill_weighted_shared(&values, weight),
            (values, None) => self.hist.fill_shared(&values),
        }
        Ok(())
    }

    fn finalize(self) -> Result<Histogram<A, S>> {
        Ok(self.hist)
    }
}

/// Fills one private histogram per slot and merges them at the end
///
/// Growing axes work with a single slot. With several slots every copy must
/// end up with the same axes, otherwise the merge fails.
pub struct FillHistogramPerSlot<A, S, F> {
    hist: Histogram<A, S>,
    slots: Vec<Mutex<Histogram<A, S>>>,
    project: F,
}

impl<A, S, F> FillHistogramPerSlot<A, S, F> {
    pub fn new(hist: Histogram<A, S>, project: F) -> Self {
        Self {
            hist,
            slots: Vec::new(),
            project,
        }
    }
}

impl<C, A, S, F> ActionHelper<C> for FillHistogramPerSlot<A, S, F>
where
    C: ColumnTypes,
    A: Axes + 'static,
    S: Storage + Clone + Send + Sync + 'static,
    S::Cell: Accumulator,
    F: Fn(C) -> (A::Values, Option<f64>) + Send + Sync + 'static,
{
    type Result = Histogram<A, S>;

    fn name(&self) -> String {
        format!("FillHistogramPerSlot[rank {}]", A::RANK)
    }

    fn initialize(&mut self, n_slots: usize) {
        let mut empty = self.hist.clone();
        empty.reset();
        // Slot 0 carries whatever the histogram already held
        self.slots = (0..n_slots)
            .map(|slot| match slot {
                0 => Mutex::new(self.hist.clone()),
                _ => Mutex::new(empty.clone()),
            })
            .collect();
    }

    fn exec(&self, slot: usize, row: C) -> Result<()> {
        let (values, weight) = (self.project)(row);
        let mut hist = self
            .slots
            .get(slot)
            .ok_or_else(|| Error::Execution(format!("slot {slot} was never initialized")))?
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match weight {
            Some(weight) => hist.fill_weighted(&values, weight)?,
            None => hist.fill(&values)?,
        }
        Ok(())
    }

    fn finalize(self) -> Result<Histogram<A, S>> {
        let Self { hist, slots, .. } = self;
        debug!("Merging {} slot histograms", slots.len());
        let mut parts = slots
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner));
        let Some(mut merged) = parts.next() else {
            return Ok(hist);
        };
        for part in parts {
            merged.merge(&part)?;
        }
        Ok(merged)
    }
}
