//! The histogram value: axes plus cell storage

use histkit_core::{Accumulator, AtomicAccumulator, Error, Result};

use crate::axes::Axes;
use crate::storage::{Regrow, Storage};

/// A multi-dimensional histogram over the axis tuple `A` with storage `S`
///
/// The storage always holds exactly `axes.size()` cells. Histograms are
/// built through the functions in [`factories`](crate::factories).
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram<A, S> {
    axes: A,
    storage: S,
    grows: bool,
}

impl<A: Axes, S: Storage> Histogram<A, S> {
    pub(crate) fn from_parts(axes: A, storage: S) -> Self {
        debug_assert_eq!(axes.size(), storage.len());
        let grows = axes.can_grow();
        Self {
            axes,
            storage,
            grows,
        }
    }

    /// Number of axes
    pub fn rank(&self) -> usize {
        A::RANK
    }

    /// The axis tuple
    pub fn axes(&self) -> &A {
        &self.axes
    }

    /// The cell storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Total number of cells, flow bins included
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// All cells, first axis varying fastest
    pub fn cells(&self) -> &[S::Cell] {
        self.storage.cells()
    }

    /// Cell at a linear index
    pub fn get(&self, linear: usize) -> Option<&S::Cell> {
        self.storage.cells().get(linear)
    }

    /// Linear index of the cell a coordinate tuple falls into
    pub fn linear_index(&self, values: &A::Values) -> Option<usize> {
        self.axes.linear_index(values)
    }

    /// Cell a coordinate tuple falls into
    pub fn at(&self, values: &A::Values) -> Option<&S::Cell> {
        self.linear_index(values).and_then(|i| self.get(i))
    }

    /// Split into axes and storage
    pub fn into_parts(self) -> (A, S) {
        (self.axes, self.storage)
    }
}

impl<A: Axes, S: Storage> Histogram<A, S>
where
    S::Cell: Accumulator,
{
    /// Record one entry; growing axes extend to cover the coordinates
    pub fn fill(&mut self, values: &A::Values) -> Result<()> {
        self.fill_cell(values, |cell| cell.fill())
    }

    /// Record one weighted entry; growing axes extend to cover the coordinates
    pub fn fill_weighted(&mut self, values: &A::Values, weight: f64) -> Result<()> {
        self.fill_cell(values, |cell| cell.fill_weighted(weight))
    }

    fn fill_cell(&mut self, values: &A::Values, apply: impl FnOnce(&mut S::Cell)) -> Result<()> {
        let index = if self.grows && self.axes.needs_growth(values) {
            self.grow_to(values)?
        } else {
            self.axes.linear_index(values)
        };
        if let Some(index) = index {
            apply(&mut self.storage.cells_mut()[index]);
        }
        Ok(())
    }

    // Axes and storage change together or not at all.
    fn grow_to(&mut self, values: &A::Values) -> Result<Option<usize>> {
        let mut grown = self.axes.clone();
        let (index, shifts) = grown.update(values)?;
        if shifts.iter().any(|&s| s != 0) {
            let plan = Regrow::new(self.axes.layout(), grown.layout(), shifts);
            self.storage.regrow(&plan)?;
        }
        self.axes = grown;
        Ok(index)
    }

    /// Value of every cell
    pub fn values(&self) -> Vec<f64> {
        self.cells().iter().map(Accumulator::value).collect()
    }

    /// Variance of every cell
    pub fn variances(&self) -> Vec<f64> {
        self.cells().iter().map(Accumulator::variance).collect()
    }

    /// Sum of all cell values, flow bins included
    pub fn sum(&self) -> f64 {
        self.cells().iter().map(Accumulator::value).sum()
    }

    /// Empty every cell
    pub fn reset(&mut self) {
        for cell in self.storage.cells_mut() {
            *cell = S::Cell::default();
        }
    }

    /// Add the cells of another histogram with identical axes
    pub fn merge<S2>(&mut self, other: &Histogram<A, S2>) -> Result<()>
    where
        S2: Storage<Cell = S::Cell>,
    {
        if self.axes != other.axes {
            return Err(Error::InvalidParameter(
                "cannot merge histograms with different axes".to_string(),
            ));
        }
        for (cell, other) in self.storage.cells_mut().iter_mut().zip(other.cells()) {
            cell.merge(other);
        }
        Ok(())
    }
}

impl<A: Axes, S: Storage> Histogram<A, S>
where
    S::Cell: AtomicAccumulator,
{
    /// Record one entry through a shared reference
    ///
    /// Safe to call from many threads at once. Axes never grow on this
    /// path: a coordinate outside a growing axis goes to its overflow bin,
    /// or is dropped when there is none.
    #[inline]
    pub fn fill_shared(&self, values: &A::Values) {
        if let Some(index) = self.axes.linear_index(values) {
            self.storage.cells()[index].fill_shared();
        }
    }

    /// Record one weighted entry through a shared reference
    #[inline]
    pub fn fill_weighted_shared(&self, values: &A::Values, weight: f64) {
        if let Some(index) = self.axes.linear_index(values) {
            self.storage.cells()[index].fill_weighted_shared(weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{Category, Integer, Regular};
    use crate::factories::{
        make_atomic_histogram, make_histogram, make_histogram_with_error,
    };
    use crate::storage::AdoptedStorage;
    use approx::assert_relative_eq;
    use histkit_core::{AxisOptions, WeightedSum};

    #[test]
    fn test_fill_and_lookup() {
        let mut hist = make_histogram((Regular::new(4, 0.0, 4.0).unwrap(),));
        for x in [0.5, 1.5, 1.7, 3.9, 10.0, -2.0] {
            hist.fill(&(x,)).unwrap();
        }
        assert_eq!(hist.values(), vec![1.0, 1.0, 2.0, 0.0, 1.0, 1.0]);
        assert_eq!(hist.at(&(1.2,)), Some(&2.0));
        assert_eq!(hist.sum(), 6.0);
    }

    #[test]
    fn test_weighted_fill_tracks_variance() {
        let mut hist = make_histogram_with_error((Integer::new(0, 2).unwrap(),));
        hist.fill_weighted(&(0,), 2.0).unwrap();
        hist.fill_weighted(&(0,), 0.5).unwrap();
        hist.fill(&(1,)).unwrap();
        assert_eq!(hist.at(&(0,)), Some(&WeightedSum::new(2.5, 4.25)));
        assert_relative_eq!(hist.variances()[2], 1.0);
    }

    #[test]
    fn test_growth_relayouts_storage() {
        let mut hist = make_histogram((
            Integer::with_options(0, 2, AxisOptions::GROWTH).unwrap(),
            Category::with_options(vec!["a"], AxisOptions::GROWTH).unwrap(),
        ));
        hist.fill(&(1, "a")).unwrap();
        hist.fill(&(-1, "a")).unwrap();
        hist.fill(&(1, "b")).unwrap();

        assert_eq!(hist.axes().extents(), vec![3, 2]);
        assert_eq!(hist.size(), 6);
        assert_eq!(hist.at(&(1, "a")), Some(&1.0));
        assert_eq!(hist.at(&(-1, "a")), Some(&1.0));
        assert_eq!(hist.at(&(1, "b")), Some(&1.0));
        assert_eq!(hist.sum(), 3.0);
    }

    #[test]
    fn test_huge_coordinate_on_growing_axis_is_rejected() {
        let mut hist =
            make_histogram((Regular::with_options(2, 0.0, 2.0, AxisOptions::GROWTH).unwrap(),));
        hist.fill(&(1.5,)).unwrap();

        let err = hist.fill(&(1e300,)).unwrap_err();
        assert!(matches!(err, Error::GrowthUnsupported(_)));
        assert_eq!(hist.size(), 2);
        assert_eq!(hist.values(), vec![0.0, 1.0]);

        // The histogram stays usable and still grows for reasonable values
        hist.fill(&(3.5,)).unwrap();
        assert_eq!(hist.values(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_refused_regrow_keeps_axes_and_storage_in_step() {
        let mut buffer = vec![0.0_f64; 2];
        let axes = (Integer::with_options(0, 2, AxisOptions::GROWTH).unwrap(),);
        let mut hist = Histogram::from_parts(axes.clone(), AdoptedStorage::from_slice(&mut buffer));

        let err = hist.fill(&(5,)).unwrap_err();
        assert!(matches!(err, Error::GrowthUnsupported(_)));
        assert_eq!(hist.axes(), &axes);
        assert_eq!(hist.size(), hist.axes().size());

        // In-range fills still land in the right cell
        hist.fill(&(1,)).unwrap();
        drop(hist);
        assert_eq!(buffer, vec![0.0, 1.0]);
    }

    #[test]
    fn test_shared_fill_never_grows() {
        let category =
            Category::with_options(vec![1u32], AxisOptions::GROWTH | AxisOptions::OVERFLOW)
                .unwrap();
        let hist = make_atomic_histogram((category,));
        hist.fill_shared(&(1,));
        hist.fill_shared(&(7,));
        assert_eq!(hist.size(), 2);
        assert_eq!(hist.values(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_reset_and_merge() {
        let axes = (Regular::new(2, 0.0, 2.0).unwrap(),);
        let mut a = make_histogram(axes.clone());
        let mut b = make_histogram(axes);
        a.fill(&(0.5,)).unwrap();
        b.fill(&(0.5,)).unwrap();
        b.fill(&(1.5,)).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.values(), vec![0.0, 2.0, 1.0, 0.0]);

        a.reset();
        assert_eq!(a.sum(), 0.0);

        let other = make_histogram((Regular::new(3, 0.0, 2.0).unwrap(),));
        assert!(a.merge(&other).is_err());
    }
}
