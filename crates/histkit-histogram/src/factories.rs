//! Histogram construction
//!
//! One entry point per accumulator flavour, each taking the axes as a tuple.
//! The rank and cell layout of the result follow the axes in the order given.
//!
//! | Function | Cell | Fill through |
//! |----------|------|--------------|
//! | [`make_histogram`] | `f64` | `&mut self` |
//! | [`make_atomic_histogram`] | [`AtomicCount`] | `&self` |
//! | [`make_histogram_with_error`] | [`WeightedSum`] | `&mut self` |
//! | [`make_atomic_histogram_with_error`] | [`AtomicWeightedSum`] | `&self` |
//! | [`make_histogram_adopted`] | any [`StandardLayout`] cell | depends on cell |
//! | [`make_atomic_histogram_with_error_adopted`] | [`AtomicWeightedSum`] in raw memory | `&self` |
//!
//! # Example
//!
//! ```rust
//! use histkit_histogram::{make_atomic_histogram_with_error, Integer, Regular};
//!
//! let hist = make_atomic_histogram_with_error((
//!     Regular::new(10, 0.0, 1.0).unwrap(),
//!     Integer::new(0, 4).unwrap(),
//! ));
//! assert_eq!(hist.rank(), 2);
//! assert_eq!(hist.size(), 12 * 6);
//!
//! hist.fill_weighted_shared(&(0.25, 2), 0.5);
//! assert_eq!(hist.sum(), 0.5);
//! ```
//!
//! Adoption only accepts cells with a standard memory layout:
//!
//! ```compile_fail
//! use histkit_histogram::{make_histogram_adopted, DenseStorage, Integer};
//!
//! let storage = DenseStorage::<String>::new(4);
//! let hist = make_histogram_adopted(storage, (Integer::new(0, 2).unwrap(),));
//! ```

use histkit_core::{
    AtomicCount, AtomicWeightedSum, Error, Result, StandardLayout, WeightedSum,
};
use tracing::debug;

use crate::axes::Axes;
use crate::histogram::Histogram;
use crate::storage::{
    AdoptedStorage, AtomicStorage, AtomicWeightedStorage, DefaultStorage, DenseStorage, Storage,
    WeightedStorage,
};

/// Histogram of plain `f64` counts
pub fn make_histogram<A: Axes>(axes: A) -> Histogram<A, DefaultStorage> {
    make_histogram_with(DenseStorage::default(), axes)
}

/// Histogram of counts that may be filled concurrently through `&self`
pub fn make_atomic_histogram<A: Axes>(axes: A) -> Histogram<A, AtomicStorage> {
    make_histogram_with(DenseStorage::<AtomicCount>::default(), axes)
}

/// Histogram of weighted sums, tracking the variance of every cell
pub fn make_histogram_with_error<A: Axes>(axes: A) -> Histogram<A, WeightedStorage> {
    make_histogram_with(DenseStorage::<WeightedSum>::default(), axes)
}

/// Histogram of weighted sums that may be filled concurrently through `&self`
pub fn make_atomic_histogram_with_error<A: Axes>(axes: A) -> Histogram<A, AtomicWeightedStorage> {
    make_histogram_with(DenseStorage::<AtomicWeightedSum>::default(), axes)
}

/// Histogram over a dense storage of any default-constructible cell
///
/// Whatever `storage` held is discarded; it is resized to the axes and
/// every cell starts from `T::default()`.
pub fn make_histogram_with<A: Axes, T: Default>(
    storage: DenseStorage<T>,
    axes: A,
) -> Histogram<A, DenseStorage<T>> {
    let mut cells = storage.into_vec();
    cells.clear();
    cells.resize_with(axes.size(), T::default);
    Histogram::from_parts(axes, DenseStorage::from_vec(cells))
}

/// Histogram over storage that already exists, keeping its contents
///
/// The storage must hold exactly as many cells as the axes describe, and no
/// axis may grow since adopted memory cannot be re-laid out.
pub fn make_histogram_adopted<A, S>(storage: S, axes: A) -> Result<Histogram<A, S>>
where
    A: Axes,
    S: Storage,
    S::Cell: StandardLayout,
{
    if storage.len() != axes.size() {
        return Err(Error::storage_size(axes.size(), storage.len()));
    }
    if axes.can_grow() {
        return Err(Error::growth_unsupported("adopted storage"));
    }
    debug!(
        rank = A::RANK,
        cells = storage.len(),
        "adopted histogram storage"
    );
    Ok(Histogram::from_parts(axes, storage))
}

/// Atomic weighted-sum histogram living in caller-owned raw memory
///
/// `size` is the number of [`AtomicWeightedSum`] cells at `rawdata`. The
/// buffer contents are kept as they are and fills write straight into it.
/// Nothing is allocated, copied or released.
///
/// # Safety
///
/// `rawdata` must be non-null, aligned for [`AtomicWeightedSum`], and point
/// to `size` cells' worth of memory (see
/// [`buffer_bytes`](histkit_core::buffer_bytes)) that stays valid and is
/// not accessed by anything else for `'a`.
///
/// # Errors
///
/// [`Error::StorageSize`] when `size` differs from the axes' cell count and
/// [`Error::GrowthUnsupported`] when an axis can grow.
pub unsafe fn make_atomic_histogram_with_error_adopted<'a, A: Axes>(
    rawdata: *mut u8,
    size: usize,
    axes: A,
) -> Result<Histogram<A, AdoptedStorage<'a, AtomicWeightedSum>>> {
    debug!(address = ?rawdata, size, "adopting raw atomic weighted-sum buffer");
    // SAFETY: forwarded to the caller.
    let storage = unsafe { AdoptedStorage::from_raw_parts(rawdata, size) };
    make_histogram_adopted(storage, axes)
}
