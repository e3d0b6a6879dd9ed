//! Cell storage strategies
//!
//! A histogram keeps its cells in a [`Storage`]. Two strategies exist:
//!
//! - [`DenseStorage`] owns a `Vec` of cells and can be re-laid out when a
//!   growing axis adds bins.
//! - [`AdoptedStorage`] borrows cells that live in memory owned by someone
//!   else. It never allocates, copies or frees, and therefore cannot grow.
//!
//! The aliases [`DefaultStorage`], [`AtomicStorage`], [`WeightedStorage`] and
//! [`AtomicWeightedStorage`] name the four accumulator flavours.

use std::fmt;
use std::mem;

use bytemuck::{Pod, PodCastError};
use histkit_core::{
    AtomicCount, AtomicWeightedSum, Error, Result, StandardLayout, WeightedSum,
};
use tracing::trace;

use crate::axes::AxisLayout;

/// Backing store of histogram cells
pub trait Storage {
    /// Accumulator cell type
    type Cell;

    /// All cells, in linear index order
    fn cells(&self) -> &[Self::Cell];

    /// All cells, mutably
    fn cells_mut(&mut self) -> &mut [Self::Cell];

    /// Number of cells
    fn len(&self) -> usize {
        self.cells().len()
    }

    /// Whether the storage holds no cells
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every cell to its position in a grown axis layout
    fn regrow(&mut self, plan: &Regrow) -> Result<()>;
}

/// Plain counts
pub type DefaultStorage = DenseStorage<f64>;
/// Counts that may be filled from several threads
pub type AtomicStorage = DenseStorage<AtomicCount>;
/// Weighted sums with variance
pub type WeightedStorage = DenseStorage<WeightedSum>;
/// Weighted sums with variance that may be filled from several threads
pub type AtomicWeightedStorage = DenseStorage<AtomicWeightedSum>;

/// Re-layout instructions produced when axes grow
#[derive(Debug, Clone)]
pub struct Regrow {
    before: Vec<AxisLayout>,
    after: Vec<AxisLayout>,
    shifts: Vec<isize>,
}

impl Regrow {
    pub fn new(before: Vec<AxisLayout>, after: Vec<AxisLayout>, shifts: Vec<isize>) -> Self {
        debug_assert_eq!(before.len(), after.len());
        debug_assert_eq!(before.len(), shifts.len());
        Self {
            before,
            after,
            shifts,
        }
    }

    /// Number of cells before growing
    pub fn old_size(&self) -> usize {
        self.before.iter().map(|l| l.extent).product()
    }

    /// Number of cells after growing
    pub fn new_size(&self) -> usize {
        self.after.iter().map(|l| l.extent).product()
    }

    /// New linear index of the cell at `old` linear index
    ///
    /// Flow bins stay at the ends of their axis; inner bins move up by the
    /// number of bins inserted below them.
    pub fn map(&self, old: usize) -> usize {
        let mut rest = old;
        let mut linear = 0;
        let mut stride = 1;
        for ((before, after), &shift) in self.before.iter().zip(&self.after).zip(&self.shifts) {
            let offset = rest % before.extent;
            rest /= before.extent;
            let mapped = if before.underflow && offset == 0 {
                0
            } else if before.overflow && offset == before.extent - 1 {
                after.extent - 1
            } else {
                offset + shift.max(0) as usize
            };
            linear += mapped * stride;
            stride *= after.extent;
        }
        linear
    }
}

/// Cells owned in a contiguous `Vec`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseStorage<T> {
    cells: Vec<T>,
}

impl<T: Default> DenseStorage<T> {
    /// Storage of `size` empty cells
    pub fn new(size: usize) -> Self {
        Self {
            cells: (0..size).map(|_| T::default()).collect(),
        }
    }
}

impl<T> DenseStorage<T> {
    /// Take ownership of existing cells
    pub fn from_vec(cells: Vec<T>) -> Self {
        Self { cells }
    }

    /// Release the cells
    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T> Default for DenseStorage<T> {
    fn default() -> Self {
        Self { cells: Vec::new() }
    }
}

impl<T: Default> Storage for DenseStorage<T> {
    type Cell = T;

    #[inline]
    fn cells(&self) -> &[T] {
        &self.cells
    }

    #[inline]
    fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    fn regrow(&mut self, plan: &Regrow) -> Result<()> {
        if self.cells.len() != plan.old_size() {
            return Err(Error::storage_size(plan.old_size(), self.cells.len()));
        }
        let old = mem::take(&mut self.cells);
        let mut cells: Vec<T> = (0..plan.new_size()).map(|_| T::default()).collect();
        for (index, cell) in old.into_iter().enumerate() {
            cells[plan.map(index)] = cell;
        }
        trace!(
            old_size = plan.old_size(),
            new_size = plan.new_size(),
            "regrew dense storage"
        );
        self.cells = cells;
        Ok(())
    }
}

/// Cells living in memory the histogram does not own
///
/// The lifetime `'a` ties the histogram to the buffer: the owner cannot
/// touch, move or free the memory while the adopted storage exists.
pub struct AdoptedStorage<'a, T: StandardLayout> {
    cells: &'a mut [T],
}

impl<'a, T: StandardLayout> AdoptedStorage<'a, T> {
    /// Adopt an existing slice of cells
    pub fn from_slice(cells: &'a mut [T]) -> Self {
        Self { cells }
    }

    /// Adopt a byte buffer, checking alignment and length
    pub fn from_bytes(bytes: &'a mut [u8]) -> Result<Self> {
        let cell_size = mem::size_of::<T>();
        let align = mem::align_of::<T>();
        if cell_size == 0 {
            return Err(Error::InvalidParameter(
                "cannot adopt zero-sized cells".to_string(),
            ));
        }
        let address = bytes.as_ptr() as usize;
        if address % align != 0 {
            return Err(Error::Misaligned { address, align });
        }
        if bytes.len() % cell_size != 0 {
            return Err(Error::BufferLength {
                len: bytes.len(),
                cell_size,
            });
        }
        let len = bytes.len() / cell_size;
        // SAFETY: the region is exclusively borrowed for 'a, aligned for T and
        // exactly `len` cells long; StandardLayout makes every bit pattern a
        // valid T.
        Ok(unsafe { Self::from_raw_parts(bytes.as_mut_ptr(), len) })
    }

    /// Adopt `len` cells starting at `data`
    ///
    /// No ownership is taken and nothing is copied or released.
    ///
    /// # Safety
    ///
    /// - `data` must be non-null and aligned for `T`;
    /// - `data` must point to at least `len * size_of::<T>()` bytes that stay
    ///   valid, and are accessed only through the returned storage, for `'a`.
    ///
    /// Null and misaligned pointers are caught by debug assertions; the
    /// extent of the allocation cannot be checked.
    pub unsafe fn from_raw_parts(data: *mut u8, len: usize) -> Self {
        debug_assert!(!data.is_null(), "adopted buffer is null");
        debug_assert!(
            data as usize % mem::align_of::<T>() == 0,
            "adopted buffer is not aligned for the cell type"
        );
        // SAFETY: upheld by the caller as documented above.
        let cells = unsafe { std::slice::from_raw_parts_mut(data.cast::<T>(), len) };
        Self { cells }
    }

    /// Give the borrowed cells back
    pub fn into_inner(self) -> &'a mut [T] {
        self.cells
    }
}

impl<'a, T: StandardLayout + Pod> AdoptedStorage<'a, T> {
    /// Adopt a byte buffer of plain-old-data cells through `bytemuck`
    pub fn from_pod_bytes(bytes: &'a mut [u8]) -> Result<Self> {
        let address = bytes.as_ptr() as usize;
        let len = bytes.len();
        bytemuck::try_cast_slice_mut::<u8, T>(bytes)
            .map(Self::from_slice)
            .map_err(|e| match e {
                PodCastError::TargetAlignmentGreaterAndInputNotAligned => Error::Misaligned {
                    address,
                    align: mem::align_of::<T>(),
                },
                PodCastError::OutputSliceWouldHaveSlop => Error::BufferLength {
                    len,
                    cell_size: mem::size_of::<T>(),
                },
                other => Error::InvalidParameter(format!("cannot adopt buffer: {other:?}")),
            })
    }
}

impl<'a, T: StandardLayout> Storage for AdoptedStorage<'a, T> {
    type Cell = T;

    #[inline]
    fn cells(&self) -> &[T] {
        &*self.cells
    }

    #[inline]
    fn cells_mut(&mut self) -> &mut [T] {
        &mut *self.cells
    }

    fn regrow(&mut self, _plan: &Regrow) -> Result<()> {
        Err(Error::growth_unsupported("adopted storage"))
    }
}

impl<'a, T: StandardLayout> fmt::Debug for AdoptedStorage<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdoptedStorage")
            .field("address", &self.cells.as_ptr())
            .field("len", &self.cells.len())
            .finish()
    }
}
