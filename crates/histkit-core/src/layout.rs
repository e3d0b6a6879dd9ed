//! Memory layout contracts for cell adoption
//!
//! A histogram may run on top of memory it does not own: a buffer handed
//! over by a caller, shared with another library, or carved out of a larger
//! allocation. Reading that memory as cells is only sound when the cell type
//! has a flat, predictable representation. [`StandardLayout`] is the marker
//! for such types and every adopting constructor requires it, so an
//! unsuitable cell type is rejected at compile time.

use std::marker::PhantomData;
use std::mem;

use crate::accumulators::{AtomicCount, AtomicWeightedSum, WeightedSum};

/// Cell types whose memory may be adopted from a foreign buffer
///
/// # Safety
///
/// Implementors must guarantee that the type
/// - is `#[repr(C)]` or `#[repr(transparent)]` (or a primitive),
/// - holds no pointers, references or other indirection,
/// - has no padding bytes,
/// - is valid for every bit pattern, including all zeroes,
/// - has no drop glue.
pub unsafe trait StandardLayout: Sized + Send + Sync + 'static {}

// SAFETY: primitive floats and integers satisfy every requirement.
unsafe impl StandardLayout for f64 {}
unsafe impl StandardLayout for f32 {}
unsafe impl StandardLayout for u64 {}
unsafe impl StandardLayout for u32 {}
unsafe impl StandardLayout for i64 {}
unsafe impl StandardLayout for i32 {}

// SAFETY: `#[repr(transparent)]` over `AtomicU64`, which has the layout of
// `u64` and accepts every bit pattern.
unsafe impl StandardLayout for AtomicCount {}

// SAFETY: `#[repr(C)]` pair of `f64`, no padding.
unsafe impl StandardLayout for WeightedSum {}

// SAFETY: `#[repr(C)]` pair of `AtomicCount`, no padding.
unsafe impl StandardLayout for AtomicWeightedSum {}

// Plain and atomic cells must stay interchangeable in memory.
const _: () = assert!(mem::size_of::<AtomicCount>() == mem::size_of::<f64>());
const _: () = assert!(mem::align_of::<AtomicCount>() >= mem::align_of::<f64>());
const _: () = assert!(mem::size_of::<WeightedSum>() == 2 * mem::size_of::<f64>());
const _: () = assert!(mem::size_of::<AtomicWeightedSum>() == mem::size_of::<WeightedSum>());
const _: () = assert!(mem::align_of::<AtomicWeightedSum>() >= mem::align_of::<WeightedSum>());

/// Compile-time size of `T` in bytes
pub struct SizeOf<T>(PhantomData<T>);

impl<T> SizeOf<T> {
    pub const VALUE: usize = mem::size_of::<T>();
}

/// Size of `T` in bytes
#[inline]
pub const fn size_of<T>() -> usize {
    mem::size_of::<T>()
}

/// Number of bytes a buffer needs to hold `cells` values of `T`
#[inline]
pub const fn buffer_bytes<T>(cells: usize) -> usize {
    cells * mem::size_of::<T>()
}
