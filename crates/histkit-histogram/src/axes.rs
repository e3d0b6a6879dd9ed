//! Ordered, heterogeneous axis lists
//!
//! A histogram is built over a tuple of axes, `(A,)` up to
//! `(A, B, C, D, E, F)`, each element keeping its own static type. Cells
//! are laid out with the first axis varying fastest.

use std::fmt;

use histkit_core::Result;

use crate::axis::Axis;

/// Shape of a single axis as seen by the storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLayout {
    pub extent: usize,
    pub underflow: bool,
    pub overflow: bool,
    pub growth: bool,
}

impl AxisLayout {
    pub fn of<A: Axis>(axis: &A) -> Self {
        let options = axis.options();
        Self {
            extent: axis.extent(),
            underflow: options.underflow(),
            overflow: options.overflow(),
            growth: options.growth(),
        }
    }
}

/// A tuple of axes describing every dimension of a histogram
pub trait Axes: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Tuple of coordinates, one per axis
    type Values;

    /// Number of axes
    const RANK: usize;

    /// Per-axis shape, in axis order
    fn layout(&self) -> Vec<AxisLayout>;

    /// Per-axis extents, in axis order
    fn extents(&self) -> Vec<usize> {
        self.layout().iter().map(|l| l.extent).collect()
    }

    /// Total number of cells (product of extents)
    fn size(&self) -> usize;

    /// Whether any axis carries the growth option
    fn can_grow(&self) -> bool;

    /// Linear cell index of a coordinate tuple, `None` when a coordinate has no bin
    fn linear_index(&self, values: &Self::Values) -> Option<usize>;

    /// Whether any axis would add bins for this coordinate tuple
    fn needs_growth(&self, values: &Self::Values) -> bool;

    /// Like [`linear_index`](Axes::linear_index), growing axes as needed
    ///
    /// Returns the linear index in the grown layout and the shift reported
    /// by every axis. On error some axes may already have grown; callers
    /// that need atomicity update a copy.
    fn update(&mut self, values: &Self::Values) -> Result<(Option<usize>, Vec<isize>)>;
}

macro_rules! impl_axes_tuple {
    ($rank:expr; $($name:ident $idx:tt),+) => {
        impl<$($name: Axis),+> Axes for ($($name,)+) {
            type Values = ($($name::Value,)+);

            const RANK: usize = $rank;

            fn layout(&self) -> Vec<AxisLayout> {
                vec![$(AxisLayout::of(&self.$idx)),+]
            }

            fn size(&self) -> usize {
                1 $(* self.$idx.extent())+
            }

            fn can_grow(&self) -> bool {
                false $(|| self.$idx.options().growth())+
            }

            #[inline]
            fn linear_index(&self, values: &Self::Values) -> Option<usize> {
                let mut linear = 0;
                let mut stride = 1;
                $(
                    let axis = &self.$idx;
                    linear += axis.offset(axis.index(&values.$idx))? * stride;
                    stride *= axis.extent();
                )+
                let _ = stride;
                Some(linear)
            }

            fn needs_growth(&self, values: &Self::Values) -> bool {
                false $(|| self.$idx.needs_growth(&values.$idx))+
            }

            fn update(&mut self, values: &Self::Values) -> Result<(Option<usize>, Vec<isize>)> {
                let mut linear = Some(0);
                let mut stride = 1;
                let mut shifts = Vec::with_capacity($rank);
                $(
                    let axis = &mut self.$idx;
                    let (index, shift) = axis.update(&values.$idx)?;
                    shifts.push(shift);
                    linear = linear.zip(axis.offset(index)).map(|(l, o)| l + o * stride);
                    stride *= axis.extent();
                )+
                let _ = stride;
                Ok((linear, shifts))
            }
        }
    };
}

impl_axes_tuple!(1; A 0);
impl_axes_tuple!(2; A 0, B 1);
impl_axes_tuple!(3; A 0, B 1, C 2);
impl_axes_tuple!(4; A 0, B 1, C 2, D 3);
impl_axes_tuple!(5; A 0, B 1, C 2, D 3, E 4);
impl_axes_tuple!(6; A 0, B 1, C 2, D 3, E 4, F 5);
