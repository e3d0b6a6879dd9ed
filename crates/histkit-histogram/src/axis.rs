//! Axis descriptors
//!
//! An axis maps a coordinate to a bin index. Inner bins are numbered
//! `0..size`; `-1` denotes the underflow bin and `size` the overflow bin.
//! Whether those two flow bins actually exist is decided by the axis
//! options, and [`Axis::offset`] turns an index into a position inside the
//! axis extent (or `None` when the coordinate has nowhere to go).

use std::fmt;

use histkit_core::{AxisOptions, Error, Result};

/// One dimension of a histogram
pub trait Axis: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Coordinate type accepted by this axis
    type Value;

    /// Boundary options of this axis
    fn options(&self) -> AxisOptions;

    /// Number of inner bins
    fn size(&self) -> usize;

    /// Number of inner bins plus flow bins
    fn extent(&self) -> usize {
        self.size() + self.options().flow_bins()
    }

    /// Bin index of a coordinate, in `-1..=size`
    fn index(&self, value: &Self::Value) -> isize;

    /// Whether [`update`](Axis::update) would add bins for this coordinate
    fn needs_growth(&self, _value: &Self::Value) -> bool {
        false
    }

    /// Bin index of a coordinate, growing the axis first if it has the growth option
    ///
    /// Returns `(index, shift)`. A positive shift is the number of bins added
    /// below the former first bin, a negative shift the number of bins
    /// appended above the former last bin. Growth past [`MAX_GROWTH_BINS`]
    /// fails and leaves the axis unchanged.
    fn update(&mut self, value: &Self::Value) -> Result<(isize, isize)> {
        Ok((self.index(value), 0))
    }

    /// Position of a bin index inside the axis extent
    fn offset(&self, index: isize) -> Option<usize> {
        let options = self.options();
        let size = self.size();
        let underflow = options.underflow() as usize;
        if index < 0 {
            (index == -1 && options.underflow()).then_some(0)
        } else if index as usize >= size {
            options.overflow().then_some(size + underflow)
        } else {
            Some(index as usize + underflow)
        }
    }
}

/// Largest number of inner bins a growing axis may reach
pub const MAX_GROWTH_BINS: usize = 1 << 24;

/// Inner bin count after adding `added` bins, if it stays within the limit
fn grown_size(kind: &str, size: usize, added: u128) -> Result<usize> {
    let total = size as u128 + added;
    if total > MAX_GROWTH_BINS as u128 {
        return Err(Error::GrowthUnsupported(format!(
            "{kind} axis would grow to {total} bins, more than the limit of {MAX_GROWTH_BINS}"
        )));
    }
    Ok(total as usize)
}

fn option_name(options: AxisOptions) -> String {
    options
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_options(kind: &str, options: AxisOptions, supported: AxisOptions) -> Result<()> {
    let unsupported = options.difference(supported);
    if !unsupported.is_empty() {
        return Err(Error::unsupported_option(kind, &option_name(unsupported)));
    }
    if options.circular() && options.growth() {
        return Err(Error::InvalidAxis(format!(
            "{kind} axis cannot be both circular and growing"
        )));
    }
    if options.circular() && options.underflow() {
        return Err(Error::InvalidAxis(format!(
            "circular {kind} axis cannot have an underflow bin"
        )));
    }
    Ok(())
}

/// Equal-width bins over `[min, max)`
#[derive(Debug, Clone, PartialEq)]
pub struct Regular {
    bins: usize,
    min: f64,
    width: f64,
    options: AxisOptions,
}

impl Regular {
    /// Create an axis with underflow and overflow bins
    pub fn new(bins: usize, min: f64, max: f64) -> Result<Self> {
        Self::with_options(bins, min, max, AxisOptions::DEFAULT)
    }

    /// Create an axis with explicit options
    pub fn with_options(bins: usize, min: f64, max: f64, options: AxisOptions) -> Result<Self> {
        validate_options("regular", options, AxisOptions::all())?;
        if bins == 0 {
            return Err(Error::InvalidAxis(
                "regular axis needs at least one bin".to_string(),
            ));
        }
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(Error::InvalidAxis(format!(
                "regular axis range [{min}, {max}) is empty or not finite"
            )));
        }
        Ok(Self {
            bins,
            min,
            width: (max - min) / bins as f64,
            options,
        })
    }

    /// Lower edge of the first inner bin
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the last inner bin
    pub fn max(&self) -> f64 {
        self.edge(self.bins as isize)
    }

    /// Width of every bin
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Lower edge of bin `index`
    pub fn edge(&self, index: isize) -> f64 {
        self.min + self.width * index as f64
    }

    /// `[lower, upper)` edges of bin `index`
    pub fn bin(&self, index: isize) -> (f64, f64) {
        (self.edge(index), self.edge(index + 1))
    }
}

impl Axis for Regular {
    type Value = f64;

    fn options(&self) -> AxisOptions {
        self.options
    }

    fn size(&self) -> usize {
        self.bins
    }

    fn index(&self, value: &f64) -> isize {
        let mut z = (value - self.min) / (self.width * self.bins as f64);
        if self.options.circular() {
            z -= z.floor();
        }
        // NaN fails both comparisons and lands in overflow.
        if z < 1.0 {
            if z >= 0.0 {
                ((z * self.bins as f64) as usize).min(self.bins - 1) as isize
            } else {
                -1
            }
        } else {
            self.bins as isize
        }
    }

    fn needs_growth(&self, value: &f64) -> bool {
        if !self.options.growth() || !value.is_finite() {
            return false;
        }
        let index = self.index(value);
        index < 0 || index >= self.bins as isize
    }

    fn update(&mut self, value: &f64) -> Result<(isize, isize)> {
        let index = self.index(value);
        if !self.needs_growth(value) {
            return Ok((index, 0));
        }
        // Bin counts are compared as floats first; huge coordinates exceed the limit there.
        let limit = MAX_GROWTH_BINS as f64;
        if index < 0 {
            let needed = ((self.min - value) / self.width).ceil().max(1.0);
            if !(needed <= limit) {
                return Err(Error::GrowthUnsupported(format!(
                    "regular axis cannot grow below {} to cover {value}",
                    self.min
                )));
            }
            let added = needed as usize;
            let bins = grown_size("regular", self.bins, added as u128)?;
            self.min -= self.width * added as f64;
            self.bins = bins;
            let index = self.index(value).clamp(0, self.bins as isize - 1);
            Ok((index, added as isize))
        } else {
            let needed = ((value - self.max()) / self.width).floor() + 1.0;
            if !(needed <= limit) {
                return Err(Error::GrowthUnsupported(format!(
                    "regular axis cannot grow above {} to cover {value}",
                    self.max()
                )));
            }
            let added = (needed as usize).max(1);
            self.bins = grown_size("regular", self.bins, added as u128)?;
            let index = self.index(value).clamp(0, self.bins as isize - 1);
            Ok((index, -(added as isize)))
        }
    }
}

/// One bin per integer in `[start, stop)`
#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    min: i64,
    size: usize,
    options: AxisOptions,
}

impl Integer {
    /// Create an axis with underflow and overflow bins
    pub fn new(start: i64, stop: i64) -> Result<Self> {
        Self::with_options(start, stop, AxisOptions::DEFAULT)
    }

    /// Create an axis with explicit options
    pub fn with_options(start: i64, stop: i64, options: AxisOptions) -> Result<Self> {
        validate_options("integer", options, AxisOptions::all())?;
        if stop <= start {
            return Err(Error::InvalidAxis(format!(
                "integer axis range [{start}, {stop}) is empty"
            )));
        }
        Ok(Self {
            min: start,
            size: (i128::from(stop) - i128::from(start)) as usize,
            options,
        })
    }

    /// Value of bin `index`
    pub fn value(&self, index: isize) -> i64 {
        self.min + index as i64
    }

    fn shifted(&self, value: i64) -> i128 {
        let z = i128::from(value) - i128::from(self.min);
        if self.options.circular() {
            z.rem_euclid(self.size as i128)
        } else {
            z
        }
    }
}

impl Axis for Integer {
    type Value = i64;

    fn options(&self) -> AxisOptions {
        self.options
    }

    fn size(&self) -> usize {
        self.size
    }

    fn index(&self, value: &i64) -> isize {
        let z = self.shifted(*value);
        if z < 0 {
            -1
        } else if z >= self.size as i128 {
            self.size as isize
        } else {
            z as isize
        }
    }

    fn needs_growth(&self, value: &i64) -> bool {
        let z = self.shifted(*value);
        self.options.growth() && (z < 0 || z >= self.size as i128)
    }

    fn update(&mut self, value: &i64) -> Result<(isize, isize)> {
        let index = self.index(value);
        if !self.needs_growth(value) {
            return Ok((index, 0));
        }
        let z = self.shifted(*value);
        if z < 0 {
            let added = z.unsigned_abs();
            self.size = grown_size("integer", self.size, added)?;
            self.min = *value;
            Ok((0, added as isize))
        } else {
            let added = (z - self.size as i128).unsigned_abs() + 1;
            self.size = grown_size("integer", self.size, added)?;
            Ok((self.size as isize - 1, -(added as isize)))
        }
    }
}

/// Bins delimited by strictly increasing edges
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    edges: Vec<f64>,
    options: AxisOptions,
}

impl Variable {
    /// Create an axis with underflow and overflow bins
    pub fn new(edges: impl Into<Vec<f64>>) -> Result<Self> {
        Self::with_options(edges, AxisOptions::DEFAULT)
    }

    /// Create an axis with explicit options; growth is not supported
    pub fn with_options(edges: impl Into<Vec<f64>>, options: AxisOptions) -> Result<Self> {
        validate_options(
            "variable",
            options,
            AxisOptions::UNDERFLOW | AxisOptions::OVERFLOW | AxisOptions::CIRCULAR,
        )?;
        let edges = edges.into();
        if edges.len() < 2 {
            return Err(Error::InvalidAxis(
                "variable axis needs at least two edges".to_string(),
            ));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidAxis(
                "variable axis edges must be finite and strictly increasing".to_string(),
            ));
        }
        Ok(Self { edges, options })
    }

    /// All bin edges
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }
}

impl Axis for Variable {
    type Value = f64;

    fn options(&self) -> AxisOptions {
        self.options
    }

    fn size(&self) -> usize {
        self.edges.len() - 1
    }

    fn index(&self, value: &f64) -> isize {
        let lo = self.edges[0];
        let hi = self.edges[self.edges.len() - 1];
        let mut x = *value;
        if self.options.circular() {
            let span = hi - lo;
            x -= span * ((x - lo) / span).floor();
        }
        if x.is_nan() || x >= hi {
            self.size() as isize
        } else if x < lo {
            -1
        } else {
            self.edges.partition_point(|e| *e <= x) as isize - 1
        }
    }
}

/// One bin per listed value
#[derive(Debug, Clone, PartialEq)]
pub struct Category<T> {
    values: Vec<T>,
    options: AxisOptions,
}

impl<T> Category<T>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync,
{
    /// Create an axis with an overflow bin for unlisted values
    pub fn new(values: impl Into<Vec<T>>) -> Result<Self> {
        Self::with_options(values, AxisOptions::OVERFLOW)
    }

    /// Create an axis with explicit options; only overflow and growth are supported
    pub fn with_options(values: impl Into<Vec<T>>, options: AxisOptions) -> Result<Self> {
        validate_options(
            "category",
            options,
            AxisOptions::OVERFLOW | AxisOptions::GROWTH,
        )?;
        let values = values.into();
        if values.is_empty() && !options.growth() {
            return Err(Error::InvalidAxis(
                "category axis needs at least one value unless it can grow".to_string(),
            ));
        }
        Ok(Self { values, options })
    }

    /// Listed values, in bin order
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> Axis for Category<T>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync,
{
    type Value = T;

    fn options(&self) -> AxisOptions {
        self.options
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn index(&self, value: &T) -> isize {
        self.values
            .iter()
            .position(|v| v == value)
            .unwrap_or(self.values.len()) as isize
    }

    fn needs_growth(&self, value: &T) -> bool {
        self.options.growth() && !self.values.contains(value)
    }

    fn update(&mut self, value: &T) -> Result<(isize, isize)> {
        let index = self.index(value);
        if !self.needs_growth(value) {
            return Ok((index, 0));
        }
        grown_size("category", self.values.len(), 1)?;
        self.values.push(value.clone());
        Ok((index, -1))
    }
}
