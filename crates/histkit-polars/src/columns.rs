//! Typed access to DataFrame columns
//!
//! A booked action names its input columns and states their Rust types as a
//! tuple, e.g. `(f64, i64, String)`. Before the event loop starts, every
//! column is resolved once:
//!
//! - the column must exist,
//! - its dtype must be the requested one, or one that widens to it
//!   (`Int32 -> Int64`, any integer or `Float32 -> Float64`, ...),
//! - it must not contain nulls.
//!
//! Widening never changes a value. 64-bit integers read as `f64` are only
//! accepted when every value is exactly representable, which holds for all
//! magnitudes up to 2^53; anything that would be rounded is an error.

use polars::prelude::*;

use crate::error::{Error, Result};

/// A Rust type a column can be read as
pub trait ColumnValue: Clone + Send + Sync + 'static {
    /// Dtype the column ends up with after widening
    fn dtype() -> DataType;

    /// Whether a column of `dtype` may be read as this type
    fn accepts(dtype: &DataType) -> bool;

    /// Read every value of a column of an accepted dtype
    fn extract(column: &Column) -> Result<Vec<Self>>;
}

/// Cast `column` to `T`'s dtype if it is accepted, fail otherwise
fn widen<T: ColumnValue>(column: &Column) -> Result<Column> {
    let target = T::dtype();
    let dtype = column.dtype();
    if *dtype == target {
        Ok(column.clone())
    } else if T::accepts(dtype) {
        Ok(column.cast(&target)?)
    } else {
        Err(Error::TypeMismatch {
            column: column.name().to_string(),
            expected: target.to_string(),
            got: dtype.to_string(),
        })
    }
}

fn collect_non_null<I, T>(name: &str, values: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = Option<T>>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| Error::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Every integer of at most this magnitude is exactly representable as `f64`
const F64_EXACT_INTEGER: u64 = 1 << 53;

fn exact_in_f64(magnitude: u64) -> bool {
    // u64::MAX rounds to 2^64, which saturates back to u64::MAX on the way out.
    magnitude <= F64_EXACT_INTEGER
        || (magnitude != u64::MAX && (magnitude as f64) as u64 == magnitude)
}

/// Fail on the first value whose magnitude would be rounded by an `f64` cast
fn ensure_exact_in_f64<I>(name: &str, magnitudes: I) -> Result<()>
where
    I: IntoIterator<Item = Option<u64>>,
{
    match magnitudes
        .into_iter()
        .position(|m| m.is_some_and(|m| !exact_in_f64(m)))
    {
        Some(row) => Err(Error::LossyConversion {
            column: name.to_string(),
            row,
            target: DataType::Float64.to_string(),
        }),
        None => Ok(()),
    }
}

macro_rules! impl_column_value {
    ($ty:ty, $dtype:ident, $accessor:ident $(, $from:ident)*) => {
        impl ColumnValue for $ty {
            fn dtype() -> DataType {
                DataType::$dtype
            }

            fn accepts(dtype: &DataType) -> bool {
                matches!(dtype, DataType::$dtype $(| DataType::$from)*)
            }

            fn extract(column: &Column) -> Result<Vec<Self>> {
                let column = widen::<Self>(column)?;
                collect_non_null(column.name().as_str(), column.$accessor()?)
            }
        }
    };
}

impl_column_value!(f32, Float32, f32);
impl_column_value!(i64, Int64, i64, Int32, UInt32);
impl_column_value!(i32, Int32, i32);
impl_column_value!(u64, UInt64, u64, UInt32);
impl_column_value!(u32, UInt32, u32);
impl_column_value!(bool, Boolean, bool);

impl ColumnValue for f64 {
    fn dtype() -> DataType {
        DataType::Float64
    }

    fn accepts(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float64
                | DataType::Float32
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    fn extract(column: &Column) -> Result<Vec<Self>> {
        let name = column.name().as_str();
        match column.dtype() {
            DataType::Int64 => ensure_exact_in_f64(
                name,
                column.i64()?.into_iter().map(|v| v.map(i64::unsigned_abs)),
            )?,
            DataType::UInt64 => ensure_exact_in_f64(name, column.u64()?)?,
            _ => {}
        }
        let column = widen::<Self>(column)?;
        collect_non_null(column.name().as_str(), column.f64()?)
    }
}

impl ColumnValue for String {
    fn dtype() -> DataType {
        DataType::String
    }

    fn accepts(dtype: &DataType) -> bool {
        matches!(dtype, DataType::String)
    }

    fn extract(column: &Column) -> Result<Vec<Self>> {
        let column = widen::<Self>(column)?;
        let values = column.str()?.into_iter().map(|v| v.map(str::to_string));
        collect_non_null(column.name().as_str(), values)
    }
}

/// A tuple of [`ColumnValue`]s forming one row of input
pub trait ColumnTypes: Sized + Send + 'static {
    /// Number of columns
    const ARITY: usize;

    /// Column names, exactly one per tuple element
    type Names<'a>: AsRef<[&'a str]>;

    /// Resolved column data
    type Columns: Send + Sync;

    /// Look up, widen and null-check the named columns
    fn resolve(df: &DataFrame, names: &[String]) -> Result<Self::Columns>;

    /// Assemble row `index` from resolved columns
    fn row(columns: &Self::Columns, index: usize) -> Self;
}

fn lookup<'df>(df: &'df DataFrame, name: &str) -> Result<&'df Column> {
    df.column(name)
        .map_err(|_| Error::InvalidColumn(name.to_string()))
}

macro_rules! impl_column_types {
    ($arity:expr; $($name:ident $idx:tt),+) => {
        impl<$($name: ColumnValue),+> ColumnTypes for ($($name,)+) {
            const ARITY: usize = $arity;

            type Names<'a> = [&'a str; $arity];

            type Columns = ($(Vec<$name>,)+);

            fn resolve(df: &DataFrame, names: &[String]) -> Result<Self::Columns> {
                if names.len() != $arity {
                    return Err(Error::InvalidParameter(format!(
                        "expected {} column names, got {}",
                        $arity,
                        names.len()
                    )));
                }
                Ok(($($name::extract(lookup(df, &names[$idx])?)?,)+))
            }

            #[inline]
            fn row(columns: &Self::Columns, index: usize) -> Self {
                ($(columns.$idx[index].clone(),)+)
            }
        }
    };
}

impl_column_types!(1; A 0);
impl_column_types!(2; A 0, B 1);
impl_column_types!(3; A 0, B 1, C 2);
impl_column_types!(4; A 0, B 1, C 2, D 3);
impl_column_types!(5; A 0, B 1, C 2, D 3, E 4);
impl_column_types!(6; A 0, B 1, C 2, D 3, E 4, F 5);
