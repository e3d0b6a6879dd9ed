//! Lazy, typed actions over a DataFrame
//!
//! Actions are booked on a [`BookingFrame`] and nothing is read until the
//! frame runs. A run resolves the columns of every pending action, drives
//! each helper over all rows on a rayon pool and publishes the results to
//! the [`ResultHandle`]s returned at booking. Asking a handle for its value
//! runs the frame if needed, so many actions booked up front share one run.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use histkit_polars::{book_helper, ActionHelper, BookingFrame, Result};
//! use polars::prelude::*;
//!
//! /// Sums the product of two columns
//! #[derive(Default)]
//! struct DotProduct(AtomicU64);
//!
//! impl ActionHelper<(i64, i64)> for DotProduct {
//!     type Result = u64;
//!
//!     fn exec(&self, _slot: usize, (a, b): (i64, i64)) -> Result<()> {
//!         self.0.fetch_add((a * b) as u64, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn finalize(self) -> Result<u64> {
//!         Ok(self.0.into_inner())
//!     }
//! }
//!
//! let df = df!["a" => [1i64, 2, 3], "b" => [4i64, 5, 6]].unwrap();
//! let frame = BookingFrame::new(df);
//! let handle = book_helper::<(i64, i64), _>(&frame, DotProduct::default(), ["a", "b"]);
//!
//! assert!(!handle.is_ready());
//! assert_eq!(*handle.get().unwrap(), 32);
//! assert_eq!(frame.run_count(), 1);
//! ```
//!
//! One column name is required per column type; a mismatch does not compile:
//!
//! ```compile_fail
//! use histkit_polars::{book_helper, ActionHelper, BookingFrame, Result};
//! use polars::prelude::*;
//!
//! struct Noop;
//!
//! impl ActionHelper<(f64, i64)> for Noop {
//!     type Result = ();
//!     fn exec(&self, _slot: usize, _row: (f64, i64)) -> Result<()> {
//!         Ok(())
//!     }
//!     fn finalize(self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let frame = BookingFrame::new(df!["x" => [1.0f64]].unwrap());
//! let handle = book_helper::<(f64, i64), _>(&frame, Noop, ["x"]);
//! ```

use std::marker::PhantomData;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::columns::ColumnTypes;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::helper::ActionHelper;

/// A booked action with its concrete types erased
trait PendingAction: Send {
    fn label(&self) -> &str;

    fn run(
        self: Box<Self>,
        df: &DataFrame,
        pool: &rayon::ThreadPool,
        config: &EngineConfig,
    ) -> Result<()>;
}

type Published<T> = Arc<OnceLock<Result<T>>>;

struct Booked<C: ColumnTypes, H: ActionHelper<C>> {
    helper: H,
    names: Vec<String>,
    label: String,
    result: Published<H::Result>,
    _row: PhantomData<fn(C)>,
}

impl<C, H> PendingAction for Booked<C, H>
where
    C: ColumnTypes,
    H: ActionHelper<C>,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn run(
        self: Box<Self>,
        df: &DataFrame,
        pool: &rayon::ThreadPool,
        config: &EngineConfig,
    ) -> Result<()> {
        let Booked {
            helper,
            names,
            label,
            result,
            ..
        } = *self;
        let outcome = execute::<C, H>(helper, &names, df, pool, config);
        let failure = outcome
            .as_ref()
            .err()
            .map(|e| Error::Execution(format!("{label}: {e}")));
        if result.set(outcome).is_err() {
            return Err(Error::Execution(format!("{label}: result published twice")));
        }
        failure.map_or(Ok(()), Err)
    }
}

fn execute<C, H>(
    mut helper: H,
    names: &[String],
    df: &DataFrame,
    pool: &rayon::ThreadPool,
    config: &EngineConfig,
) -> Result<H::Result>
where
    C: ColumnTypes,
    H: ActionHelper<C>,
{
    let columns = C::resolve(df, names)?;
    helper.initialize(pool.current_num_threads());

    let helper_ref = &helper;
    let columns_ref = &columns;
    pool.install(|| {
        (0..df.height())
            .into_par_iter()
            .with_min_len(config.min_chunk_len)
            .try_for_each(|index| {
                let slot = rayon::current_thread_index().unwrap_or(0);
                helper_ref.exec(slot, C::row(columns_ref, index))
            })
    })?;

    helper.finalize()
}

struct FrameState {
    df: DataFrame,
    config: EngineConfig,
    pending: Mutex<Vec<Box<dyn PendingAction>>>,
    // Serialises runs; `pending` is only locked briefly to book or take actions.
    running: Mutex<()>,
    runs: AtomicUsize,
}

impl FrameState {
    #[instrument(skip_all, fields(rows = self.df.height(), threads = self.config.n_threads))]
    fn run(&self) -> Result<()> {
        let _running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        let actions = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            mem::take(&mut *pending)
        };
        if actions.is_empty() {
            return Ok(());
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.n_threads)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                // Keep the actions for a later attempt
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                let booked_meanwhile = mem::replace(&mut *pending, actions);
                pending.extend(booked_meanwhile);
                return Err(Error::Execution(format!("Failed to create thread pool: {e}")));
            }
        };

        debug!("Starting event loop with {} actions", actions.len());

        let mut first_error = None;
        for action in actions {
            let label = action.label().to_string();
            match action.run(&self.df, &pool, &self.config) {
                Ok(()) => debug!("Action {} finished", label),
                Err(e) => {
                    debug!("Action {} failed: {}", label, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        self.runs.fetch_add(1, Ordering::Relaxed);
        debug!("Event loop finished");
        first_error.map_or(Ok(()), Err)
    }
}

/// A DataFrame with actions booked against it
pub struct BookingFrame {
    state: Arc<FrameState>,
}

impl BookingFrame {
    /// Wrap a DataFrame using the default engine configuration
    pub fn new(df: DataFrame) -> Self {
        Self::from_parts(df, EngineConfig::default())
    }

    /// Wrap a DataFrame using an explicit engine configuration
    pub fn with_config(df: DataFrame, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(df, config))
    }

    /// Collect a lazy query and wrap the result
    #[cfg(feature = "lazy")]
    pub fn from_lazy(lf: polars::prelude::LazyFrame, config: EngineConfig) -> Result<Self> {
        Self::with_config(lf.collect()?, config)
    }

    fn from_parts(df: DataFrame, config: EngineConfig) -> Self {
        Self {
            state: Arc::new(FrameState {
                df,
                config,
                pending: Mutex::new(Vec::new()),
                running: Mutex::new(()),
                runs: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    /// Number of rows every action iterates over
    pub fn height(&self) -> usize {
        self.state.df.height()
    }

    /// Number of actions waiting for the next run
    pub fn pending(&self) -> usize {
        self.state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of runs that executed at least one action
    pub fn run_count(&self) -> usize {
        self.state.runs.load(Ordering::Relaxed)
    }

    /// Book `helper` over the columns `names`, read as the types `C`
    ///
    /// Nothing is checked or read until the frame runs.
    pub fn book<C, H>(&self, helper: H, names: C::Names<'_>) -> ResultHandle<H::Result>
    where
        C: ColumnTypes,
        H: ActionHelper<C>,
    {
        let names: Vec<String> = names.as_ref().iter().map(|s| s.to_string()).collect();
        let label = helper.name();
        debug!("Booked {} over columns {:?}", label, names);

        let result: Published<H::Result> = Arc::new(OnceLock::new());
        let booked = Booked::<C, H> {
            helper,
            names,
            label: label.clone(),
            result: Arc::clone(&result),
            _row: PhantomData,
        };
        self.state
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(booked));

        ResultHandle {
            frame: Arc::clone(&self.state),
            result,
            label,
        }
    }

    /// Execute every pending action
    ///
    /// All actions run even if one fails; the first failure is returned.
    /// Concurrent calls wait for the run in progress. Actions booked while a
    /// run is in progress are left for the next one.
    pub fn run(&self) -> Result<()> {
        self.state.run()
    }
}

/// Book `helper` on `frame` over the columns `colnames`, read as the types `C`
pub fn book_helper<C, H>(
    frame: &BookingFrame,
    helper: H,
    colnames: C::Names<'_>,
) -> ResultHandle<H::Result>
where
    C: ColumnTypes,
    H: ActionHelper<C>,
{
    frame.book::<C, H>(helper, colnames)
}

/// Deferred result of a booked action
pub struct ResultHandle<T> {
    frame: Arc<FrameState>,
    result: Published<T>,
    label: String,
}

impl<T> ResultHandle<T> {
    /// Whether the action has run
    pub fn is_ready(&self) -> bool {
        self.result.get().is_some()
    }

    /// The result, running the frame first if the action is still pending
    ///
    /// Blocks while another thread runs the frame. Must not be called from
    /// a helper's `exec` on the same frame: the run in progress would wait
    /// for itself.
    pub fn get(&self) -> Result<&T> {
        if !self.is_ready() {
            if let Err(e) = self.frame.run() {
                if !self.is_ready() {
                    return Err(e);
                }
            }
        }
        self.try_get()
    }

    /// The result, without running the frame
    pub fn try_get(&self) -> Result<&T> {
        match self.result.get() {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(Error::Execution(format!("{}: {e}", self.label))),
            None => Err(Error::NotExecuted(self.label.clone())),
        }
    }
}
