//! Common test utilities for histkit-polars tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use histkit_polars::{ActionHelper, ColumnTypes, Result};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reproducible event-like DataFrame with `n` rows
///
/// Columns: `pt` (f64), `eta` (f32), `charge` (i32), `run` (u32),
/// `weight` (f64), `tight` (bool), `flavour` (str)
pub fn create_events_df(n: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let pt: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..120.0)).collect();
    let eta: Vec<f32> = (0..n).map(|_| rng.gen_range(-3.0..3.0)).collect();
    let charge: Vec<i32> = (0..n).map(|_| if rng.gen_bool(0.5) { 1 } else { -1 }).collect();
    let run: Vec<u32> = (0..n).map(|_| rng.gen_range(1..4)).collect();
    let weight: Vec<f64> = (0..n).map(|_| rng.gen_range(0.5..1.5)).collect();
    let tight: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.3)).collect();
    let flavour: Vec<&str> = (0..n)
        .map(|_| ["e", "mu", "tau"][rng.gen_range(0..3)])
        .collect();
    df![
        "pt" => pt,
        "eta" => eta,
        "charge" => charge,
        "run" => run,
        "weight" => weight,
        "tight" => tight,
        "flavour" => flavour,
    ]
    .unwrap()
}

/// Helper that counts rows and how often each lifecycle hook ran
#[derive(Default)]
pub struct RowCounter {
    pub rows: AtomicUsize,
    pub slots: usize,
    pub execs_seen: Arc<AtomicUsize>,
}

impl RowCounter {
    pub fn with_exec_counter(counter: Arc<AtomicUsize>) -> Self {
        Self {
            execs_seen: counter,
            ..Self::default()
        }
    }
}

impl<C: ColumnTypes> ActionHelper<C> for RowCounter {
    type Result = (usize, usize);

    fn name(&self) -> String {
        "RowCounter".to_string()
    }

    fn initialize(&mut self, n_slots: usize) {
        self.slots = n_slots;
    }

    fn exec(&self, slot: usize, _row: C) -> Result<()> {
        assert!(slot < self.slots);
        self.rows.fetch_add(1, Ordering::Relaxed);
        self.execs_seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn finalize(self) -> Result<(usize, usize)> {
        Ok((self.rows.into_inner(), self.slots))
    }
}
