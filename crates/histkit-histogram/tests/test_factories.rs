//! Tests for the construction entry points

mod common;

use common::{mixed_axes, random_points, variable_axis, MIXED_SIZE};
use histkit_histogram::prelude::*;

#[test]
fn test_rank_and_size_for_every_entry_point() {
    assert_eq!(make_histogram(mixed_axes()).rank(), 3);
    assert_eq!(make_histogram(mixed_axes()).size(), MIXED_SIZE);
    assert_eq!(make_atomic_histogram(mixed_axes()).size(), MIXED_SIZE);
    assert_eq!(make_histogram_with_error(mixed_axes()).size(), MIXED_SIZE);
    assert_eq!(make_atomic_histogram_with_error(mixed_axes()).size(), MIXED_SIZE);

    let mut cells = vec![WeightedSum::default(); MIXED_SIZE];
    let adopted =
        make_histogram_adopted(AdoptedStorage::from_slice(&mut cells), mixed_axes()).unwrap();
    assert_eq!(adopted.rank(), 3);
    assert_eq!(adopted.size(), MIXED_SIZE);

    let mut raw = vec![AtomicWeightedSum::default(); MIXED_SIZE];
    let raw_hist = unsafe {
        make_atomic_histogram_with_error_adopted(raw.as_mut_ptr().cast(), raw.len(), mixed_axes())
    }
    .unwrap();
    assert_eq!(raw_hist.rank(), 3);
    assert_eq!(raw_hist.size(), MIXED_SIZE);
}

#[test]
fn test_one_and_six_axes() {
    let one = make_histogram((variable_axis(),));
    assert_eq!(one.rank(), 1);
    assert_eq!(one.size(), 5);

    let six = make_histogram((
        Regular::new(2, 0.0, 1.0).unwrap(),
        Regular::with_options(3, 0.0, 1.0, AxisOptions::NONE).unwrap(),
        Integer::new(0, 1).unwrap(),
        variable_axis(),
        Category::new(vec!['a']).unwrap(),
        Category::new(vec![true, false]).unwrap(),
    ));
    assert_eq!(six.rank(), 6);
    assert_eq!(six.size(), 4 * 3 * 3 * 5 * 2 * 3);
    assert_eq!(six.axes().extents(), vec![4, 3, 3, 5, 2, 3]);
}

#[test]
fn test_flavours_agree_on_counts() {
    let points = random_points(7, 2_000);

    let mut plain = make_histogram(mixed_axes());
    let atomic = make_atomic_histogram(mixed_axes());
    let mut weighted = make_histogram_with_error(mixed_axes());
    let atomic_weighted = make_atomic_histogram_with_error(mixed_axes());

    for p in &points {
        plain.fill(p).unwrap();
        atomic.fill_shared(p);
        weighted.fill(p).unwrap();
        atomic_weighted.fill_shared(p);
    }

    let expected = plain.values();
    assert_eq!(atomic.values(), expected);
    assert_eq!(weighted.values(), expected);
    assert_eq!(atomic_weighted.values(), expected);
    // Unit weights: variance equals the count
    assert_eq!(weighted.variances(), expected);
}

#[test]
fn test_out_of_range_without_flow_is_dropped() {
    let mut hist = make_histogram(mixed_axes());
    // Integer axis has no flow bins: 4 and -1 have no cell
    hist.fill(&(0.0, 4, 11)).unwrap();
    hist.fill(&(0.0, -1, 11)).unwrap();
    assert_eq!(hist.sum(), 0.0);

    // Unlisted category goes to the overflow bin
    hist.fill(&(0.0, 1, 99)).unwrap();
    assert_eq!(hist.sum(), 1.0);
    assert_eq!(hist.at(&(0.0, 1, 42)), Some(&1.0));
}
