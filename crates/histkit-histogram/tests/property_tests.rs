//! Property-based tests for indexing and growth

use histkit_histogram::prelude::*;
use proptest::prelude::*;

proptest! {
    // Every coordinate of an axis with both flow bins lands in exactly one cell
    #[test]
    fn prop_flow_axes_never_drop(
        xs in prop::collection::vec(-50.0f64..50.0, 1..200),
        ks in prop::collection::vec(-10i64..10, 1..200),
    ) {
        let mut hist = make_histogram((
            Regular::new(7, -3.0, 4.0).unwrap(),
            Integer::new(-2, 3).unwrap(),
        ));
        let n = xs.len().min(ks.len());
        for (x, k) in xs.iter().zip(&ks) {
            hist.fill(&(*x, *k)).unwrap();
        }
        prop_assert_eq!(hist.sum(), n as f64);
    }

    // A growing integer axis ends up spanning exactly the filled range
    #[test]
    fn prop_integer_growth_covers_range(values in prop::collection::vec(-100i64..100, 1..100)) {
        let mut hist = make_histogram((
            Integer::with_options(0, 1, AxisOptions::GROWTH).unwrap(),
        ));
        for v in &values {
            hist.fill(&(*v,)).unwrap();
        }
        let lo = values.iter().copied().min().unwrap().min(0);
        let hi = values.iter().copied().max().unwrap().max(0);
        prop_assert_eq!(hist.size(), (hi - lo + 1) as usize);
        prop_assert_eq!(hist.sum(), values.len() as f64);
        for v in &values {
            let expected = values.iter().filter(|w| *w == v).count() as f64;
            prop_assert_eq!(hist.at(&(*v,)).copied(), Some(expected));
        }
    }

    // Growth on one axis keeps the contents of every existing cell
    #[test]
    fn prop_growth_preserves_cells(
        labels in prop::collection::vec(0u8..6, 1..60),
        ks in prop::collection::vec(0i64..3, 1..60),
    ) {
        let mut grown = make_histogram_with_error((
            Integer::new(0, 3).unwrap(),
            Category::with_options(Vec::<u8>::new(), AxisOptions::GROWTH).unwrap(),
        ));
        for (k, label) in ks.iter().zip(&labels) {
            grown.fill_weighted(&(*k, *label), 2.0).unwrap();
        }
        for (k, label) in ks.iter().zip(&labels) {
            let expected = ks
                .iter()
                .zip(&labels)
                .filter(|(k2, l2)| *k2 == k && *l2 == label)
                .count() as f64;
            let cell = grown.at(&(*k, *label)).unwrap();
            prop_assert_eq!(cell.sum_of_weights, 2.0 * expected);
            prop_assert_eq!(cell.sum_of_weights_squared, 4.0 * expected);
        }
    }
}
