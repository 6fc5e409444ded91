use proptest::prelude::*;

use survey_classifier::{Matrix, ScalingParams, StratifiedSplitter, linalg, softmax};

fn matrix(max_rows: usize, max_cols: usize) -> impl Strategy<Value = Matrix> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-100.0f64..100.0, rows * cols)
            .prop_map(move |data| Matrix::from_flat(data, rows, cols).unwrap())
    })
}

proptest! {
    #[test]
    fn transpose_twice_is_identity(a in matrix(6, 6)) {
        let back = linalg::transpose(&linalg::transpose(&a));
        prop_assert_eq!(back, a);
    }

    #[test]
    fn product_has_outer_shape(a in matrix(5, 4), cols in 1usize..5) {
        let b = Matrix::zeros(a.cols(), cols).map(|_| 1.0);
        let c = linalg::multiply(&a, &b).unwrap();
        prop_assert_eq!(c.shape(), (a.rows(), cols));
        // Every column of `c` is the row sum of `a`.
        for (i, row) in a.iter_rows().enumerate() {
            let sum: f64 = row.iter().sum();
            prop_assert!((c.get(i, 0) - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn softmax_rows_are_distributions(a in matrix(5, 6)) {
        let p = softmax::softmax(&a).unwrap();
        for row in p.iter_rows() {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(row.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn softmax_ignores_row_offsets(
        scores in prop::collection::vec(-50.0f64..50.0, 1..8),
        shift in -500.0f64..500.0,
    ) {
        let base = softmax::softmax_vector(&scores).unwrap();
        let shifted: Vec<f64> = scores.iter().map(|s| s + shift).collect();
        let moved = softmax::softmax_vector(&shifted).unwrap();
        for (x, y) in base.iter().zip(&moved) {
            prop_assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn splitter_test_partitions_cover_every_index_once(
        labels in prop::collection::vec(0usize..4, 1..60),
        folds in 2usize..7,
        seed in any::<u64>(),
    ) {
        let splitter = StratifiedSplitter::new(&labels, 4, folds, seed).unwrap();
        let mut seen = vec![0usize; labels.len()];
        for fold in splitter.folds() {
            for &i in &fold.test {
                seen[i] += 1;
            }
            prop_assert_eq!(fold.train.len() + fold.test.len(), labels.len());
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn every_class_reaches_every_training_partition(
        labels in prop::collection::vec(2usize..12, 2..5).prop_flat_map(|counts| {
            let labels: Vec<usize> = counts
                .iter()
                .enumerate()
                .flat_map(|(class, &n)| std::iter::repeat_n(class, n))
                .collect();
            Just(labels).prop_shuffle()
        }),
        folds in 2usize..7,
        seed in any::<u64>(),
    ) {
        let num_classes = labels.iter().max().map_or(0, |&c| c + 1);
        let splitter = StratifiedSplitter::new(&labels, num_classes, folds, seed).unwrap();
        for fold in splitter.folds() {
            let mut present = vec![false; num_classes];
            for &i in &fold.train {
                present[labels[i]] = true;
            }
            prop_assert!(present.iter().all(|&p| p));
        }
    }

    #[test]
    fn standardized_columns_are_centered(a in matrix(12, 4)) {
        prop_assume!(a.rows() >= 2);
        let params = ScalingParams::fit(&a).unwrap();
        let z = params.transform(&a).unwrap();
        let n = z.rows() as f64;
        for col in 0..z.cols() {
            let column: Vec<f64> = (0..z.rows()).map(|r| z.get(r, col)).collect();
            let mean = column.iter().sum::<f64>() / n;
            prop_assert!(mean.abs() < 1e-9);
            if params.std_dev()[col] > 1e-6 {
                let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                prop_assert!((var.sqrt() - 1.0).abs() < 1e-6);
            }
        }
    }
}
