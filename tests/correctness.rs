//! Correctness and invariant tests for descstats
//!
//! These tests verify critical invariants, merge semantics, and end-to-end
//! results against reference values. They complement the unit tests in each
//! module by focusing on properties that must always hold.
//!
//! Run with: cargo test --test correctness

use descstats::config::{DatasetConfig, DigestConfig, QuantileBackend, SampleConfig, SamplingPolicy};
use descstats::dataset::Dataset;
use descstats::quantiles::TDigest;
use descstats::sampling::BoundedSample;
use descstats::selection;
use descstats::statistics::RunningStats;
use descstats::traits::{QuantileSketch, Sketch};
use descstats::StatsError;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const EPSILON: f64 = 1e-8;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "{}: expected {:.12}, got {:.12}",
        what,
        expected,
        actual
    );
}

fn uniform(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<f64>()).collect()
}

// ============================================================================
// Reference datasets
// ============================================================================

const ODD_101: [f64; 101] = [
    0.43237019, 0.89965341, 0.65736954, 0.29787347, 0.97940454, 0.68124639, 0.10636585, 0.26271744,
    0.32726637, 0.84379331, 0.25945488, 0.36626302, 0.28545607, 0.96567511, 0.05816944, 0.48142022,
    0.46270003, 0.35002848, 0.48814735, 0.29582646, 0.24433933, 0.43193555, 0.33852267, 0.47881679,
    0.53685681, 0.02080174, 0.69240203, 0.00851312, 0.67130511, 0.91025214, 0.76341898, 0.97894942,
    0.79185358, 0.70467176, 0.50039602, 0.78577565, 0.38596683, 0.17184017, 0.3115971, 0.64044818,
    0.42768467, 0.70312878, 0.64437839, 0.82133105, 0.03765682, 0.50174467, 0.8016999, 0.91263549,
    0.00700852, 0.47038832, 0.58153316, 0.21695557, 0.1800288, 0.75913846, 0.76955199, 0.32775094,
    0.89597533, 0.64899747, 0.76109793, 0.08578548, 0.6346401, 0.9931002, 0.41520079, 0.87434325,
    0.09935491, 0.50075671, 0.86616643, 0.87013226, 0.06687713, 0.81737008, 0.3404168, 0.01019728,
    0.03138638, 0.29660639, 0.88462848, 0.02436522, 0.40903969, 0.73306587, 0.47339932, 0.36121191,
    0.29101213, 0.58949457, 0.14527204, 0.84933733, 0.34961894, 0.76631946, 0.04105252, 0.56109999,
    0.87730681, 0.65769674, 0.62805237, 0.69491854, 0.15972331, 0.33908443, 0.07314813, 0.18694128,
    0.08702012, 0.54743775, 0.1845326, 0.56460996, 0.81548316,
];

const EVEN_100: [f64; 100] = [
    0.27564984, 0.76216363, 0.17482944, 0.42485547, 0.26271342, 0.08006306, 0.44788837, 0.68474791,
    0.24736164, 0.82006618, 0.92724928, 0.94786928, 0.31081874, 0.63527509, 0.54334513, 0.35131215,
    0.31973438, 0.19724116, 0.05609514, 0.94613421, 0.58635689, 0.08175372, 0.55780855, 0.2621798,
    0.07965311, 0.91239451, 0.6968671, 0.24828693, 0.9034816, 0.3625052, 0.1786429, 0.9241733,
    0.41879173, 0.9675375, 0.22868655, 0.32843568, 0.14586676, 0.03701525, 0.7135808, 0.34343475,
    0.71237876, 0.91353507, 0.55883932, 0.18121403, 0.44049463, 0.42779077, 0.083098, 0.51829406,
    0.61061055, 0.56288862, 0.45446935, 0.46948462, 0.81136468, 0.08685398, 0.95479866, 0.13773993,
    0.80417514, 0.59397999, 0.45370185, 0.02643887, 0.67834174, 0.17681015, 0.81512603, 0.69894483,
    0.49324567, 0.43104551, 0.24529282, 0.2186107, 0.36801189, 0.51962121, 0.70257311, 0.87483376,
    0.19393657, 0.52055607, 0.96756828, 0.12514523, 0.29526195, 0.58954618, 0.7091562, 0.59563842,
    0.8050604, 0.44021433, 0.01790693, 0.98626531, 0.32092172, 0.61701703, 0.86518485, 0.28019361,
    0.82510572, 0.37655538, 0.5342091, 0.19874851, 0.04020226, 0.87420673, 0.30328376, 0.83395533,
    0.86146147, 0.2151674, 0.86681485, 0.85074555,
];

/// Expected (median, mean, variance, sd)
fn check_describe(name: &str, data: &[f64], expected: [f64; 4]) {
    let mut dataset = Dataset::new();
    dataset.extend(data.iter().copied()).unwrap();

    assert_eq!(dataset.count(), data.len() as u64, "{}: count", name);
    assert_close(dataset.median(), expected[0], &format!("{}: median", name));
    assert_close(dataset.mean(), expected[1], &format!("{}: mean", name));
    assert_close(dataset.variance(), expected[2], &format!("{}: variance", name));
    assert_close(dataset.sd(), expected[3], &format!("{}: sd", name));
}

// ============================================================================
// End-to-end
// ============================================================================

mod describe {
    use super::*;

    #[test]
    fn odd_small() {
        check_describe(
            "odd_small",
            &[9.4, 2.1, -6.5, 34.2, 3.34, 67.5, 8.64],
            [8.64, 16.954285714285714, 655.76342857142856, 25.607878252042447],
        );
    }

    #[test]
    fn odd_small_rotated() {
        check_describe(
            "odd_small_rotated",
            &[8.64, 9.4, 2.1, -6.5, 34.2, 3.34, 67.5],
            [8.64, 16.954285714285714, 655.76342857142856, 25.607878252042447],
        );
    }

    #[test]
    fn odd_uniform() {
        check_describe(
            "odd_uniform",
            &ODD_101,
            [
                0.48142021970636995,
                0.4904530462376237,
                0.08335251150960539,
                0.28870835025957492,
            ],
        );
    }

    #[test]
    fn even_small() {
        check_describe(
            "even_small",
            &[4.3, 9.4, 2.1, -6.5, 34.2, 3.34, 67.5, 8.64],
            [6.47, 15.3725, 582.09930714285713, 24.126734282593183],
        );
    }

    #[test]
    fn even_uniform() {
        check_describe(
            "even_uniform",
            &EVEN_100,
            [
                0.461976985,
                0.4952750359,
                0.08234955831149722,
                0.28696612746367334,
            ],
        );
    }

    #[test]
    fn summary_matches_accessors() {
        let mut dataset = Dataset::new();
        dataset.extend(EVEN_100).unwrap();
        let summary = dataset.summary();

        assert_eq!(summary.count, 100);
        assert_eq!(summary.min, 0.01790693);
        assert_eq!(summary.max, 0.98626531);
        assert_eq!(summary.q1, dataset.first_quartile());
        assert_eq!(summary.q3, dataset.third_quartile());
        assert_eq!(summary.iqr, dataset.iqr());
        assert_close(summary.median, 0.461976985, "median");
        assert!(summary.q1 < summary.median && summary.median < summary.q3);
    }

    #[test]
    fn streaming_moments_match_exact() {
        let mut exact = Dataset::exact();
        let mut streaming = Dataset::streaming();
        exact.extend(ODD_101).unwrap();
        streaming.extend(ODD_101).unwrap();

        assert_eq!(exact.count(), streaming.count());
        assert_eq!(exact.mean(), streaming.mean());
        assert_eq!(exact.variance(), streaming.variance());
        assert_eq!(exact.min(), streaming.min());
        assert_eq!(exact.max(), streaming.max());

        // Quantiles are approximate, but close on this little data.
        assert!((exact.median() - streaming.median()).abs() < 0.05);
    }

    #[test]
    fn streaming_backends_agree_on_uniform_data() {
        let values = uniform(20_000, 3);
        let digest_config = DatasetConfig::streaming().with_backend(QuantileBackend::Digest);
        let sample_config = DatasetConfig::streaming()
            .with_backend(QuantileBackend::Sample)
            .with_sample(SampleConfig::new(4096, SamplingPolicy::Reservoir));

        for config in [digest_config, sample_config] {
            let mut dataset = Dataset::with_config(config).unwrap();
            dataset.extend(values.iter().copied()).unwrap();
            for (q, expected) in [(10.0, 0.1), (50.0, 0.5), (90.0, 0.9)] {
                let estimate = dataset.percentile(q);
                assert!(
                    (estimate - expected).abs() < 0.05,
                    "{:?}: p{} = {}",
                    config.backend,
                    q,
                    estimate
                );
            }
        }
    }

    #[test]
    fn empty_dataset_reports_nan() {
        let mut dataset = Dataset::new();
        assert_eq!(dataset.count(), 0);
        assert!(dataset.min().is_nan());
        assert!(dataset.max().is_nan());
        assert!(dataset.mean().is_nan());
        assert!(dataset.variance().is_nan());
        assert!(dataset.sd().is_nan());
        assert!(dataset.median().is_nan());
        assert!(dataset.first_quartile().is_nan());
        assert!(dataset.third_quartile().is_nan());
        assert!(dataset.iqr().is_nan());
        assert!(dataset.percentile(50.0).is_nan());
    }

    #[test]
    fn repeated_quartiles_are_bit_identical() {
        let mut dataset = Dataset::new();
        dataset.extend(ODD_101).unwrap();

        let q1 = dataset.first_quartile();
        let q3 = dataset.third_quartile();
        for _ in 0..5 {
            dataset.median();
            assert_eq!(dataset.first_quartile().to_bits(), q1.to_bits());
            assert_eq!(dataset.third_quartile().to_bits(), q3.to_bits());
            assert_eq!(dataset.iqr().to_bits(), (q3 - q1).to_bits());
        }
    }
}

// ============================================================================
// Selection
// ============================================================================

mod selection_tests {
    use super::*;

    #[test]
    fn select_matches_sort_on_reference_data() {
        let mut sorted = EVEN_100.to_vec();
        sorted.sort_by(f64::total_cmp);

        for k in 0..sorted.len() {
            let mut values = EVEN_100;
            assert_eq!(selection::select(&mut values, k), sorted[k], "k={}", k);
        }
    }

    #[test]
    fn select_heavily_duplicated() {
        let mut values: Vec<f64> = (0..10_000).map(|i| (i % 3) as f64).collect();
        assert_eq!(selection::select(&mut values, 0), 0.0);
        assert_eq!(selection::select(&mut values, 3_333), 0.0);
        assert_eq!(selection::select(&mut values, 3_334), 1.0);
        assert_eq!(selection::select(&mut values, 9_999), 2.0);
    }

    #[test]
    fn percentile_bounds_are_min_and_max() {
        let mut values = ODD_101;
        assert_eq!(selection::percentile(&mut values, 0.0), 0.00700852);
        assert_eq!(selection::percentile(&mut values, 100.0), 0.9931002);
    }

    #[test]
    fn median_equals_p50() {
        let mut a = EVEN_100;
        let mut b = EVEN_100;
        assert_close(
            selection::median(&mut a),
            selection::percentile(&mut b, 50.0),
            "median vs p50",
        );
    }
}

// ============================================================================
// RunningStats
// ============================================================================

mod running_stats {
    use super::*;

    #[test]
    fn merge_is_commutative() {
        let mut a = RunningStats::new();
        let mut b = RunningStats::new();

        for v in [1.0, 3.0, 5.0, 7.0, 9.0] {
            a.add(v);
        }
        for v in [2.0, 4.0, 6.0, 8.0, 10.0] {
            b.add(v);
        }

        let mut ab = a.clone();
        ab.merge(&b).unwrap();

        let mut ba = b.clone();
        ba.merge(&a).unwrap();

        assert_eq!(ab.len(), ba.len());
        assert!((ab.mean() - ba.mean()).abs() < 1e-10);
        assert!((ab.variance() - ba.variance()).abs() < 1e-10);
        assert_eq!(ab.min(), ba.min());
        assert_eq!(ab.max(), ba.max());
    }

    #[test]
    fn merge_equivalent_to_sequential_add() {
        let (left, right) = ODD_101.split_at(40);

        let mut sequential = RunningStats::new();
        for &v in &ODD_101 {
            sequential.add(v);
        }

        let mut sa = RunningStats::new();
        let mut sb = RunningStats::new();
        for &v in left {
            sa.add(v);
        }
        for &v in right {
            sb.add(v);
        }
        sa.merge(&sb).unwrap();

        assert_eq!(sa.len(), sequential.len());
        assert!((sa.mean() - sequential.mean()).abs() < 1e-12);
        assert!((sa.variance() - sequential.variance()).abs() < 1e-12);
        assert_eq!(sa.min(), sequential.min());
        assert_eq!(sa.max(), sequential.max());
    }

    #[test]
    fn order_independent_on_reference_data() {
        let mut forward = RunningStats::new();
        let mut backward = RunningStats::new();
        for &v in &EVEN_100 {
            forward.add(v);
        }
        for &v in EVEN_100.iter().rev() {
            backward.add(v);
        }

        assert!((forward.mean() - backward.mean()).abs() < 1e-12);
        assert!((forward.variance() - backward.variance()).abs() < 1e-12);
        assert_eq!(forward.min(), backward.min());
        assert_eq!(forward.max(), backward.max());
    }

    #[test]
    fn merge_empty_into_empty() {
        let mut a = RunningStats::new();
        let b = RunningStats::new();

        a.merge(&b).unwrap();

        assert!(a.is_empty());
        assert!(a.mean().is_nan());
        assert_eq!(a.min(), None);
    }

    #[test]
    fn clear_resets_completely() {
        let mut stats = RunningStats::new();
        for v in [1.0, 2.0, 3.0] {
            stats.add(v);
        }

        stats.clear();

        assert!(stats.is_empty());
        assert_eq!(stats.min(), None);
        assert_eq!(stats.max(), None);
    }
}

// ============================================================================
// TDigest
// ============================================================================

mod tdigest {
    use super::*;

    fn digest_of(values: &[f64], seed: u64) -> TDigest {
        let mut digest = TDigest::with_seed(DigestConfig::default(), seed).unwrap();
        for &v in values {
            digest.add(v);
        }
        digest
    }

    #[test]
    fn uniform_median_within_tolerance() {
        let digest = digest_of(&uniform(10_000, 1), 1);
        let p50 = digest.quantile(0.5).unwrap();
        assert!((p50 - 0.5).abs() < 0.05, "p50 = {}", p50);
    }

    #[test]
    fn weight_is_conserved() {
        let digest = digest_of(&uniform(5_000, 2), 2);
        let weight: u64 = digest.centroids().iter().map(|c| c.weight).sum();
        assert_eq!(weight, 5_000);
        assert_eq!(digest.count(), 5_000);
    }

    #[test]
    fn centroids_stay_sorted() {
        let digest = digest_of(&uniform(5_000, 3), 3);
        assert!(digest
            .centroids()
            .windows(2)
            .all(|w| w[0].mean <= w[1].mean));
    }

    #[test]
    fn tails_are_finer_than_the_middle() {
        let digest = digest_of(&uniform(10_000, 4), 4);
        let centroids = digest.centroids();
        let n = centroids.len();
        let tail = centroids[..n / 10].iter().map(|c| c.weight).max().unwrap();
        let middle = centroids[2 * n / 5..3 * n / 5]
            .iter()
            .map(|c| c.weight)
            .max()
            .unwrap();
        assert!(tail < middle, "tail {} vs middle {}", tail, middle);
    }

    #[test]
    fn repeated_quantile_queries_are_consistent() {
        let digest = digest_of(&uniform(1_000, 5), 5);
        let first = digest.quantile(0.5).unwrap();
        for _ in 0..10 {
            assert_eq!(digest.quantile(0.5).unwrap(), first);
        }
    }

    #[test]
    fn rank_quantile_roundtrip() {
        let digest = digest_of(&uniform(10_000, 6), 6);
        for q in [0.1, 0.25, 0.5, 0.75, 0.9] {
            let value = digest.quantile(q).unwrap();
            let rank = digest.rank(value);
            assert!((rank - q).abs() < 0.02, "q={} value={} rank={}", q, value, rank);
        }
    }

    #[test]
    fn quantile_is_monotonically_nondecreasing() {
        let digest = digest_of(&uniform(10_000, 7), 7);
        let estimates = digest.quantiles(&[0.01, 0.05, 0.25, 0.5, 0.75, 0.95, 0.99]);
        let estimates: Vec<f64> = estimates.into_iter().map(Result::unwrap).collect();
        assert!(estimates.windows(2).all(|w| w[0] <= w[1]), "{:?}", estimates);
    }

    #[test]
    fn quantile_extremes_are_exact() {
        let digest = digest_of(&ODD_101, 8);
        assert_eq!(digest.quantile(0.0).unwrap(), 0.00700852);
        assert_eq!(digest.quantile(1.0).unwrap(), 0.9931002);
    }

    #[test]
    fn quantile_empty_is_an_error() {
        let digest = TDigest::default();
        assert_eq!(digest.quantile(0.5), Err(StatsError::EmptySketch));
    }

    #[test]
    fn merge_preserves_min_max_and_weight() {
        let values = uniform(4_000, 9);
        let (left, right) = values.split_at(2_000);
        let mut a = digest_of(left, 10);
        let b = digest_of(right, 11);
        a.merge(&b).unwrap();

        assert_eq!(a.count(), 4_000);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(a.min(), Some(min));
        assert_eq!(a.max(), Some(max));
        let p50 = a.quantile(0.5).unwrap();
        assert!((p50 - 0.5).abs() < 0.05, "p50 = {}", p50);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut digest = digest_of(&uniform(1_000, 12), 12);
        let before = digest.centroids().to_vec();
        digest.merge(&TDigest::default()).unwrap();
        assert_eq!(digest.centroids(), before.as_slice());
    }

    #[test]
    fn compression_keeps_accuracy() {
        let mut digest = digest_of(&uniform(10_000, 13), 13);
        let before = digest.quantile(0.5).unwrap();
        digest.compress();
        digest.compress();
        assert_eq!(digest.compressions(), 2);
        assert_eq!(digest.count(), 10_000);
        let after = digest.quantile(0.5).unwrap();
        assert!((after - before).abs() < 0.02, "{} -> {}", before, after);
    }
}

// ============================================================================
// BoundedSample
// ============================================================================

mod bounded_sample {
    use super::*;

    fn sample(capacity: usize, policy: SamplingPolicy, seed: u64) -> BoundedSample<u64> {
        BoundedSample::with_seed(SampleConfig::new(capacity, policy), seed).unwrap()
    }

    #[test]
    fn merge_preserves_total_count() {
        let mut s1 = sample(10, SamplingPolicy::Reservoir, 42);
        let mut s2 = sample(10, SamplingPolicy::Reservoir, 99);

        for i in 0..10_000 {
            s1.add(i);
        }
        for i in 10_000..20_000 {
            s2.add(i);
        }

        s1.merge(&s2).unwrap();
        assert_eq!(s1.items_seen(), 20_000);
        assert_eq!(s1.len(), 10);
    }

    #[test]
    fn merge_produces_unbiased_sample() {
        let capacity = 1000;
        let n_per_side = 100_000u64;
        let trials = 20;
        let mut total_from_side2 = 0usize;

        for trial in 0..trials {
            let mut s1 = sample(capacity, SamplingPolicy::Reservoir, 1000 + trial * 7);
            let mut s2 = sample(capacity, SamplingPolicy::Reservoir, 2000 + trial * 13);

            for i in 0..n_per_side {
                s1.add(i);
            }
            for i in n_per_side..(2 * n_per_side) {
                s2.add(i);
            }

            s1.merge(&s2).unwrap();
            total_from_side2 += s1.sample().iter().filter(|&&x| x >= n_per_side).count();
        }

        let expected = (capacity as f64 * trials as f64) / 2.0;
        let relative_error = (total_from_side2 as f64 - expected).abs() / expected;
        assert!(relative_error < 0.1, "relative error {}", relative_error);
    }

    #[test]
    fn merge_underfilled_preserves_all_items() {
        let mut s1 = sample(100, SamplingPolicy::Reservoir, 1);
        let mut s2 = sample(100, SamplingPolicy::Reservoir, 2);

        for i in 0..30 {
            s1.add(i);
        }
        for i in 30..50 {
            s2.add(i);
        }

        s1.merge(&s2).unwrap();

        assert_eq!(s1.items_seen(), 50);
        assert_eq!(s1.len(), 50);
        for i in 0..50u64 {
            assert!(s1.sample().contains(&i), "item {} missing", i);
        }
    }

    #[test]
    fn merge_empty_into_populated() {
        let mut empty = sample(10, SamplingPolicy::Reservoir, 1);
        let mut populated = sample(10, SamplingPolicy::Reservoir, 2);
        for i in 0..1000 {
            populated.add(i);
        }

        empty.merge(&populated).unwrap();

        assert_eq!(empty.items_seen(), 1000);
        assert_eq!(empty.sample(), populated.sample());
    }

    #[test]
    fn sample_size_never_exceeds_capacity() {
        for policy in [SamplingPolicy::Reservoir, SamplingPolicy::CoinFlip] {
            let mut s = sample(50, policy, 1);
            for i in 0..100_000 {
                s.add(i);
                assert!(s.len() <= 50);
            }
        }
    }

    #[test]
    fn reservoir_sample_is_uniform_over_stream() {
        // Mean index of a uniform sample of 0..100_000 is near 50_000.
        let mut s = sample(2_000, SamplingPolicy::Reservoir, 5);
        for i in 0..100_000 {
            s.add(i);
        }
        let mean = s.sample().iter().sum::<u64>() as f64 / s.len() as f64;
        assert!((mean - 50_000.0).abs() < 3_000.0, "mean = {}", mean);
    }

    #[test]
    fn percentile_over_retained_values() {
        let config = SampleConfig::new(4096, SamplingPolicy::Reservoir);
        let mut s = BoundedSample::<f64>::with_seed(config, 6).unwrap();
        for v in uniform(50_000, 6) {
            s.add(v);
        }
        assert!((s.median() - 0.5).abs() < 0.05);
        assert!((s.percentile(90.0) - 0.9).abs() < 0.05);
    }
}

// ============================================================================
// Input
// ============================================================================

mod input {
    use std::io::Cursor;

    use super::*;
    use descstats::input::{read_into, ValueReader};

    #[test]
    fn reads_reference_data_from_text() {
        let text: String = ODD_101.iter().map(|v| format!("{}\n", v)).collect();
        let mut dataset = Dataset::new();
        let count = read_into(&mut dataset, Cursor::new(text)).unwrap();

        assert_eq!(count, 101);
        assert_close(dataset.median(), 0.48142021970636995, "median");
        assert_close(dataset.mean(), 0.4904530462376237, "mean");
    }

    #[test]
    fn skips_garbage_lines() {
        let text = "# header\n1.5\n\nnot a number\n2.5 extra\n";
        let values: Vec<f64> = ValueReader::new(Cursor::new(text))
            .map(Result::unwrap)
            .collect();
        assert_eq!(values, vec![1.5, 2.5]);
    }
}
