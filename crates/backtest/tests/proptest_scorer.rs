use backtest::{score, Scorer};
use chrono::{Duration, TimeZone, Utc};
use common::{Bar, Series};
use proptest::prelude::*;

fn random_walk(steps: &[f64], spreads: &[f64]) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut price = 500.0;
    let bars = steps
        .iter()
        .zip(spreads)
        .enumerate()
        .map(|(i, (&step, &spread))| {
            price += step;
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open: price,
                high: price + spread,
                low: price - spread,
                close: price,
            }
        })
        .collect();
    Series::new("PROP", bars).unwrap()
}

fn walk(len: std::ops::Range<usize>) -> impl Strategy<Value = Series> {
    len.prop_flat_map(|n| {
        (
            prop::collection::vec(-1.5f64..1.6, n),
            prop::collection::vec(0.0f64..2.0, n),
        )
    })
    .prop_map(|(steps, spreads)| random_walk(&steps, &spreads))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Win rate stays in [0, 1] and the sample never exceeds the loop range.
    #[test]
    fn score_is_bounded(series in walk(201..420)) {
        let result = score(&series);
        prop_assert!((0.0..=1.0).contains(&result.win_rate));
        prop_assert!(result.sample_count <= series.len().saturating_sub(202));
        if result.sample_count == 0 {
            prop_assert_eq!(result.win_rate, 0.0);
        }
    }

    /// Short histories score (0.0, 0).
    #[test]
    fn short_history_scores_nothing(series in walk(0..201)) {
        let result = score(&series);
        prop_assert_eq!(result.win_rate, 0.0);
        prop_assert_eq!(result.sample_count, 0);
    }

    /// Rescoring the same series gives the same answer.
    #[test]
    fn scoring_is_repeatable(series in walk(201..300)) {
        prop_assert_eq!(score(&series), score(&series));
        let trials = Scorer::default().simulate(&series);
        prop_assert!(trials.iter().all(|t| t.index >= 200 && t.index + 3 <= series.len()));
    }
}
