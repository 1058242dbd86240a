//! Spending trend classifier

use crate::models::{SpendingPeriodData, SpendingTrend};

/// Average step (in currency units) beyond which a series counts as moving
pub const TREND_THRESHOLD: f64 = 50.0;

/// Number of leading points the classifier looks at
const TREND_WINDOW: usize = 3;

/// Classify a recent-first series of period totals
///
/// Takes the first three values in the order given and averages their
/// forward differences (`values[i + 1] - values[i]`).
pub fn classify(values: &[f64]) -> SpendingTrend {
    if values.len() < TREND_WINDOW {
        return SpendingTrend::Stable;
    }

    let window = &values[..TREND_WINDOW];
    let steps: Vec<f64> = window.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let average = steps.iter().sum::<f64>() / steps.len() as f64;

    if average > TREND_THRESHOLD {
        SpendingTrend::Increasing
    } else if average < -TREND_THRESHOLD {
        SpendingTrend::Decreasing
    } else {
        SpendingTrend::Stable
    }
}

/// Classify a bucketed spending series
pub fn classify_series(series: &[SpendingPeriodData]) -> SpendingTrend {
    let totals: Vec<f64> = series.iter().map(|p| p.total_amount).collect();
    classify(&totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing() {
        assert_eq!(classify(&[100.0, 160.0, 220.0]), SpendingTrend::Increasing);
    }

    #[test]
    fn test_decreasing() {
        assert_eq!(classify(&[220.0, 160.0, 100.0]), SpendingTrend::Decreasing);
    }

    #[test]
    fn test_small_moves_are_stable() {
        assert_eq!(classify(&[100.0, 140.0, 190.0]), SpendingTrend::Stable);
        // Exactly at the threshold is not a move
        assert_eq!(classify(&[0.0, 50.0, 100.0]), SpendingTrend::Stable);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(classify(&[]), SpendingTrend::Stable);
        assert_eq!(classify(&[10.0, 500.0]), SpendingTrend::Stable);
    }

    #[test]
    fn test_only_first_three_points_count() {
        assert_eq!(
            classify(&[100.0, 160.0, 220.0, 0.0, 0.0]),
            SpendingTrend::Increasing
        );
    }

    #[test]
    fn test_classify_series() {
        let series: Vec<SpendingPeriodData> = [300.0, 200.0, 100.0]
            .iter()
            .map(|&total| SpendingPeriodData {
                period: String::new(),
                total_amount: total,
                subscription_count: 1,
            })
            .collect();
        assert_eq!(classify_series(&series), SpendingTrend::Decreasing);
    }
}
