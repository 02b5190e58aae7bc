//! Spending forecast
//!
//! Fits an ordinary least-squares line over consecutive monthly totals and
//! extrapolates it into the following months.

use tracing::debug;

use crate::models::{ForecastPoint, LinearTrend, MonthKey, SpendingForecast, TrendDataPoint};

/// Least-squares fit over `x = 0..n-1`.
///
/// Returns a flat zero line when there are fewer than two points, when the
/// denominator vanishes, or when any input is not finite.
pub fn fit_linear(values: &[f64]) -> LinearTrend {
    let n = values.len();
    if n < 2 || values.iter().any(|v| !v.is_finite()) {
        return LinearTrend::default();
    }

    let n = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return LinearTrend::default();
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    if !slope.is_finite() || !intercept.is_finite() {
        return LinearTrend::default();
    }

    LinearTrend { slope, intercept }
}

/// Extrapolate `periods` months after `last_month`, continuing the x axis of
/// a fit over `history_len` points.
pub fn forecast_months(
    trend: &LinearTrend,
    history_len: usize,
    last_month: MonthKey,
    periods: u32,
) -> Vec<ForecastPoint> {
    (0..periods)
        .map(|i| {
            let month = last_month.offset(i64::from(i) + 1);
            ForecastPoint {
                period: month.label(),
                year: month.year,
                month: month.month,
                amount: trend.value_at((history_len + i as usize) as f64),
            }
        })
        .collect()
}

/// Projects monthly spending from a trailing trend
#[derive(Debug, Clone)]
pub struct SpendingForecaster {
    /// Number of future months to project (default 3)
    periods: u32,
}

impl SpendingForecaster {
    pub fn new() -> Self {
        Self { periods: 3 }
    }

    pub fn with_periods(periods: u32) -> Self {
        Self { periods }
    }

    /// Fit the history and project the months after its last point.
    ///
    /// An empty history has nothing to anchor labels to, so it yields the
    /// zero fit with no points.
    pub fn forecast(&self, history: &[TrendDataPoint]) -> SpendingForecast {
        let Some(last_month) = history
            .last()
            .and_then(|p| MonthKey::new(p.year, p.month))
        else {
            return SpendingForecast::default();
        };

        let values: Vec<f64> = history.iter().map(|p| p.amount).collect();
        let trend = fit_linear(&values);
        debug!(
            slope = trend.slope,
            intercept = trend.intercept,
            points = values.len(),
            "Fitted spending trend"
        );

        SpendingForecast {
            trend,
            points: forecast_months(&trend, values.len(), last_month, self.periods),
        }
    }
}

impl Default for SpendingForecaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(start: MonthKey, amounts: &[f64]) -> Vec<TrendDataPoint> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| TrendDataPoint {
                amount,
                ..TrendDataPoint::zero(start.offset(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_fit_perfect_line() {
        let fit = fit_linear(&[10.0, 20.0, 30.0, 40.0]);
        assert!((fit.slope - 10.0).abs() < 1e-9);
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        assert!((fit.value_at(4.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_flat_series() {
        let fit = fit_linear(&[100.0, 100.0, 100.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 100.0);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(fit_linear(&[]), LinearTrend::default());
        assert_eq!(fit_linear(&[42.0]), LinearTrend::default());
        assert_eq!(fit_linear(&[1.0, f64::NAN, 3.0]), LinearTrend::default());
    }

    #[test]
    fn test_forecast_rolls_over_year() {
        let start = MonthKey::new(2024, 7).unwrap();
        let points = history(start, &[100.0, 110.0, 120.0, 130.0, 140.0, 150.0]);
        assert_eq!(points.last().unwrap().period, "Dec 2024");

        let forecast = SpendingForecaster::new().forecast(&points);
        let labels: Vec<&str> = forecast.points.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(labels, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
        assert_eq!(forecast.points[0].year, 2025);
        assert_eq!(forecast.points[0].month, 1);
        assert!((forecast.points[0].amount - 160.0).abs() < 1e-9);
        assert!((forecast.points[2].amount - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_can_go_negative() {
        let start = MonthKey::new(2024, 1).unwrap();
        let points = history(start, &[300.0, 200.0, 100.0]);
        let forecast = SpendingForecaster::with_periods(2).forecast(&points);
        assert_eq!(forecast.points.len(), 2);
        assert!((forecast.points[0].amount - 0.0).abs() < 1e-9);
        assert!((forecast.points[1].amount + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history() {
        let forecast = SpendingForecaster::default().forecast(&[]);
        assert_eq!(forecast, SpendingForecast::default());
    }
}
