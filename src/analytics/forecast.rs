use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Monthly resampling
// ---------------------------------------------------------------------------

/// Minimum monthly observations needed to fit a trend.
pub const MIN_OBSERVATIONS: usize = 2;

/// Observations needed before seasonal indices are estimated (two full
/// calendar cycles).
const SEASONAL_MIN_OBSERVATIONS: usize = 24;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient history: {months} monthly observation(s), need at least {MIN_OBSERVATIONS}")]
    InsufficientHistory { months: usize },
}

/// A (period, value) pair; `period` is the first day of the month.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub period: NaiveDate,
    pub value: f64,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("valid calendar month")
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)
        .expect("valid calendar month")
}

/// Bucket the filtered subset into total sales per calendar month, from the
/// first to the last observed order month.  Gap months are filled with 0.0
/// so the series is contiguous.
pub fn monthly_sales_series(dataset: &Dataset, indices: &[usize]) -> Vec<(NaiveDate, f64)> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        *buckets.entry(month_start(rec.order_date)).or_insert(0.0) += rec.sales;
    }

    let (Some(&first), Some(&last)) = (
        buckets.keys().next(),
        buckets.keys().next_back(),
    ) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut period = first;
    while period <= last {
        series.push((period, buckets.get(&period).copied().unwrap_or(0.0)));
        period = add_months(period, 1);
    }
    series
}

// ---------------------------------------------------------------------------
// Additive trend + seasonality model
// ---------------------------------------------------------------------------

/// A fitted additive model over a contiguous monthly series:
/// `ŷ(t) = intercept + slope·t + seasonal[month(t)]`.
///
/// Trend comes from an ordinary least-squares fit; seasonal indices are
/// mean-centered monthly residual averages, estimated only when at least two
/// full calendar cycles are observed.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesForecast {
    periods: Vec<NaiveDate>,
    intercept: f64,
    slope: f64,
    seasonal: [f64; 12],
}

impl SalesForecast {
    /// Fit the model to a contiguous monthly series (as produced by
    /// [`monthly_sales_series`]).
    pub fn fit(series: &[(NaiveDate, f64)]) -> Result<Self, ForecastError> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientHistory { months: n });
        }

        let periods: Vec<NaiveDate> = series.iter().map(|(p, _)| *p).collect();
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

        // Ordinary least squares on t = 0..n
        let nf = n as f64;
        let t_mean = (nf - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / nf;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (t, &y) in values.iter().enumerate() {
            let dt = t as f64 - t_mean;
            sxx += dt * dt;
            sxy += dt * (y - y_mean);
        }
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        let intercept = y_mean - slope * t_mean;

        // Monthly seasonal indices from detrended residuals, mean-centered so
        // they sum to zero over a full cycle.
        let mut seasonal = [0.0f64; 12];
        if n >= SEASONAL_MIN_OBSERVATIONS {
            let mut sums = [0.0f64; 12];
            let mut counts = [0usize; 12];
            for (t, (period, y)) in series.iter().enumerate() {
                let residual = y - (intercept + slope * t as f64);
                let m = period.month0() as usize;
                sums[m] += residual;
                counts[m] += 1;
            }
            for m in 0..12 {
                if counts[m] > 0 {
                    seasonal[m] = sums[m] / counts[m] as f64;
                }
            }
            let mean_index = seasonal.iter().sum::<f64>() / 12.0;
            for s in &mut seasonal {
                *s -= mean_index;
            }
        }

        Ok(SalesForecast {
            periods,
            intercept,
            slope,
            seasonal,
        })
    }

    fn predict_at(&self, t: usize, period: NaiveDate) -> f64 {
        self.intercept + self.slope * t as f64 + self.seasonal[period.month0() as usize]
    }

    /// In-sample fitted values, one per observed period (the overlay line).
    pub fn fitted(&self) -> Vec<ForecastPoint> {
        self.periods
            .iter()
            .enumerate()
            .map(|(t, &period)| ForecastPoint {
                period,
                value: self.predict_at(t, period),
            })
            .collect()
    }

    /// Point predictions for the next `horizon` months after the last
    /// observation.  The first entry is "next month's forecast".
    pub fn forecast(&self, horizon: usize) -> Vec<ForecastPoint> {
        let n = self.periods.len();
        let last = *self.periods.last().expect("fit requires observations");
        (1..=horizon)
            .map(|k| {
                let period = add_months(last, k as u32);
                ForecastPoint {
                    period,
                    value: self.predict_at(n - 1 + k, period),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn add_months_crosses_year_boundaries() {
        assert_eq!(add_months(ymd(2016, 11), 1), ymd(2016, 12));
        assert_eq!(add_months(ymd(2016, 11), 2), ymd(2017, 1));
        assert_eq!(add_months(ymd(2016, 1), 24), ymd(2018, 1));
    }

    #[test]
    fn monthly_series_zero_fills_gap_months() {
        let ds = Dataset::from_records(
            vec![
                record("2016-01-05", "East", "Technology", "Consumer", 100.0, 20.0),
                record("2016-01-20", "East", "Technology", "Consumer", 50.0, 5.0),
                record("2016-03-02", "West", "Furniture", "Consumer", 200.0, 40.0),
            ],
            0,
        );
        let indices: Vec<usize> = (0..ds.len()).collect();

        let series = monthly_sales_series(&ds, &indices);
        assert_eq!(
            series,
            vec![
                (ymd(2016, 1), 150.0),
                (ymd(2016, 2), 0.0),
                (ymd(2016, 3), 200.0),
            ]
        );
    }

    #[test]
    fn empty_subset_yields_empty_series() {
        let ds = Dataset::from_records(
            vec![record("2016-01-05", "East", "Technology", "Consumer", 1.0, 0.0)],
            0,
        );
        assert!(monthly_sales_series(&ds, &[]).is_empty());
    }

    #[test]
    fn too_little_history_is_rejected() {
        assert_eq!(
            SalesForecast::fit(&[]),
            Err(ForecastError::InsufficientHistory { months: 0 })
        );
        assert_eq!(
            SalesForecast::fit(&[(ymd(2016, 1), 10.0)]),
            Err(ForecastError::InsufficientHistory { months: 1 })
        );
    }

    #[test]
    fn linear_series_is_extrapolated_exactly() {
        // y = 10 + 5t for 6 months starting 2016-11, crossing a year boundary.
        let series: Vec<(NaiveDate, f64)> = (0..6)
            .map(|t| (add_months(ymd(2016, 11), t), 10.0 + 5.0 * t as f64))
            .collect();

        let model = SalesForecast::fit(&series).unwrap();
        let projected = model.forecast(3);

        assert_eq!(projected.len(), 3);
        assert_eq!(projected[0].period, ymd(2017, 5));
        assert_eq!(projected[2].period, ymd(2017, 7));
        for (k, point) in projected.iter().enumerate() {
            let expected = 10.0 + 5.0 * (6 + k) as f64;
            assert!((point.value - expected).abs() < 1e-9, "{point:?}");
        }

        // In-sample fit reproduces the observations.
        for (fitted, (_, actual)) in model.fitted().iter().zip(&series) {
            assert!((fitted.value - actual).abs() < 1e-9);
        }
    }

    #[test]
    fn flat_series_forecasts_its_level() {
        let series: Vec<(NaiveDate, f64)> = (0..24)
            .map(|t| (add_months(ymd(2015, 1), t), 100.0))
            .collect();

        let model = SalesForecast::fit(&series).unwrap();
        for point in model.forecast(3) {
            assert!((point.value - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn seasonal_peaks_survive_into_the_forecast() {
        // Two full years: December sales spike well above the base level.
        let series: Vec<(NaiveDate, f64)> = (0..24)
            .map(|t| {
                let period = add_months(ymd(2015, 1), t);
                let value = if period.month() == 12 { 250.0 } else { 100.0 };
                (period, value)
            })
            .collect();

        let model = SalesForecast::fit(&series).unwrap();
        // Forecast from 2016-12: next December is 12 months out.
        let projected = model.forecast(12);
        let december = projected.iter().find(|p| p.period.month() == 12).unwrap();
        let june = projected.iter().find(|p| p.period.month() == 6).unwrap();
        assert!(
            december.value > june.value + 50.0,
            "december {december:?} vs june {june:?}"
        );
    }

    #[test]
    fn fitting_twice_gives_identical_models() {
        let series: Vec<(NaiveDate, f64)> = (0..12)
            .map(|t| (add_months(ymd(2016, 1), t), (t * t) as f64))
            .collect();
        assert_eq!(
            SalesForecast::fit(&series).unwrap(),
            SalesForecast::fit(&series).unwrap()
        );
    }
}
