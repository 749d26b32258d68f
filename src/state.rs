use std::collections::BTreeSet;

use crate::analytics::aggregate::{self, AggregationResult, ScatterPoint};
use crate::analytics::forecast::{
    monthly_sales_series, ForecastError, ForecastPoint, SalesForecast,
};
use crate::analytics::kpi::Kpis;
use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, init_selection, FilterSelection};
use crate::data::model::{Dataset, Dimension};

/// How many future months the forecast projects.
pub const FORECAST_HORIZON: usize = 3;

/// How many products the top-products chart shows.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Dashboard summary: every derived number the UI renders
// ---------------------------------------------------------------------------

/// The forecast view data: actual monthly totals, in-sample fit, and the
/// projected future months.
#[derive(Debug, Clone)]
pub struct ForecastView {
    pub actual: Vec<ForecastPoint>,
    pub fitted: Vec<ForecastPoint>,
    pub projected: Vec<ForecastPoint>,
}

impl ForecastView {
    /// The first value strictly after the last observed period.
    pub fn next_month(&self) -> Option<&ForecastPoint> {
        self.projected.first()
    }
}

/// All aggregations and KPIs for one (Dataset, FilterSelection) pair.
/// A pure value; rebuilt from scratch whenever the selection changes.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub monthly_sales: AggregationResult,
    pub profit_by_sub_category: AggregationResult,
    pub category_sales: AggregationResult,
    pub region_sales: AggregationResult,
    pub top_products: AggregationResult,
    pub state_sales: AggregationResult,
    pub scatter: Vec<ScatterPoint>,
    pub forecast: Result<ForecastView, ForecastError>,
}

impl DashboardSummary {
    pub fn compute(dataset: &Dataset, indices: &[usize]) -> Self {
        let forecast = {
            let series: Vec<_> = monthly_sales_series(dataset, indices);
            SalesForecast::fit(&series).map(|model| ForecastView {
                actual: series
                    .iter()
                    .map(|&(period, value)| ForecastPoint { period, value })
                    .collect(),
                fitted: model.fitted(),
                projected: model.forecast(FORECAST_HORIZON),
            })
        };

        DashboardSummary {
            kpis: Kpis::compute(dataset, indices),
            monthly_sales: aggregate::monthly_sales(dataset, indices),
            profit_by_sub_category: aggregate::profit_by_sub_category(dataset, indices),
            category_sales: aggregate::category_sales(dataset, indices),
            region_sales: aggregate::region_sales(dataset, indices),
            top_products: aggregate::top_products(dataset, indices, TOP_PRODUCTS_LIMIT),
            state_sales: aggregate::state_sales(dataset, indices),
            scatter: aggregate::discount_profit_points(dataset, indices),
            forecast,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// Per-dimension filter selections.
    pub filters: FilterSelection,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregations + KPIs + forecast for the current selection.
    pub summary: Option<DashboardSummary>,

    /// Category → colour for the scatter and share charts.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterSelection::default(),
            visible_indices: Vec::new(),
            summary: None,
            color_map: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset, initialise filters, colours, and the
    /// first summary.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = init_selection(&dataset);
        self.visible_indices = (0..dataset.len()).collect();

        self.color_map = dataset
            .unique_values
            .get(&Dimension::Category)
            .map(ColorMap::new);
        self.summary = Some(DashboardSummary::compute(&dataset, &self.visible_indices));

        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` and the summary after a filter change.
    /// The whole pipeline reruns; nothing is maintained incrementally.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
            self.summary = Some(DashboardSummary::compute(ds, &self.visible_indices));
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.filters.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            if let Some(all_vals) = ds.unique_values.get(&dim) {
                let all_vals = all_vals.clone();
                self.filters.insert(dim, all_vals);
                self.refilter();
            }
        }
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.insert(dim, BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                record("2016-01-05", "East", "Technology", "Consumer", 100.0, 20.0),
                record("2016-02-09", "East", "Technology", "Corporate", 50.0, -10.0),
                record("2016-03-02", "West", "Furniture", "Consumer", 200.0, 40.0),
            ],
            0,
        )
    }

    #[test]
    fn set_dataset_selects_everything_and_summarises() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.kpis.total_sales, 350.0);
        assert_eq!(summary.monthly_sales.len(), 3);
        assert!(summary.forecast.is_ok());
    }

    #[test]
    fn select_none_empties_the_dashboard_without_error() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.select_none(Dimension::Region);

        assert!(state.visible_indices.is_empty());
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.kpis, Kpis::default());
        assert!(summary.monthly_sales.is_empty());
        assert_eq!(
            summary.forecast.clone().unwrap_err(),
            ForecastError::InsufficientHistory { months: 0 }
        );
    }

    #[test]
    fn toggle_narrows_then_restores() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.toggle_filter_value(Dimension::Region, "West");
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.as_ref().unwrap().kpis.total_sales, 150.0);

        state.toggle_filter_value(Dimension::Region, "West");
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.toggle_filter_value(Dimension::Category, "Furniture");

        let first = state.summary.clone().unwrap();
        state.refilter();
        let second = state.summary.clone().unwrap();

        assert_eq!(first.kpis, second.kpis);
        assert_eq!(first.monthly_sales, second.monthly_sales);
        assert_eq!(first.top_products, second.top_products);
    }
}
