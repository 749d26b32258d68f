use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// KPI scalars over the filtered subset
// ---------------------------------------------------------------------------

/// The four headline numbers shown above the charts.  All percentages; an
/// empty subset yields all zeros rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Mean discount over the subset, as a percentage.
    pub avg_discount: f64,
    /// total_profit / total_sales × 100, or 0 when total_sales is zero.
    pub profit_margin: f64,
}

impl Kpis {
    /// Single pass over the filtered subset.
    pub fn compute(dataset: &Dataset, indices: &[usize]) -> Self {
        let mut total_sales = 0.0;
        let mut total_profit = 0.0;
        let mut total_discount = 0.0;

        for &i in indices {
            let rec = &dataset.records[i];
            total_sales += rec.sales;
            total_profit += rec.profit;
            total_discount += rec.discount;
        }

        let avg_discount = if indices.is_empty() {
            0.0
        } else {
            total_discount / indices.len() as f64 * 100.0
        };

        // Explicit zero-division guard: margin is defined as 0 for zero sales.
        let profit_margin = if total_sales == 0.0 {
            0.0
        } else {
            total_profit / total_sales * 100.0
        };

        Kpis {
            total_sales,
            total_profit,
            avg_discount,
            profit_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, init_selection};
    use crate::data::model::tests::record;
    use crate::data::model::Dimension;

    /// The 4-row worked example: two East/Technology rows, two West/Furniture.
    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                record("2016-01-05", "East", "Technology", "Consumer", 100.0, 20.0),
                record("2016-01-20", "East", "Technology", "Corporate", 50.0, -10.0),
                record("2016-02-02", "West", "Furniture", "Consumer", 200.0, 40.0),
                record("2016-03-20", "West", "Furniture", "Consumer", 0.0, 0.0),
            ],
            0,
        )
    }

    #[test]
    fn unfiltered_totals_and_margin() {
        let ds = dataset();
        let indices: Vec<usize> = (0..ds.len()).collect();
        let kpis = Kpis::compute(&ds, &indices);

        assert_eq!(kpis.total_sales, 350.0);
        assert_eq!(kpis.total_profit, 50.0);
        assert!((kpis.profit_margin - 50.0 / 350.0 * 100.0).abs() < 1e-9);
        // ≈ 14.29 %
        assert!((kpis.profit_margin - 14.2857).abs() < 1e-3);
    }

    #[test]
    fn east_only_totals_and_margin() {
        let ds = dataset();
        let mut selection = init_selection(&ds);
        selection.insert(
            Dimension::Region,
            std::iter::once("East".to_string()).collect(),
        );
        let indices = filtered_indices(&ds, &selection);

        let kpis = Kpis::compute(&ds, &indices);
        assert_eq!(kpis.total_sales, 150.0);
        assert_eq!(kpis.total_profit, 10.0);
        // ≈ 6.67 %
        assert!((kpis.profit_margin - 10.0 / 150.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn avg_discount_is_the_subset_mean_as_a_percentage() {
        let mut ds = dataset();
        ds.records[0].discount = 0.1;
        ds.records[1].discount = 0.3;
        ds.records[2].discount = 0.8;

        // Mean over the two-record subset, not the whole dataset.
        let kpis = Kpis::compute(&ds, &[0, 1]);
        assert!((kpis.avg_discount - 20.0).abs() < 1e-9);

        let all = Kpis::compute(&ds, &[0, 1, 2, 3]);
        assert!((all.avg_discount - 30.0).abs() < 1e-9);
    }

    #[test]
    fn margin_is_zero_not_nan_for_zero_sales() {
        let ds = dataset();
        // Only the zero-sales row.
        let kpis = Kpis::compute(&ds, &[3]);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.profit_margin, 0.0);
    }

    #[test]
    fn empty_subset_yields_all_zero_kpis() {
        let ds = dataset();
        let kpis = Kpis::compute(&ds, &[]);
        assert_eq!(kpis, Kpis::default());
    }
}
