use std::collections::BTreeMap;

use crate::data::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Grouped views over the filtered subset
// ---------------------------------------------------------------------------

/// One grouped-and-reduced view: (group key, reduced value) pairs in final
/// display order.  Recomputed from scratch on every filter change.
pub type AggregationResult = Vec<(String, f64)>;

/// One point of the discount-vs-profit scatter, tagged with its category so
/// the plot can colour it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub discount: f64,
    pub profit: f64,
    pub category: String,
}

/// Group the selected records by `key` and sum `measure` per group.
/// `BTreeMap` keeps the result ordered by key.
fn grouped_sum<'a, K, M>(
    dataset: &'a Dataset,
    indices: &[usize],
    key: K,
    measure: M,
) -> BTreeMap<String, f64>
where
    K: Fn(&'a Record) -> Option<&'a str>,
    M: Fn(&Record) -> f64,
{
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        if let Some(k) = key(rec) {
            *groups.entry(k.to_string()).or_insert(0.0) += measure(rec);
        }
    }
    groups
}

/// Sort ascending by value; ties break on the key so output is reproducible.
fn sorted_by_value(groups: BTreeMap<String, f64>) -> AggregationResult {
    let mut result: AggregationResult = groups.into_iter().collect();
    result.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    result
}

/// Sum of profit per sub-category, ascending by value (worst performers
/// first, as in the bar chart).
pub fn profit_by_sub_category(dataset: &Dataset, indices: &[usize]) -> AggregationResult {
    sorted_by_value(grouped_sum(
        dataset,
        indices,
        |r| Some(r.sub_category.as_str()),
        |r| r.profit,
    ))
}

/// Sum of sales per "YYYY-MM" month, chronological.
pub fn monthly_sales(dataset: &Dataset, indices: &[usize]) -> AggregationResult {
    grouped_sum(dataset, indices, |r| Some(r.month.as_str()), |r| r.sales)
        .into_iter()
        .collect()
}

/// Sum of sales per category, ordered by key.
pub fn category_sales(dataset: &Dataset, indices: &[usize]) -> AggregationResult {
    grouped_sum(dataset, indices, |r| Some(r.category.as_str()), |r| r.sales)
        .into_iter()
        .collect()
}

/// Sum of sales per region, ascending by value.
pub fn region_sales(dataset: &Dataset, indices: &[usize]) -> AggregationResult {
    sorted_by_value(grouped_sum(
        dataset,
        indices,
        |r| Some(r.region.as_str()),
        |r| r.sales,
    ))
}

/// Top `limit` products by total sales, descending.
pub fn top_products(dataset: &Dataset, indices: &[usize], limit: usize) -> AggregationResult {
    let mut result: AggregationResult = grouped_sum(
        dataset,
        indices,
        |r| Some(r.product_name.as_str()),
        |r| r.sales,
    )
    .into_iter()
    .collect();
    result.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    result.truncate(limit);
    result
}

/// Sum of sales per state, ordered by key.  Records without a state column
/// value are left out of this view.
pub fn state_sales(dataset: &Dataset, indices: &[usize]) -> AggregationResult {
    grouped_sum(dataset, indices, |r| r.state.as_deref(), |r| r.sales)
        .into_iter()
        .collect()
}

/// Per-record (discount, profit) pairs for the scatter view; no reduction.
pub fn discount_profit_points(dataset: &Dataset, indices: &[usize]) -> Vec<ScatterPoint> {
    indices
        .iter()
        .map(|&i| {
            let rec = &dataset.records[i];
            ScatterPoint {
                discount: rec.discount,
                profit: rec.profit,
                category: rec.category.clone(),
            }
        })
        .collect()
}
