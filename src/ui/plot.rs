use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::analytics::aggregate::AggregationResult;
use crate::data::model::Record;
use crate::state::{AppState, DashboardSummary};

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the KPI strip and chart grid in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales export to view the dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_strip(ui, summary);
            ui.separator();

            chart_heading(ui, "Monthly Sales Trend");
            line_view(ui, "monthly_trend", &summary.monthly_sales);

            chart_heading(ui, "Profit by Sub-Category");
            bar_view(ui, "subcat_profit", &summary.profit_by_sub_category, Color32::LIGHT_BLUE);

            chart_heading(ui, "Sales Distribution by Category");
            category_share_view(ui, state, &summary.category_sales);

            chart_heading(ui, "Sales by Region");
            bar_view(ui, "region_sales", &summary.region_sales, Color32::LIGHT_GREEN);

            chart_heading(ui, "Top 10 Products by Sales");
            horizontal_bar_view(ui, "top_products", &summary.top_products, Color32::GOLD);

            if !summary.state_sales.is_empty() {
                chart_heading(ui, "Sales by State");
                bar_view(ui, "state_sales", &summary.state_sales, Color32::LIGHT_RED);
            }

            chart_heading(ui, "Discount vs Profit");
            scatter_view(ui, state, summary);

            chart_heading(ui, "Sales Forecast (Next 3 Months)");
            forecast_view(ui, summary);
        });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

fn kpi_strip(ui: &mut Ui, summary: &DashboardSummary) {
    let kpis = &summary.kpis;
    let next_month = summary
        .forecast
        .as_ref()
        .ok()
        .and_then(|view| view.next_month())
        .map(|p| format!("${}", thousands(p.value)))
        .unwrap_or_else(|| "–".to_string());

    ui.columns(5, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Sales", format!("${}", thousands(kpis.total_sales)));
        metric(&mut cols[1], "Total Profit", format!("${}", thousands(kpis.total_profit)));
        metric(&mut cols[2], "Avg Discount", format!("{:.2}%", kpis.avg_discount));
        metric(&mut cols[3], "Profit Margin", format!("{:.2}%", kpis.profit_margin));
        metric(&mut cols[4], "Next Month Forecast", next_month);
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(RichText::new(value).strong());
    });
}

/// "12345.6" → "12,346"; keeps the sign, drops the fraction.
fn thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{out}")
    } else {
        out
    }
}

// ---------------------------------------------------------------------------
// Chart builders
// ---------------------------------------------------------------------------

const CHART_HEIGHT: f32 = 220.0;

fn chart_heading(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.strong(title);
}

/// Map a grid-mark position to the group label at that index, or nothing for
/// fractional positions.
fn label_at(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn line_view(ui: &mut Ui, id: &str, data: &AggregationResult) {
    let labels: Vec<String> = data.iter().map(|(k, _)| k.clone()).collect();
    let points: PlotPoints = data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Sales").width(2.0));
        });
}

fn bar_view(ui: &mut Ui, id: &str, data: &AggregationResult, color: Color32) {
    let labels: Vec<String> = data.iter().map(|(k, _)| k.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| Bar::new(i as f64, *v).width(0.6))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

/// Horizontal bars, used for the top-products ranking (long labels).
fn horizontal_bar_view(ui: &mut Ui, id: &str, data: &AggregationResult, color: Color32) {
    // Reverse so the biggest bar ends up on top.
    let labels: Vec<String> = data.iter().rev().map(|(k, _)| k.clone()).collect();
    let bars: Vec<Bar> = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, (_, v))| Bar::new(i as f64, *v).width(0.6))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).horizontal());
        });
}

/// Category share as one coloured bar per category, with a legend.
fn category_share_view(ui: &mut Ui, state: &AppState, data: &AggregationResult) {
    let labels: Vec<String> = data.iter().map(|(k, _)| k.clone()).collect();

    Plot::new("category_share")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            for (i, (category, value)) in data.iter().enumerate() {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(category))
                    .unwrap_or(Color32::GRAY);
                let bar = Bar::new(i as f64, *value).width(0.6);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(category).color(color));
            }
        });
}

/// Discount vs profit, one point per record, coloured by category.
fn scatter_view(ui: &mut Ui, state: &AppState, summary: &DashboardSummary) {
    // Group points per category so each gets one legend entry.
    let mut by_category: std::collections::BTreeMap<&str, Vec<[f64; 2]>> =
        std::collections::BTreeMap::new();
    for point in &summary.scatter {
        by_category
            .entry(point.category.as_str())
            .or_default()
            .push([point.discount, point.profit]);
    }

    Plot::new("discount_profit")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Discount")
        .y_axis_label("Profit")
        .show(ui, |plot_ui| {
            for (category, points) in by_category {
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(category))
                    .unwrap_or(Color32::GRAY);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(category)
                        .color(color)
                        .radius(2.0),
                );
            }
        });
}

/// Actual monthly totals plus the fitted/projected forecast overlay, or the
/// insufficient-history message.
fn forecast_view(ui: &mut Ui, summary: &DashboardSummary) {
    let view = match &summary.forecast {
        Ok(view) => view,
        Err(e) => {
            ui.label(RichText::new(format!("Forecast unavailable: {e}")).color(Color32::YELLOW));
            return;
        }
    };

    let labels: Vec<String> = view
        .actual
        .iter()
        .chain(&view.projected)
        .map(|p| Record::month_key(p.period))
        .collect();

    let actual: PlotPoints = view
        .actual
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.value])
        .collect();
    // Fitted values over the observed months, then the projected future ones.
    let forecast: PlotPoints = view
        .fitted
        .iter()
        .chain(&view.projected)
        .enumerate()
        .map(|(i, p)| [i as f64, p.value])
        .collect();

    Plot::new("sales_forecast")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(actual)
                    .name("Actual Sales")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.line(
                Line::new(forecast)
                    .name("Forecast")
                    .color(Color32::ORANGE)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1234.6), "1,235");
        assert_eq!(thousands(1_234_567.0), "1,234,567");
        assert_eq!(thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn label_at_only_hits_whole_indices() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(label_at(&labels, 0.0), "a");
        assert_eq!(label_at(&labels, 1.0), "b");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, 2.0), "");
        assert_eq!(label_at(&labels, -1.0), "");
    }
}
