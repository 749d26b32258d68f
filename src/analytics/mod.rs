/// Analytics layer: grouped views, KPI scalars, and the sales forecast.
///
/// Everything here is a pure function of (Dataset, filtered indices) and is
/// recomputed in full on every filter change; no caching, no hidden state.

pub mod aggregate;
pub mod forecast;
pub mod kpi;
