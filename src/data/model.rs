use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Dimension – a categorical column used for filtering
// ---------------------------------------------------------------------------

/// The filterable dimensions exposed in the side panel.
///
/// `Sub-Category`, `Product Name` and `State` are grouping keys for charts
/// but are not offered as filters, matching the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    Year,
    Segment,
    Region,
    Category,
}

impl Dimension {
    /// All dimensions in the order they appear in the filter panel.
    pub const ALL: [Dimension; 4] = [
        Dimension::Year,
        Dimension::Segment,
        Dimension::Region,
        Dimension::Category,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Segment => "Segment",
            Dimension::Region => "Region",
            Dimension::Category => "Category",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one validated sales transaction
// ---------------------------------------------------------------------------

/// A single sales transaction (one validated row of the source file).
///
/// `month` and `year` are derived from `order_date` at construction time, so
/// every record in a [`Dataset`] has a well-defined calendar bucket.
#[derive(Debug, Clone)]
pub struct Record {
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub product_name: String,
    /// Present only when the source file carries a `State` column.
    pub state: Option<String>,
    pub sales: f64,
    pub profit: f64,
    /// Discount fraction in `[0, 1]`.
    pub discount: f64,
    /// Derived "YYYY-MM" bucket of `order_date`.
    pub month: String,
    /// Derived calendar year of `order_date`.
    pub year: i32,
}

impl Record {
    /// "YYYY-MM" key for a date, the monthly bucket used everywhere.
    pub fn month_key(date: NaiveDate) -> String {
        format!("{:04}-{:02}", date.year(), date.month())
    }

    /// The record's value on a filter dimension, as the string shown in the
    /// filter panel.
    pub fn dimension_value(&self, dim: Dimension) -> Cow<'_, str> {
        match dim {
            Dimension::Year => Cow::Owned(self.year.to_string()),
            Dimension::Segment => Cow::Borrowed(&self.segment),
            Dimension::Region => Cow::Borrowed(&self.region),
            Dimension::Category => Cow::Borrowed(&self.category),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full validated dataset with pre-computed per-dimension value sets.
///
/// Immutable after construction; it is loaded once per session and every
/// filter change only produces new index lists over it.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All validated records, in file order.
    pub records: Vec<Record>,
    /// For each filter dimension the sorted set of observed distinct values.
    pub unique_values: BTreeMap<Dimension, BTreeSet<String>>,
    /// Rows rejected at load time (unparseable dates or numerics).
    pub skipped_rows: usize,
}

impl Dataset {
    /// Build the per-dimension value index from the validated records.
    pub fn from_records(records: Vec<Record>, skipped_rows: usize) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = BTreeMap::new();

        for rec in &records {
            for dim in Dimension::ALL {
                unique_values
                    .entry(dim)
                    .or_default()
                    .insert(rec.dimension_value(dim).into_owned());
            }
        }

        Dataset {
            records,
            unique_values,
            skipped_rows,
        }
    }

    /// Number of validated records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
