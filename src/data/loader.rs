use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with the Superstore column names (recommended)
/// * `.json` – records-oriented array with the same field names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Columns that must be present in every input file.
const REQUIRED_COLUMNS: &[&str] = &[
    "Order Date",
    "Ship Date",
    "Region",
    "Category",
    "Sub-Category",
    "Segment",
    "Product Name",
    "Sales",
    "Profit",
    "Discount",
];

/// Date formats accepted for Order Date / Ship Date.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// ---------------------------------------------------------------------------
// Raw row → validated Record
// ---------------------------------------------------------------------------

/// One row as it appears in the source file, before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Order Date")]
    order_date: String,
    #[serde(rename = "Ship Date")]
    ship_date: String,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Sub-Category")]
    sub_category: String,
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "Product Name")]
    product_name: String,
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "Sales")]
    sales: f64,
    #[serde(rename = "Profit")]
    profit: f64,
    #[serde(rename = "Discount")]
    discount: f64,
}

impl RawRecord {
    /// Validate the raw row into a [`Record`] with derived Month/Year, or
    /// explain why it must be excluded.
    fn validate(self) -> std::result::Result<Record, String> {
        let order_date = parse_date(&self.order_date)
            .ok_or_else(|| format!("unparseable Order Date '{}'", self.order_date))?;
        let ship_date = parse_date(&self.ship_date)
            .ok_or_else(|| format!("unparseable Ship Date '{}'", self.ship_date))?;

        let month = Record::month_key(order_date);
        let year = order_date.year();

        Ok(Record {
            order_date,
            ship_date,
            region: self.region,
            category: self.category,
            sub_category: self.sub_category,
            segment: self.segment,
            product_name: self.product_name,
            state: self.state.filter(|s| !s.trim().is_empty()),
            sales: self.sales,
            profit: self.profit,
            discount: self.discount,
            month,
            year,
        })
    }
}

/// Collect validated records, skipping and counting rejected rows.
///
/// Rows with unparseable dates or numerics never reach the aggregations;
/// they are excluded here and reported via `Dataset::skipped_rows`.
fn collect_records(
    rows: impl Iterator<Item = std::result::Result<RawRecord, String>>,
) -> Result<Dataset> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_no, row) in rows.enumerate() {
        match row.and_then(RawRecord::validate) {
            Ok(rec) => records.push(rec),
            Err(reason) => {
                log::warn!("Skipping row {row_no}: {reason}");
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        bail!("no valid records in input ({skipped} rows skipped)");
    }

    Ok(Dataset::from_records(records, skipped))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    read_csv(file)
}

/// Parse CSV from any reader.  Split out from [`load_csv`] so tests can run
/// against in-memory strings.
fn read_csv<R: Read>(rdr: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(rdr);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing required column '{required}'");
        }
    }

    collect_records(
        reader
            .deserialize::<RawRecord>()
            .map(|row| row.map_err(|e| e.to_string())),
    )
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Order Date": "2017-03-09",
///     "Ship Date": "2017-03-12",
///     "Region": "East",
///     "Category": "Technology",
///     "Sub-Category": "Phones",
///     "Segment": "Consumer",
///     "Product Name": "Example Phone",
///     "Sales": 499.99,
///     "Profit": 120.0,
///     "Discount": 0.1
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading JSON file {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let JsonValue::Array(rows) = root else {
        bail!("Expected top-level JSON array");
    };

    collect_records(rows.into_iter().map(|row| {
        serde_json::from_value::<RawRecord>(row).map_err(|e| e.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order Date,Ship Date,Region,Category,Sub-Category,Segment,Product Name,State,Sales,Profit,Discount";

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 3, 9).unwrap();
        assert_eq!(parse_date("2017-03-09"), Some(expected));
        assert_eq!(parse_date("03/09/2017"), Some(expected));
        assert_eq!(parse_date("09-03-2017"), Some(expected));
        assert_eq!(parse_date("ninth of march"), None);
    }

    #[test]
    fn read_csv_builds_typed_records() {
        let csv = format!(
            "{HEADER}\n\
             2017-03-09,2017-03-12,East,Technology,Phones,Consumer,Example Phone,New York,499.99,120.0,0.1\n\
             2017-04-01,2017-04-03,West,Furniture,Chairs,Corporate,Example Chair,,250.0,-30.0,0.2\n"
        );

        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped_rows, 0);

        let first = &ds.records[0];
        assert_eq!(first.month, "2017-03");
        assert_eq!(first.year, 2017);
        assert_eq!(first.state.as_deref(), Some("New York"));
        assert_eq!(ds.records[1].state, None);
    }

    #[test]
    fn invalid_rows_are_skipped_and_counted() {
        let csv = format!(
            "{HEADER}\n\
             2017-03-09,2017-03-12,East,Technology,Phones,Consumer,Phone,NY,499.99,120.0,0.1\n\
             not-a-date,2017-04-03,West,Furniture,Chairs,Corporate,Chair,,250.0,-30.0,0.2\n\
             2017-05-01,2017-05-02,South,Furniture,Tables,Consumer,Table,,oops,1.0,0.0\n"
        );

        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows, 2);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "Order Date,Region\n2017-03-09,East\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Ship Date"), "{err}");
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let csv = format!(
            "{HEADER}\n\
             nope,2017-04-03,West,Furniture,Chairs,Corporate,Chair,,250.0,-30.0,0.2\n"
        );
        assert!(read_csv(csv.as_bytes()).is_err());
    }
}
