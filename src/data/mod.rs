/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, per-dimension value index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply dimension selections → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
