/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → BookingDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ BookingDataset │  Vec<Reservation>, sidebar options
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec predicates → filtered rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  per-chart series (overview: whole table)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod overview;
pub mod shared;
