/// Data layer: the filter-and-aggregate pipeline both dashboards share.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, validate schema → RawTable
///   └──────────┘
///        │           (cache: one read per path and TTL window)
///        ▼
///   ┌────────────┐
///   │ normalize   │  coerce rank, trim categories, sort → RecordTable
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Todos/value predicates + winners-only → indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  KPI summary, top-N ranking, group means
///   └────────────┘
/// ```
pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
