/// Data layer: core types, selection, and the JSON bundle glue.
///
/// Architecture:
/// ```text
///   bundle.json (binaries only)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bundle → MeasurementTable(s) + detection flags
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ MeasurementTable  │  Vec<MeasurementRow>, column accessors
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  detection flags / metallicity → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
