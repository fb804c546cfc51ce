//! # REZoning Filters
//!
//! Spatial filter handling for zone exploration.
//!
//! ## Pipeline
//!
//! ```text
//! GET /filter/schema
//!     │
//!     ├──> FilterSchema (serde)
//!     │
//!     ├──> SchemaNormalizer
//!     │      ├─ drop unsupported ids
//!     │      └─> FilterCatalog [(category, [FilterDescriptor])]
//!     │
//!     └──> compile()
//!            └─> CompiledQuery "f_roads=0,50&f_slope=0,10"
//! ```
//!
//! ## Example
//!
//! ```
//! use rezoning_filters::{normalize, FilterSchema};
//!
//! let schema = FilterSchema::from_json(
//!     r#"{"f_roads": {"pattern": "range_filter", "title": "Roads", "range": [0, 100]}}"#,
//! )?;
//! let mut catalog = normalize(&schema);
//! catalog.set_active("f_roads", true)?;
//! catalog.set_range_value("f_roads", 10.0, 50.0)?;
//! assert_eq!(catalog.compile().as_str(), "f_roads=10,50");
//! # Ok::<(), rezoning_filters::FilterError>(())
//! ```

mod catalog;
mod compile;
mod descriptor;
mod error;
mod normalize;
mod presets;
mod schema;

pub use catalog::{FilterCatalog, FilterGroup};
pub use compile::{compile, compile_layer, CompiledQuery};
pub use descriptor::{
    FilterDescriptor, FilterInput, FilterPattern, FilterValue, InputKind, ValueRange,
    DEFAULT_RANGE, RANGE_FILTER,
};
pub use error::{FilterError, Result};
pub use normalize::{normalize, SchemaNormalizer, DEFAULT_CATEGORY, UNSUPPORTED_FILTERS};
pub use presets::{FilterPreset, PresetEntry, PresetStore, RESET_PRESET};
pub use schema::{FilterSchema, RawFilter};
