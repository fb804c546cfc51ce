//! # REZoning Geometry
//!
//! Selectable areas and the extent zones are generated in.
//!
//! ```text
//! areas.json ──┐
//!              ├──> build_areas ──> [Area { bounds, eez }]
//! eez.topojson ┘                        │
//!                                        └──> GeometryResolver::resolve(area, resource)
//!                                               ├─ land:     area bounds
//!                                               └─ offshore: bounds ∪ EEZ envelopes
//! ```

mod area;
mod error;
mod resolve;
mod topology;

pub use area::{build_areas, find_area, load_areas, Area, AreaKind, RawArea};
pub use error::{GeometryError, Result};
pub use resolve::{merge_envelopes, GeometryResolver, ResolvedExtent};
pub use topology::{EezIndex, EEZ_OBJECT, TERRITORY_KEY};
