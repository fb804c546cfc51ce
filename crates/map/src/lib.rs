//! # REZoning Map
//!
//! Map-side plumbing: tile URL templates and the layer/source swaps that keep the
//! map widget's filter layers in step with the filters.
//!
//! The map widget itself is external and reached through [`MapSurface`];
//! [`InMemoryMap`] is a headless surface for tools and tests.

mod memory;
mod surface;
mod sync;
mod urls;

pub use memory::{InMemoryMap, MapOp};
pub use surface::{LayerDefinition, MapSurface, SourceDefinition, Visibility};
pub use sync::{source_id, LayerSourceSynchronizer, SyncOutcome, SOURCE_SUFFIX};
pub use urls::{TileUrls, COLORMAP, OFFSHORE_MASK_FLAG, OVERLAY_COLOR};
