//! # REZoning Explore
//!
//! Ties the filter, geometry and map crates into an exploration session and runs
//! zone generation against the API.
//!
//! ```text
//! ExploreSession
//!     ├─ select_area / select_resource ──> GeometryResolver ──> extent, grid mode
//!     │        └─ ZoneFetcher::select: invalidates the in-flight zone request
//!     ├─ filter edits ──> FilterCatalog (input_touched)
//!     ├─ weight / LCOE edits and presets ──> InputPresets
//!     ├─ sync_layer ──> LayerSourceSynchronizer ──> MapSurface
//!     └─ update_filtered_layer(weights, lcoe)
//!            ├─ compile ──> filtered overlay URL
//!            └─ ZoneFetcher ──> ZoneService (ApiClient)
//!                   └─ RequestOrchestrator: idle → fetching → fetched | failed
//! ```

mod api;
mod error;
mod fetcher;
mod presets;
mod service;
mod session;
mod state;

pub use api::{zones_url, ApiClient};
pub use error::{ExploreError, Result, ZoneFetchError};
pub use fetcher::{LoadingIndicator, NoopIndicator, ZoneFetcher};
pub use presets::InputPresets;
pub use service::ZoneService;
pub use session::ExploreSession;
pub use state::{Completion, Dispatch, RequestOrchestrator, Ticket, ZoneRequestState};
