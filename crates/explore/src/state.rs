//! Zone request lifecycle.
//!
//! ```text
//!          begin            complete(ok)
//! Idle ───────────> Fetching ───────────> Fetched
//!  ^                  │  ^                  │
//!  │   invalidate     │  │ begin            │ begin
//!  └──────────────────┘  └──────────────────┘
//!                     │ complete(err)
//!                     └───────────> Failed ──(begin)──> Fetching
//! ```
//!
//! Only the latest dispatch is tracked. A completion is accepted when it is that
//! dispatch (same ticket, same recorded params) and its params still match the active
//! area/resource selection. Anything else is a stale response.

use crate::error::ZoneFetchError;
use rezoning_protocol::{Resource, ZonePayload, ZoneRequestParams};
use std::sync::Arc;

/// Identifies one dispatch. Strictly increasing per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A recorded dispatch: its ticket and the params it was issued with.
#[derive(Debug, Clone)]
pub struct Dispatch {
    ticket: Ticket,
    params: Arc<ZoneRequestParams>,
}

impl Dispatch {
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    #[must_use]
    pub fn params(&self) -> &ZoneRequestParams {
        &self.params
    }

    /// Identity, not value equality: params may hold NaN and must still match
    /// themselves.
    fn is(&self, other: &Dispatch) -> bool {
        self.ticket == other.ticket && Arc::ptr_eq(&self.params, &other.params)
    }
}

#[derive(Debug, Clone, Default)]
pub enum ZoneRequestState {
    #[default]
    Idle,
    Fetching {
        params: Arc<ZoneRequestParams>,
    },
    Fetched {
        params: Arc<ZoneRequestParams>,
        zones: Arc<ZonePayload>,
    },
    Failed {
        params: Arc<ZoneRequestParams>,
        error: Arc<ZoneFetchError>,
    },
}

impl ZoneRequestState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn params(&self) -> Option<&ZoneRequestParams> {
        match self {
            Self::Idle => None,
            Self::Fetching { params }
            | Self::Fetched { params, .. }
            | Self::Failed { params, .. } => Some(&**params),
        }
    }

    #[must_use]
    pub fn zones(&self) -> Option<&ZonePayload> {
        match self {
            Self::Fetched { zones, .. } => Some(&**zones),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ZoneFetchError> {
        match self {
            Self::Failed { error, .. } => Some(&**error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching { .. } => "fetching",
            Self::Fetched { .. } => "fetched",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Superseded, invalidated or no longer for the active selection.
    Discarded,
}

/// Pure zone request state machine plus the session flags derived from it.
#[derive(Debug)]
pub struct RequestOrchestrator {
    state: ZoneRequestState,
    last_ticket: u64,
    in_flight: Option<Dispatch>,
    selection: Option<(String, Resource)>,
    zones_generated: bool,
    input_touched: bool,
}

impl Default for RequestOrchestrator {
    fn default() -> Self {
        Self {
            state: ZoneRequestState::Idle,
            last_ticket: 0,
            in_flight: None,
            selection: None,
            zones_generated: false,
            // Nothing has been generated for the initial inputs yet.
            input_touched: true,
        }
    }
}

impl RequestOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &ZoneRequestState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Set once the first zones arrive and never cleared.
    #[must_use]
    pub fn zones_generated(&self) -> bool {
        self.zones_generated
    }

    /// Inputs changed since the last applied result.
    #[must_use]
    pub fn input_touched(&self) -> bool {
        self.input_touched
    }

    pub fn touch_input(&mut self) {
        self.input_touched = true;
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight.as_ref().map(Dispatch::ticket)
    }

    /// The area/resource pair responses must belong to, once both are chosen.
    #[must_use]
    pub fn selection(&self) -> Option<(&str, Resource)> {
        self.selection
            .as_ref()
            .map(|(area_id, resource)| (area_id.as_str(), *resource))
    }

    /// Record the active selection. A change drops any in-flight request and returns
    /// to idle; returns whether the selection changed.
    pub fn select(&mut self, area_id: Option<&str>, resource: Option<Resource>) -> bool {
        let next = area_id.zip(resource);
        if self.selection() == next {
            return false;
        }
        self.selection = next.map(|(area_id, resource)| (area_id.to_string(), resource));
        self.invalidate();
        true
    }

    /// Record a new dispatch; any earlier one becomes stale.
    pub fn begin(&mut self, params: ZoneRequestParams) -> Dispatch {
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        if let Some(previous) = &self.in_flight {
            log::debug!("zone request #{} supersedes #{}", ticket.0, previous.ticket.0);
        }
        let dispatch = Dispatch {
            ticket,
            params: Arc::new(params),
        };
        self.in_flight = Some(dispatch.clone());
        self.state = ZoneRequestState::Fetching {
            params: Arc::clone(&dispatch.params),
        };
        dispatch
    }

    /// Feed the outcome of `dispatch`.
    ///
    /// A current dispatch whose params no longer match the active selection is
    /// dropped and the state returns to idle.
    pub fn complete(
        &mut self,
        dispatch: &Dispatch,
        outcome: std::result::Result<ZonePayload, ZoneFetchError>,
    ) -> Completion {
        if !self.in_flight.as_ref().is_some_and(|current| current.is(dispatch)) {
            log::debug!("discarding stale zone response #{}", dispatch.ticket.0);
            return Completion::Discarded;
        }
        self.in_flight = None;
        let params = Arc::clone(&dispatch.params);

        let foreign = self
            .selection()
            .is_some_and(|(area_id, resource)| !params.matches_selection(area_id, resource));
        if foreign {
            log::warn!(
                "zone response #{} is for {} ({}), not the active selection",
                dispatch.ticket.0,
                params.area_id,
                params.resource
            );
            self.state = ZoneRequestState::Idle;
            return Completion::Discarded;
        }

        self.state = match outcome {
            Ok(zones) => {
                self.zones_generated = true;
                self.input_touched = false;
                ZoneRequestState::Fetched {
                    params,
                    zones: Arc::new(zones),
                }
            }
            Err(error) => {
                log::warn!("zone generation for {} failed: {error}", params.area_id);
                ZoneRequestState::Failed {
                    params,
                    error: Arc::new(error),
                }
            }
        };
        Completion::Applied
    }

    /// Drop any in-flight request and return to idle. Returns whether a request was
    /// outstanding.
    pub fn invalidate(&mut self) -> bool {
        let dropped = self.in_flight.take();
        if let Some(dispatch) = &dropped {
            log::debug!("invalidated zone request #{}", dispatch.ticket.0);
        }
        self.state = ZoneRequestState::Idle;
        dropped.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rezoning_protocol::{Extent, LcoeParams, Resource, Weights, Zone, ZoneProperties};

    fn params(area: &str, filters: &str) -> ZoneRequestParams {
        ZoneRequestParams {
            area_id: area.into(),
            resource: Resource::SolarPv,
            extent: Extent::new(0.0, 0.0, 1.0, 1.0),
            grid: None,
            filters: filters.into(),
            weights: Weights::default(),
            lcoe: LcoeParams::default(),
        }
    }

    fn zones(count: usize) -> ZonePayload {
        ZonePayload(
            (0..count)
                .map(|i| Zone {
                    id: Some(i.into()),
                    geometry: serde_json::Value::Null,
                    properties: ZoneProperties::default(),
                })
                .collect(),
        )
    }

    #[test]
    fn only_the_latest_dispatch_is_applied() {
        let mut orchestrator = RequestOrchestrator::new();
        let first = orchestrator.begin(params("AAA", "f_a=0,1"));
        let second = orchestrator.begin(params("AAA", "f_a=0,2"));
        assert!(second.ticket() > first.ticket());

        assert_eq!(orchestrator.complete(&first, Ok(zones(1))), Completion::Discarded);
        assert!(orchestrator.is_loading());

        assert_eq!(orchestrator.complete(&second, Ok(zones(2))), Completion::Applied);
        assert_eq!(orchestrator.state().zones().map(ZonePayload::len), Some(2));
        assert_eq!(orchestrator.state().params(), Some(second.params()));
    }

    #[test]
    fn equal_params_from_another_dispatch_are_stale() {
        let mut orchestrator = RequestOrchestrator::new();
        let current = orchestrator.begin(params("AAA", ""));
        let lookalike = Dispatch {
            ticket: current.ticket(),
            params: Arc::new(params("AAA", "")),
        };
        assert_eq!(orchestrator.complete(&lookalike, Ok(zones(1))), Completion::Discarded);
        assert!(orchestrator.is_loading());
        assert_eq!(orchestrator.complete(&current, Ok(zones(1))), Completion::Applied);
    }

    #[test]
    fn nan_inputs_still_complete() {
        let mut orchestrator = RequestOrchestrator::new();
        let mut nan = params("AAA", "");
        nan.weights = Weights::default().with("lcoe", f64::NAN);
        nan.extent = Extent::new(f64::NAN, 0.0, 1.0, 1.0);
        let dispatch = orchestrator.begin(nan);

        assert_eq!(orchestrator.complete(&dispatch, Ok(zones(1))), Completion::Applied);
        assert_eq!(orchestrator.state().name(), "fetched");
        assert_eq!(orchestrator.in_flight(), None);
    }

    #[test]
    fn responses_for_another_selection_are_dropped() {
        let mut orchestrator = RequestOrchestrator::new();
        assert!(orchestrator.select(Some("AAA"), Some(Resource::SolarPv)));
        assert!(!orchestrator.select(Some("AAA"), Some(Resource::SolarPv)));
        assert_eq!(orchestrator.selection(), Some(("AAA", Resource::SolarPv)));

        let foreign = orchestrator.begin(params("BBB", ""));
        assert_eq!(orchestrator.complete(&foreign, Ok(zones(1))), Completion::Discarded);
        assert!(orchestrator.state().is_idle());
        assert_eq!(orchestrator.in_flight(), None);
        assert!(!orchestrator.zones_generated());

        let own = orchestrator.begin(params("AAA", ""));
        assert_eq!(orchestrator.complete(&own, Ok(zones(1))), Completion::Applied);
    }

    #[test]
    fn selection_change_invalidates_in_flight_request() {
        let mut orchestrator = RequestOrchestrator::new();
        orchestrator.select(Some("AAA"), Some(Resource::SolarPv));
        let pending = orchestrator.begin(params("AAA", ""));

        assert!(orchestrator.select(Some("AAA"), Some(Resource::Wind)));
        assert!(orchestrator.state().is_idle());
        assert_eq!(orchestrator.complete(&pending, Ok(zones(1))), Completion::Discarded);
        assert!(orchestrator.state().is_idle());
    }

    #[test]
    fn partial_selection_leaves_responses_unchecked() {
        let mut orchestrator = RequestOrchestrator::new();
        assert!(!orchestrator.select(Some("AAA"), None));
        assert_eq!(orchestrator.selection(), None);
        let dispatch = orchestrator.begin(params("BBB", ""));
        assert_eq!(orchestrator.complete(&dispatch, Ok(zones(0))), Completion::Applied);
    }

    #[test]
    fn invalidate_returns_to_idle_and_rejects_late_responses() {
        let mut orchestrator = RequestOrchestrator::new();
        let dispatch = orchestrator.begin(params("AAA", ""));
        assert!(orchestrator.invalidate());
        assert!(orchestrator.state().is_idle());

        assert_eq!(orchestrator.complete(&dispatch, Ok(zones(3))), Completion::Discarded);
        assert!(orchestrator.state().is_idle());
        assert!(!orchestrator.zones_generated());
        assert!(!orchestrator.invalidate());
    }

    #[test]
    fn failure_is_stored_and_cleared_by_next_success() {
        let mut orchestrator = RequestOrchestrator::new();
        let dispatch = orchestrator.begin(params("AAA", ""));
        orchestrator.complete(&dispatch, Err(ZoneFetchError::Other("boom".into())));
        assert_eq!(orchestrator.state().name(), "failed");
        assert_eq!(orchestrator.state().error().unwrap().to_string(), "boom");
        assert!(orchestrator.input_touched());

        let dispatch = orchestrator.begin(params("AAA", ""));
        assert!(orchestrator.state().error().is_none());
        orchestrator.complete(&dispatch, Ok(zones(0)));
        assert!(orchestrator.state().error().is_none());
        assert_eq!(orchestrator.state().name(), "fetched");
    }

    #[test]
    fn flags_follow_applied_results() {
        let mut orchestrator = RequestOrchestrator::new();
        assert!(orchestrator.input_touched());
        assert!(!orchestrator.zones_generated());

        let dispatch = orchestrator.begin(params("AAA", ""));
        orchestrator.complete(&dispatch, Ok(zones(1)));
        assert!(orchestrator.zones_generated());
        assert!(!orchestrator.input_touched());

        orchestrator.touch_input();
        orchestrator.invalidate();
        assert!(orchestrator.input_touched());
        assert!(orchestrator.zones_generated());
    }
}
