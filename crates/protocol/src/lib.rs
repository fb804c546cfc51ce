//! # REZoning Protocol
//!
//! Wire types shared by every stage of the explore pipeline: the query extent,
//! the resource being explored, scoring weights, LCOE parameters, zone request
//! parameters and the zone payload returned by the API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
mod error;
mod extent;
pub mod zones;

pub use config::ApiConfig;
pub use error::{ProtocolError, Result};
pub use extent::Extent;
pub use zones::{
    GridSpec, LcoeParams, Weights, Zone, ZonePayload, ZoneProperties, ZoneRequestBody,
    ZoneRequestParams, ZoneSummary, GRID_OPTIONS,
};

/// Energy resource a user explores zones for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    #[serde(rename = "Solar PV")]
    SolarPv,
    #[serde(rename = "Wind")]
    Wind,
    #[serde(rename = "Off-Shore Wind")]
    OffshoreWind,
}

impl Resource {
    pub const ALL: [Self; 3] = [Self::SolarPv, Self::Wind, Self::OffshoreWind];

    /// Human readable name, also used as the query-string value by the frontend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolarPv => "Solar PV",
            Self::Wind => "Wind",
            Self::OffshoreWind => "Off-Shore Wind",
        }
    }

    /// Path segment the API expects for this resource.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::SolarPv => "solar",
            Self::Wind => "wind",
            Self::OffshoreWind => "offshore",
        }
    }

    #[must_use]
    pub const fn is_offshore(self) -> bool {
        matches!(self, Self::OffshoreWind)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resource {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self> {
        let needle = raw.trim();
        Self::ALL
            .into_iter()
            .find(|resource| {
                resource.label().eq_ignore_ascii_case(needle)
                    || resource.api_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ProtocolError::UnknownResource(needle.to_string()))
    }
}
