use crate::error::Result;
use crate::topology::EezIndex;
use geo::Polygon;
use rezoning_protocol::Extent;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entry of the bundled area list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArea {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `"west,south,east,north"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AreaKind {
    Country,
    /// Any custom region type published by the area list.
    Custom(String),
}

impl From<String> for AreaKind {
    fn from(raw: String) -> Self {
        if raw == "country" {
            Self::Country
        } else {
            Self::Custom(raw)
        }
    }
}

impl From<AreaKind> for String {
    fn from(kind: AreaKind) -> Self {
        match kind {
            AreaKind::Country => "country".to_string(),
            AreaKind::Custom(raw) => raw,
        }
    }
}

/// A selectable geographic unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub kind: AreaKind,
    pub bounds: Option<Extent>,
    /// Maritime zones of a country, looked up once when the list is built.
    pub eez: Vec<Polygon<f64>>,
}

impl Area {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: AreaKind, bounds: Option<Extent>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            bounds,
            eez: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_country(&self) -> bool {
        self.kind == AreaKind::Country
    }
}

/// Turn the raw list into areas: countries are keyed by `gid` and receive their EEZ
/// polygons, bounds strings are parsed. Entries without an id are dropped and
/// unparsable bounds become `None`.
#[must_use]
pub fn build_areas(raw: Vec<RawArea>, eez: &EezIndex) -> Vec<Area> {
    raw.into_iter()
        .filter_map(|entry| {
            let kind = AreaKind::from(entry.kind);
            let id = match kind {
                AreaKind::Country => entry.gid.clone().or_else(|| entry.id.as_ref().and_then(id_string)),
                AreaKind::Custom(_) => entry.id.as_ref().and_then(id_string).or_else(|| entry.gid.clone()),
            };
            let Some(id) = id else {
                log::warn!("skipping area {:?} without an id", entry.name);
                return None;
            };
            let bounds = entry.bounds.as_deref().and_then(|raw| match raw.parse::<Extent>() {
                Ok(extent) => Some(extent),
                Err(err) => {
                    log::warn!("area {id}: {err}");
                    None
                }
            });
            let eez = if kind == AreaKind::Country {
                eez.polygons(&id).to_vec()
            } else {
                Vec::new()
            };
            Some(Area {
                id,
                name: entry.name,
                kind,
                bounds,
                eez,
            })
        })
        .collect()
}

/// Load the area list and, when given, the EEZ topology it is merged with.
pub async fn load_areas(areas_path: impl AsRef<Path>, eez_path: Option<&Path>) -> Result<Vec<Area>> {
    let raw = tokio::fs::read(areas_path.as_ref()).await?;
    let entries: Vec<RawArea> = serde_json::from_slice(&raw)?;
    let eez = match eez_path {
        Some(path) => EezIndex::load(path).await?,
        None => EezIndex::default(),
    };
    let areas = build_areas(entries, &eez);
    log::info!(
        "Loaded {} areas ({} with maritime zones)",
        areas.len(),
        areas.iter().filter(|a| !a.eez.is_empty()).count()
    );
    Ok(areas)
}

#[must_use]
pub fn find_area<'a>(areas: &'a [Area], id: &str) -> Option<&'a Area> {
    areas.iter().find(|area| area.id == id)
}

fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};
    use pretty_assertions::assert_eq;

    fn square(x: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 0.0)]),
            Vec::new(),
        )
    }

    #[test]
    fn countries_use_gid_and_receive_eez() {
        let mut eez = EezIndex::default();
        eez.insert("KEN", square(40.0));
        let raw: Vec<RawArea> = serde_json::from_str(
            r#"[
                {"gid": "KEN", "name": "Kenya", "type": "country", "bounds": "33.9,-4.7,41.9,5.0"},
                {"id": 7, "name": "Rift Valley", "type": "region", "bounds": "35,-1,37,2"},
                {"name": "Nowhere", "type": "region"},
                {"gid": "XXX", "name": "Broken", "type": "country", "bounds": "1,2"}
            ]"#,
        )
        .unwrap();

        let areas = build_areas(raw, &eez);
        let ids: Vec<_> = areas.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["KEN", "7", "XXX"]);

        let kenya = find_area(&areas, "KEN").unwrap();
        assert!(kenya.is_country());
        assert_eq!(kenya.eez.len(), 1);
        assert_eq!(kenya.bounds, Some(Extent::new(33.9, -4.7, 41.9, 5.0)));

        let region = find_area(&areas, "7").unwrap();
        assert_eq!(region.kind, AreaKind::Custom("region".into()));
        assert!(region.eez.is_empty());

        assert_eq!(find_area(&areas, "XXX").unwrap().bounds, None);
    }
}
