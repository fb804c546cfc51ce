use crate::catalog::FilterCatalog;
use crate::descriptor::FilterValue;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name that always restores the schema defaults.
pub const RESET_PRESET: &str = "reset";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub id: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

/// Named snapshot of filter switches and values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub name: String,
    pub entries: Vec<PresetEntry>,
}

impl FilterPreset {
    /// Capture the active filters of `catalog`.
    #[must_use]
    pub fn capture(name: impl Into<String>, catalog: &FilterCatalog) -> Self {
        Self {
            name: name.into(),
            entries: catalog
                .active()
                .map(|filter| PresetEntry {
                    id: filter.id.clone(),
                    active: true,
                    value: Some(filter.input.value),
                })
                .collect(),
        }
    }
}

/// Presets owned by the explore session.
///
/// Created right after the schema loads, from the normalized defaults; presets are
/// registered explicitly and applying one yields a replacement catalog.
#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    defaults: FilterCatalog,
    presets: BTreeMap<String, FilterPreset>,
}

impl PresetStore {
    #[must_use]
    pub fn new(defaults: FilterCatalog) -> Self {
        Self {
            defaults,
            presets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn defaults(&self) -> &FilterCatalog {
        &self.defaults
    }

    pub fn insert(&mut self, preset: FilterPreset) {
        log::debug!("registering filter preset {}", preset.name);
        self.presets.insert(preset.name.clone(), preset);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Build the catalog for `name`: the schema defaults with the preset applied.
    /// Entries naming filters missing from the schema are skipped.
    pub fn apply(&self, name: &str) -> Result<FilterCatalog> {
        let mut catalog = self.defaults.clone();
        if name == RESET_PRESET {
            return Ok(catalog);
        }
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| FilterError::UnknownPreset(name.to_string()))?;
        for entry in &preset.entries {
            let Some(filter) = catalog.get_mut(&entry.id) else {
                log::warn!("preset {name} references unknown filter {}", entry.id);
                continue;
            };
            filter.active = entry.active;
            if let Some(value) = entry.value {
                filter.assign_value(value)?;
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::schema::FilterSchema;

    fn store() -> PresetStore {
        let schema = FilterSchema::from_json(
            r#"{
                "f_roads": {"pattern": "range_filter", "range": [0, 300]},
                "f_slope": {"pattern": "range_filter", "range": [0, 45]}
            }"#,
        )
        .unwrap();
        PresetStore::new(normalize(&schema))
    }

    #[test]
    fn applying_a_preset_replaces_switches_and_values() {
        let mut store = store();
        store.insert(FilterPreset {
            name: "Flat land".into(),
            entries: vec![
                PresetEntry {
                    id: "f_slope".into(),
                    active: true,
                    value: Some(FilterValue::Range { min: 0.0, max: 5.0 }),
                },
                PresetEntry {
                    id: "f_gone".into(),
                    active: true,
                    value: None,
                },
            ],
        });
        let catalog = store.apply("Flat land").unwrap();
        assert_eq!(catalog.compile().as_str(), "f_slope=0,5");
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Flat land"]);
    }

    #[test]
    fn reset_returns_defaults_and_unknown_names_fail() {
        let store = store();
        assert_eq!(&store.apply(RESET_PRESET).unwrap(), store.defaults());
        assert!(matches!(
            store.apply("Optimization"),
            Err(FilterError::UnknownPreset(_))
        ));
    }

    #[test]
    fn capture_then_apply_reproduces_the_query() {
        let mut store = store();
        let mut edited = store.defaults().clone();
        edited.set_active("f_roads", true).unwrap();
        edited.set_range_value("f_roads", 10.0, 20.0).unwrap();
        store.insert(FilterPreset::capture("mine", &edited));
        assert_eq!(store.apply("mine").unwrap().compile(), edited.compile());
    }
}
