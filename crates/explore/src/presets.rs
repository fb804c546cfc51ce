use crate::error::{ExploreError, Result};
use rezoning_filters::RESET_PRESET;
use std::collections::BTreeMap;

/// Named value sets for one input section (weights or LCOE), plus `reset` back to
/// the defaults the session started with.
#[derive(Debug, Clone)]
pub struct InputPresets<T> {
    section: &'static str,
    defaults: T,
    presets: BTreeMap<String, T>,
}

impl<T: Clone> InputPresets<T> {
    #[must_use]
    pub fn new(section: &'static str, defaults: T) -> Self {
        Self {
            section,
            defaults,
            presets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn section(&self) -> &'static str {
        self.section
    }

    #[must_use]
    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    pub fn insert(&mut self, name: impl Into<String>, values: T) {
        let name = name.into();
        log::debug!("registering {} preset {name}", self.section);
        self.presets.insert(name, values);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Values for `name`; `reset` yields the defaults.
    pub fn apply(&self, name: &str) -> Result<T> {
        if name == RESET_PRESET {
            return Ok(self.defaults.clone());
        }
        self.presets
            .get(name)
            .cloned()
            .ok_or_else(|| ExploreError::UnknownPreset {
                section: self.section,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rezoning_protocol::Weights;

    #[test]
    fn named_presets_replace_and_reset_restores() {
        let defaults = Weights::default().with("lcoe", 0.5).with("jobs", 0.5);
        let mut presets = InputPresets::new("weights", defaults.clone());
        presets.insert("Cheapest", Weights::default().with("lcoe", 1.0));

        assert_eq!(presets.apply("Cheapest").unwrap().get("jobs"), None);
        assert_eq!(presets.apply("reset").unwrap(), defaults);
        assert_eq!(presets.names().collect::<Vec<_>>(), vec!["Cheapest"]);

        let err = presets.apply("Greenest").unwrap_err();
        assert_eq!(err.to_string(), "Unknown weights preset: Greenest");
    }
}
