use crate::compile::{compile, CompiledQuery};
use crate::descriptor::{FilterDescriptor, FilterValue};
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};

/// Filters sharing a category, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub category: String,
    pub filters: Vec<FilterDescriptor>,
}

impl FilterGroup {
    /// Display title: `distance_filters` becomes `Distance Filters`.
    #[must_use]
    pub fn title(&self) -> String {
        self.category
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Filters worth showing; degenerate ranges are hidden.
    pub fn presentable(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.iter().filter(|f| f.is_presentable())
    }
}

/// Every loaded filter, grouped by category in a fixed order.
///
/// Built once per schema load (or preset application) and edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCatalog {
    groups: Vec<FilterGroup>,
}

impl FilterCatalog {
    #[must_use]
    pub fn new(groups: Vec<FilterGroup>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// All descriptors, group by group.
    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.groups.iter().flat_map(|group| group.filters.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FilterDescriptor> {
        self.groups.iter_mut().flat_map(|group| group.filters.iter_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.filters.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FilterDescriptor> {
        self.iter().find(|filter| filter.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FilterDescriptor> {
        self.iter_mut().find(|filter| filter.id == id)
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut FilterDescriptor> {
        self.get_mut(id)
            .ok_or_else(|| FilterError::UnknownFilter(id.to_string()))
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        let filter = self.require_mut(id)?;
        if filter.active != active {
            filter.toggle_active();
        }
        Ok(())
    }

    pub fn toggle_active(&mut self, id: &str) -> Result<bool> {
        Ok(self.require_mut(id)?.toggle_active())
    }

    /// Slider edit. Returns `Ok(false)` when the filter is inactive and the edit
    /// was ignored.
    pub fn set_range_value(&mut self, id: &str, min: f64, max: f64) -> Result<bool> {
        self.require_mut(id)?.set_range_value(min, max)
    }

    pub fn assign_value(&mut self, id: &str, value: FilterValue) -> Result<()> {
        self.require_mut(id)?.assign_value(value)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        self.require_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn toggle_visible(&mut self, id: &str) -> Result<bool> {
        Ok(self.require_mut(id)?.toggle_visible())
    }

    pub fn active(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.iter().filter(|filter| filter.active)
    }

    /// Fresh compilation of the whole catalog.
    #[must_use]
    pub fn compile(&self) -> CompiledQuery {
        compile(self.iter())
    }
}
