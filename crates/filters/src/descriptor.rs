use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};

/// Pattern tag of filters the compiler knows how to encode.
pub const RANGE_FILTER: &str = "range_filter";

/// Fallback bounds for range filters whose schema entry has no `range`.
pub const DEFAULT_RANGE: ValueRange = ValueRange {
    min: 0.0,
    max: 1_000_000.0,
};

/// Filter variant as published by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterPattern {
    Range,
    /// Recognized but never compiled into a query.
    Other(String),
}

impl FilterPattern {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Range => RANGE_FILTER,
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::Range)
    }
}

impl From<String> for FilterPattern {
    fn from(raw: String) -> Self {
        if raw == RANGE_FILTER {
            Self::Range
        } else {
            Self::Other(raw)
        }
    }
}

impl From<&str> for FilterPattern {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<FilterPattern> for String {
    fn from(pattern: FilterPattern) -> Self {
        match pattern {
            FilterPattern::Range => RANGE_FILTER.to_string(),
            FilterPattern::Other(raw) => raw,
        }
    }
}

/// Inclusive numeric bounds, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range with equal bounds carries no query information.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl From<[f64; 2]> for ValueRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(range: ValueRange) -> Self {
        [range.min, range.max]
    }
}

/// Current user-set value of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Range { min: f64, max: f64 },
    Toggle(bool),
}

impl FilterValue {
    #[must_use]
    pub const fn from_range(range: ValueRange) -> Self {
        Self::Range {
            min: range.min,
            max: range.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Slider,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInput {
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub value: FilterValue,
}

/// One spatial or economic constraint, with its editable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub category: String,
    pub pattern: FilterPattern,
    /// Bounds published by the schema. Never edited after load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Map layer rendering this filter.
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub active: bool,
    pub visible: bool,
    pub input: FilterInput,
}

impl FilterDescriptor {
    /// Declared range, or [`DEFAULT_RANGE`] when the schema has none.
    #[must_use]
    pub fn effective_range(&self) -> ValueRange {
        self.range.unwrap_or(DEFAULT_RANGE)
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.range.is_some_and(|range| range.is_degenerate())
    }

    /// Whether this filter can ever contribute a query token.
    #[must_use]
    pub fn is_compilable(&self) -> bool {
        self.pattern.is_range() && !self.is_degenerate()
    }

    /// Whether the filter is offered to the user at all.
    #[must_use]
    pub fn is_presentable(&self) -> bool {
        !self.is_degenerate()
    }

    #[must_use]
    pub fn range_value(&self) -> Option<(f64, f64)> {
        match self.input.value {
            FilterValue::Range { min, max } => Some((min, max)),
            FilterValue::Toggle(_) => None,
        }
    }

    /// Flip the active switch. Toggle-style inputs mirror the switch in their value.
    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        if self.input.kind == InputKind::Bool {
            self.input.value = FilterValue::Toggle(self.active);
        }
        self.active
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// User edit from the slider. Edits to inactive filters are ignored and
    /// reported as `Ok(false)`.
    pub fn set_range_value(&mut self, min: f64, max: f64) -> Result<bool> {
        if !self.active {
            log::debug!("ignoring value edit for inactive filter {}", self.id);
            return Ok(false);
        }
        self.assign_value(FilterValue::Range { min, max })?;
        Ok(true)
    }

    /// Store `value`, clamping range bounds into the declared range.
    pub fn assign_value(&mut self, value: FilterValue) -> Result<()> {
        self.input.value = match (self.input.kind, value) {
            (InputKind::Slider, FilterValue::Range { min, max }) => {
                if min.is_nan() || max.is_nan() {
                    return Err(FilterError::invalid_value(&self.id, "bounds must be numbers"));
                }
                if min > max {
                    return Err(FilterError::invalid_value(
                        &self.id,
                        format!("min {min} exceeds max {max}"),
                    ));
                }
                let range = self.effective_range();
                FilterValue::Range {
                    min: range.clamp(min),
                    max: range.clamp(max),
                }
            }
            (InputKind::Bool, FilterValue::Toggle(on)) => FilterValue::Toggle(on),
            (kind, _) => {
                return Err(FilterError::invalid_value(
                    &self.id,
                    format!("value does not match {kind:?} input"),
                ))
            }
        };
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn range_filter(id: &str, range: [f64; 2], value: (f64, f64), active: bool) -> FilterDescriptor {
        FilterDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            info: None,
            category: "distance_filters".to_string(),
            pattern: FilterPattern::Range,
            range: Some(range.into()),
            unit: None,
            layer: id.to_string(),
            priority: None,
            source_url: None,
            active,
            visible: false,
            input: FilterInput {
                kind: InputKind::Slider,
                value: FilterValue::Range {
                    min: value.0,
                    max: value.1,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::range_filter;
    use super::*;

    #[test]
    fn pattern_round_trips_unknown_tags() {
        let pattern: FilterPattern = serde_json::from_str("\"categorical_filter\"").unwrap();
        assert_eq!(pattern, FilterPattern::Other("categorical_filter".into()));
        assert_eq!(serde_json::to_string(&FilterPattern::Range).unwrap(), "\"range_filter\"");
    }

    #[test]
    fn slider_edits_clamp_and_reject_inverted_bounds() {
        let mut filter = range_filter("f_roads", [0.0, 100.0], (0.0, 100.0), true);
        assert!(filter.set_range_value(-10.0, 150.0).unwrap());
        assert_eq!(filter.range_value(), Some((0.0, 100.0)));

        assert!(filter.set_range_value(60.0, 20.0).is_err());
        assert_eq!(filter.range_value(), Some((0.0, 100.0)));
    }

    #[test]
    fn inactive_filters_ignore_slider_edits() {
        let mut filter = range_filter("f_roads", [0.0, 100.0], (0.0, 100.0), false);
        assert!(!filter.set_range_value(10.0, 20.0).unwrap());
        assert_eq!(filter.range_value(), Some((0.0, 100.0)));
    }

    #[test]
    fn bool_inputs_follow_the_switch() {
        let mut filter = range_filter("f_grid", [0.0, 1.0], (0.0, 1.0), false);
        filter.pattern = FilterPattern::Other("bool_filter".into());
        filter.input = FilterInput {
            kind: InputKind::Bool,
            value: FilterValue::Toggle(false),
        };
        assert!(filter.toggle_active());
        assert_eq!(filter.input.value, FilterValue::Toggle(true));
        assert!(!filter.toggle_active());
        assert_eq!(filter.input.value, FilterValue::Toggle(false));
    }

    #[test]
    fn degenerate_ranges_are_neither_shown_nor_compiled() {
        let filter = range_filter("f_fixed", [5.0, 5.0], (5.0, 5.0), true);
        assert!(filter.is_degenerate());
        assert!(!filter.is_compilable());
        assert!(!filter.is_presentable());
    }
}
