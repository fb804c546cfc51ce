use crate::error::{FilterError, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One entry of the `GET /filter/schema` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilter {
    pub pattern: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl RawFilter {
    #[must_use]
    pub fn range(pattern: impl Into<String>, range: Option<[f64; 2]>) -> Self {
        Self {
            pattern: pattern.into(),
            title: String::new(),
            description: String::new(),
            range,
            category: None,
            layer: None,
            unit: None,
            priority: None,
            source_url: None,
        }
    }
}

/// Filter schema keyed by filter id, in the order the server listed them.
///
/// Group order and compile order follow this order. A repeated id keeps its first
/// position and takes the last definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSchema(Vec<(String, RawFilter)>);

impl FilterSchema {
    pub fn from_json(raw: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(raw)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let schema: Self = serde_json::from_slice(raw)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Add or replace a filter; new ids go last.
    pub fn insert(&mut self, id: impl Into<String>, filter: RawFilter) {
        let id = id.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = filter,
            None => self.0.push((id, filter)),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RawFilter> {
        self.0
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, filter)| filter)
    }

    pub fn validate(&self) -> Result<()> {
        for (id, filter) in &self.0 {
            if let Some([min, max]) = filter.range {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(FilterError::InvalidSchemaRange {
                        id: id.clone(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawFilter)> {
        self.0.iter().map(|(id, filter)| (id.as_str(), filter))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RawFilter)> for FilterSchema {
    fn from_iter<I: IntoIterator<Item = (String, RawFilter)>>(iter: I) -> Self {
        let mut schema = Self::default();
        for (id, filter) in iter {
            schema.insert(id, filter);
        }
        schema
    }
}

impl Serialize for FilterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, filter) in &self.0 {
            map.serialize_entry(id, filter)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = FilterSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of filter id to filter definition")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut schema = FilterSchema::default();
                while let Some((id, filter)) = access.next_entry::<String, RawFilter>()? {
                    schema.insert(id, filter);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
