use crate::catalog::{FilterCatalog, FilterGroup};
use crate::descriptor::{
    FilterDescriptor, FilterInput, FilterPattern, FilterValue, InputKind, ValueRange, DEFAULT_RANGE,
};
use crate::schema::{FilterSchema, RawFilter};
use std::collections::BTreeSet;

/// Filters the zones backend does not support yet.
pub const UNSUPPORTED_FILTERS: [&str; 4] = [
    "f_capacity_value",
    "f_lcoe_gen",
    "f_lcoe_transmission",
    "f_lcoe_road",
];

/// Group used for schema entries without a `category`.
pub const DEFAULT_CATEGORY: &str = "distance_filters";

/// Turns a raw schema into grouped descriptors with default state.
///
/// The deny-list is the only thing that keeps a filter out of the catalog; filters
/// with patterns the compiler cannot encode are still loaded.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    deny_list: BTreeSet<String>,
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(UNSUPPORTED_FILTERS)
    }
}

impl SchemaNormalizer {
    pub fn new<I, S>(deny_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deny_list: deny_list.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_denied(&self, id: &str) -> bool {
        self.deny_list.contains(id)
    }

    #[must_use]
    pub fn normalize(&self, schema: &FilterSchema) -> FilterCatalog {
        let mut groups: Vec<FilterGroup> = Vec::new();
        let mut denied = 0usize;

        for (id, raw) in schema.iter() {
            if self.is_denied(id) {
                denied += 1;
                continue;
            }
            let descriptor = descriptor_from_raw(id, raw);
            match groups
                .iter_mut()
                .find(|group| group.category == descriptor.category)
            {
                Some(group) => group.filters.push(descriptor),
                None => groups.push(FilterGroup {
                    category: descriptor.category.clone(),
                    filters: vec![descriptor],
                }),
            }
        }

        for group in &mut groups {
            // Stable: equal priorities keep schema order.
            group.filters.sort_by(|a, b| match (a.priority, b.priority) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }

        let catalog = FilterCatalog::new(groups);
        log::info!(
            "Normalized filter schema: {} filters in {} groups ({} unsupported dropped)",
            catalog.len(),
            catalog.groups().len(),
            denied
        );
        catalog
    }
}

/// Normalize with the default deny-list.
#[must_use]
pub fn normalize(schema: &FilterSchema) -> FilterCatalog {
    SchemaNormalizer::default().normalize(schema)
}

fn descriptor_from_raw(id: &str, raw: &RawFilter) -> FilterDescriptor {
    let pattern = FilterPattern::from(raw.pattern.as_str());
    let range = raw.range.map(ValueRange::from);
    let input = if pattern.is_range() {
        FilterInput {
            kind: InputKind::Slider,
            value: FilterValue::from_range(range.unwrap_or(DEFAULT_RANGE)),
        }
    } else {
        FilterInput {
            kind: InputKind::Bool,
            value: FilterValue::Toggle(false),
        }
    };
    FilterDescriptor {
        id: id.to_string(),
        name: if raw.title.is_empty() {
            id.to_string()
        } else {
            raw.title.clone()
        },
        info: Some(raw.description.clone()).filter(|d| !d.is_empty()),
        category: raw
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        pattern,
        range,
        unit: raw.unit.clone(),
        layer: raw.layer.clone().unwrap_or_else(|| id.to_string()),
        priority: raw.priority,
        source_url: raw.source_url.clone(),
        active: false,
        visible: false,
        input,
    }
}
