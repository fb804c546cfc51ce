use crate::descriptor::{FilterDescriptor, FilterValue};
use std::fmt;

/// Canonical query-string encoding of an active filter set, e.g.
/// `f_roads=0,50&f_slope=0,10`.
///
/// Always derived from descriptors through [`compile`]; an empty query is valid and
/// means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompiledQuery(String);

impl CompiledQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split('&').filter(|token| !token.is_empty())
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompiledQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CompiledQuery> for String {
    fn from(query: CompiledQuery) -> Self {
        query.0
    }
}

/// Compile filters, in the given order, into a query fragment.
///
/// A filter emits `{id}={min},{max}` only when it is active, a `range_filter`, and
/// its declared range is not degenerate. Everything else is skipped silently.
pub fn compile<'a, I>(filters: I) -> CompiledQuery
where
    I: IntoIterator<Item = &'a FilterDescriptor>,
{
    let tokens: Vec<String> = filters.into_iter().filter_map(token).collect();
    CompiledQuery(tokens.join("&"))
}

/// Fragment for a single filter, as embedded in that filter's own layer tiles.
#[must_use]
pub fn compile_layer(filter: &FilterDescriptor) -> CompiledQuery {
    compile(std::iter::once(filter))
}

fn token(filter: &FilterDescriptor) -> Option<String> {
    if !filter.active || !filter.is_compilable() {
        return None;
    }
    match filter.input.value {
        FilterValue::Range { min, max } => Some(format!(
            "{}={},{}",
            filter.id,
            format_number(min),
            format_number(max)
        )),
        FilterValue::Toggle(_) => {
            log::debug!("range filter {} holds a toggle value, skipping", filter.id);
            None
        }
    }
}

/// Shortest round-trip decimal, switching to exponent form (`1e+21`, `1.5e-7`)
/// outside `[1e-6, 1e21)` to match the web client's number formatting.
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::range_filter;
    use crate::descriptor::FilterPattern;
    use pretty_assertions::assert_eq;

    #[test]
    fn emits_only_active_range_filters() {
        let filters = vec![
            range_filter("a", [0.0, 100.0], (10.0, 50.0), true),
            range_filter("b", [0.0, 100.0], (0.0, 100.0), false),
        ];
        assert_eq!(compile(&filters).as_str(), "a=10,50");
    }

    #[test]
    fn empty_input_is_an_unconstrained_query() {
        let filters: Vec<FilterDescriptor> = Vec::new();
        let query = compile(&filters);
        assert!(query.is_empty());
        assert_eq!(query.tokens().count(), 0);
    }

    #[test]
    fn keeps_input_order_and_skips_other_patterns() {
        let mut other = range_filter("c", [0.0, 1.0], (0.0, 1.0), true);
        other.pattern = FilterPattern::Other("categorical_filter".into());
        let filters = vec![
            range_filter("z", [0.0, 10.0], (1.5, 2.25), true),
            other,
            range_filter("a", [-5.0, 5.0], (-5.0, 0.0), true),
        ];
        let query = compile(&filters);
        assert_eq!(query.as_str(), "z=1.5,2.25&a=-5,0");
        assert_eq!(query.tokens().collect::<Vec<_>>(), vec!["z=1.5,2.25", "a=-5,0"]);
    }

    #[test]
    fn degenerate_range_is_never_compiled() {
        for active in [true, false] {
            let filters = vec![range_filter("fixed", [5.0, 5.0], (5.0, 5.0), active)];
            assert_eq!(compile(&filters).as_str(), "");
        }
    }

    #[test]
    fn ignores_visibility_category_and_text() {
        let base = range_filter("a", [0.0, 100.0], (10.0, 50.0), true);
        let mut decorated = base.clone();
        decorated.visible = true;
        decorated.category = "land_use".into();
        decorated.name = "Something else".into();
        decorated.info = Some("described".into());
        assert_eq!(compile([&base]), compile([&decorated]));
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");

        let filter = range_filter("f_pop", [0.0, 1e22], (1e-7, 1e22), true);
        assert_eq!(compile_layer(&filter).as_str(), "f_pop=1e-7,1e+22");
    }

    #[test]
    fn layer_fragment_covers_one_filter() {
        let filter = range_filter("f_slope", [0.0, 45.0], (0.0, 12.0), true);
        assert_eq!(compile_layer(&filter).as_str(), "f_slope=0,12");

        let inactive = range_filter("f_slope", [0.0, 45.0], (0.0, 12.0), false);
        assert!(compile_layer(&inactive).is_empty());
    }
}
