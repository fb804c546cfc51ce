use proptest::prelude::*;
use rezoning_filters::{
    compile, FilterDescriptor, FilterInput, FilterPattern, FilterValue, InputKind, ValueRange,
};

fn descriptor(
    index: usize,
    active: bool,
    is_range: bool,
    bounds: (i32, i32),
    value: (i32, i32),
) -> FilterDescriptor {
    let (lo, hi) = if bounds.0 <= bounds.1 {
        bounds
    } else {
        (bounds.1, bounds.0)
    };
    let (min, max) = if value.0 <= value.1 {
        value
    } else {
        (value.1, value.0)
    };
    let min = min.clamp(lo, hi);
    let max = max.clamp(lo, hi);
    FilterDescriptor {
        id: format!("f_{index}"),
        name: format!("Filter {index}"),
        info: None,
        category: if index % 2 == 0 { "even" } else { "odd" }.to_string(),
        pattern: if is_range {
            FilterPattern::Range
        } else {
            FilterPattern::Other("categorical_filter".into())
        },
        range: Some(ValueRange::new(f64::from(lo), f64::from(hi))),
        unit: None,
        layer: format!("f_{index}"),
        priority: None,
        source_url: None,
        active,
        visible: index % 3 == 0,
        input: FilterInput {
            kind: InputKind::Slider,
            value: FilterValue::Range {
                min: f64::from(min),
                max: f64::from(max),
            },
        },
    }
}

fn filters() -> impl Strategy<Value = Vec<FilterDescriptor>> {
    prop::collection::vec(
        (
            any::<bool>(),
            any::<bool>(),
            (-50i32..50, -50i32..50),
            (-50i32..50, -50i32..50),
        ),
        0..12,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (active, is_range, bounds, value))| {
                descriptor(i, active, is_range, bounds, value)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn one_token_per_compilable_active_filter_in_order(filters in filters()) {
        let query = compile(&filters);
        let expected: Vec<String> = filters
            .iter()
            .filter(|f| f.active && f.pattern.is_range() && !f.is_degenerate())
            .map(|f| {
                let (min, max) = f.range_value().unwrap();
                format!("{}={},{}", f.id, min, max)
            })
            .collect();
        let tokens: Vec<&str> = query.tokens().collect();
        prop_assert_eq!(tokens, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn compilation_is_deterministic(filters in filters()) {
        prop_assert_eq!(compile(&filters).into_string(), compile(&filters).into_string());
    }

    #[test]
    fn visibility_never_changes_the_query(filters in filters()) {
        let mut flipped = filters.clone();
        for filter in &mut flipped {
            filter.visible = !filter.visible;
            filter.category.push_str("_moved");
        }
        prop_assert_eq!(compile(&filters), compile(&flipped));
    }

    #[test]
    fn degenerate_ranges_never_appear(filters in filters()) {
        let query = compile(&filters);
        for filter in filters.iter().filter(|f| f.is_degenerate()) {
            let prefix = format!("{}=", filter.id);
            prop_assert!(!query.tokens().any(|t| t.starts_with(&prefix)));
        }
    }
}
