//! Value parsers for repeated `KEY=VALUE` style flags.

/// `--set f_roads=10,50`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RangeEdit {
    pub(crate) id: String,
    pub(crate) min: f64,
    pub(crate) max: f64,
}

pub(crate) fn parse_range_edit(raw: &str) -> Result<RangeEdit, String> {
    let (id, range) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FILTER=MIN,MAX, got {raw:?}"))?;
    let (min, max) = range
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX after '=', got {range:?}"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err("filter id must not be empty".to_string());
    }
    Ok(RangeEdit {
        id: id.to_string(),
        min: parse_number(min)?,
        max: parse_number(max)?,
    })
}

/// `--weight lcoe=0.5`, `--lcoe capacity_factor=0.3`
pub(crate) fn parse_key_value(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("key must not be empty".to_string());
    }
    Ok((key.to_string(), parse_number(value)?))
}

fn parse_number(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid number {raw:?}: {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{raw:?} is not a finite number"))
    }
}
