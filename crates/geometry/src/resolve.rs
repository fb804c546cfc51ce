use crate::area::Area;
use crate::error::{GeometryError, Result};
use geo::{BoundingRect, Polygon, Rect};
use rezoning_protocol::{Extent, Resource};

/// Extent to query zones in, plus whether it came from the offshore merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedExtent {
    pub extent: Extent,
    /// Set when the maritime merge ran. The merged box is large enough that the
    /// caller should switch to grid mode; applying that is the caller's decision.
    pub requires_grid: bool,
}

/// Computes the effective query extent of an area for a resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryResolver;

impl GeometryResolver {
    /// Land resources use the area bounds as-is. Offshore wind uses the tightest box
    /// covering the area bounds and every EEZ polygon of the area.
    pub fn resolve(&self, area: &Area, resource: Resource) -> Result<ResolvedExtent> {
        let bounds = area
            .bounds
            .filter(Extent::is_valid)
            .ok_or_else(|| GeometryError::MissingBounds(area.id.clone()))?;

        if !resource.is_offshore() {
            return Ok(ResolvedExtent {
                extent: bounds,
                requires_grid: false,
            });
        }

        Ok(ResolvedExtent {
            extent: merge_envelopes(&area.id, bounds, &area.eez),
            requires_grid: true,
        })
    }
}

/// Union of `bounds` with the envelope of each polygon. Polygons without a usable
/// envelope are skipped, so the result falls back to `bounds`.
#[must_use]
pub fn merge_envelopes(area_id: &str, bounds: Extent, polygons: &[Polygon<f64>]) -> Extent {
    polygons
        .iter()
        .enumerate()
        .filter_map(|(index, polygon)| {
            let envelope = envelope(polygon);
            if envelope.is_none() {
                log::warn!("area {area_id}: skipping malformed maritime zone #{index}");
            }
            envelope
        })
        .fold(bounds, |merged, envelope| merged.union(&envelope))
}

fn envelope(polygon: &Polygon<f64>) -> Option<Extent> {
    let finite = polygon
        .exterior()
        .coords()
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return None;
    }
    polygon.bounding_rect().map(rect_to_extent)
}

fn rect_to_extent(rect: Rect<f64>) -> Extent {
    Extent::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
}
