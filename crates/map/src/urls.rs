use rezoning_filters::CompiledQuery;
use rezoning_protocol::{ApiConfig, Resource};

pub const COLORMAP: &str = "viridis";
/// RGBA used by the API to paint the filtered-area overlay.
pub const OVERLAY_COLOR: &str = "54,166,244,80";
pub const OFFSHORE_MASK_FLAG: &str = "offshore=true";

/// Builds the `{z}/{x}/{y}` tile URL templates served by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrls {
    endpoint: String,
}

impl TileUrls {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.endpoint().to_string(),
        }
    }

    /// Tiles of one filter layer, masked to sea areas for offshore wind.
    #[must_use]
    pub fn layer_tiles(
        &self,
        area_id: &str,
        resource: Resource,
        layer_id: &str,
        fragment: &CompiledQuery,
    ) -> String {
        let offshore = if resource.is_offshore() {
            OFFSHORE_MASK_FLAG
        } else {
            ""
        };
        format!(
            "{}/layers/{area_id}/{}/{layer_id}/{{z}}/{{x}}/{{y}}.png?colormap={COLORMAP}&{fragment}&{offshore}",
            self.endpoint,
            resource.api_name(),
        )
    }

    /// Overlay highlighting everything that passes the full filter set.
    #[must_use]
    pub fn filtered_overlay(&self, fragment: &CompiledQuery) -> String {
        format!(
            "{}/filter/{{z}}/{{x}}/{{y}}.png?{fragment}&color={OVERLAY_COLOR}",
            self.endpoint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rezoning_filters::{compile, FilterSchema};

    fn urls() -> TileUrls {
        TileUrls::new(&ApiConfig::default().with_endpoint("https://api.test/"))
    }

    fn fragment() -> CompiledQuery {
        let schema = FilterSchema::from_json(
            r#"{"f_roads": {"pattern": "range_filter", "range": [0, 100]}}"#,
        )
        .unwrap();
        let mut catalog = rezoning_filters::normalize(&schema);
        catalog.set_active("f_roads", true).unwrap();
        compile(catalog.iter())
    }

    #[test]
    fn layer_tiles_embed_area_resource_layer_and_fragment() {
        assert_eq!(
            urls().layer_tiles("KEN", Resource::SolarPv, "slope", &fragment()),
            "https://api.test/layers/KEN/solar/slope/{z}/{x}/{y}.png?colormap=viridis&f_roads=0,100&"
        );
        assert_eq!(
            urls().layer_tiles("KEN", Resource::OffshoreWind, "slope", &fragment()),
            "https://api.test/layers/KEN/offshore/slope/{z}/{x}/{y}.png?colormap=viridis&f_roads=0,100&offshore=true"
        );
    }

    #[test]
    fn filtered_overlay_uses_fixed_color() {
        assert_eq!(
            urls().filtered_overlay(&fragment()),
            "https://api.test/filter/{z}/{x}/{y}.png?f_roads=0,100&color=54,166,244,80"
        );
    }
}
