use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tile or data source as understood by the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// `raster`, `vector`, `geojson`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<String>,
    #[serde(rename = "tileSize", default, skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(rename = "promoteId", default, skip_serializing_if = "Option::is_none")]
    pub promote_id: Option<String>,
}

impl SourceDefinition {
    #[must_use]
    pub fn raster(tiles: impl Into<String>, tile_size: u32) -> Self {
        Self {
            kind: "raster".to_string(),
            tiles: vec![tiles.into()],
            tile_size: Some(tile_size),
            data: None,
            promote_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    None,
}

impl Visibility {
    #[must_use]
    pub const fn from_visible(visible: bool) -> Self {
        if visible {
            Self::Visible
        } else {
            Self::None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::None => "none",
        }
    }
}

/// Style layer; paint and layout properties are opaque to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
}

impl LayerDefinition {
    /// Layout visibility; layers without one are visible.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match self.layout.get("visibility").and_then(Value::as_str) {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        }
    }
}

/// The map widget, seen as a store of sources and ordered layers.
///
/// Every mutation of filter layers goes through
/// [`LayerSourceSynchronizer`](crate::LayerSourceSynchronizer).
pub trait MapSurface {
    fn layer(&self, id: &str) -> Option<LayerDefinition>;
    fn source(&self, id: &str) -> Option<SourceDefinition>;
    fn remove_layer(&mut self, id: &str);
    fn remove_source(&mut self, id: &str);
    fn add_source(&mut self, id: &str, source: SourceDefinition);
    fn add_layer(&mut self, layer: LayerDefinition);
    fn set_layer_visibility(&mut self, id: &str, visibility: Visibility);

    /// Swap the source behind `layer` and reattach the same layer definition.
    ///
    /// Runs under one exclusive borrow so nothing observes the gap between removal
    /// and re-adding. Surfaces with a native batch update should override this.
    fn replace_layer_source(
        &mut self,
        layer: LayerDefinition,
        source_id: &str,
        source: SourceDefinition,
    ) {
        self.remove_layer(&layer.id);
        self.remove_source(source_id);
        self.add_source(source_id, source);
        self.add_layer(layer);
    }
}
