use crate::surface::{LayerDefinition, MapSurface, SourceDefinition, Visibility};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mutation applied to an [`InMemoryMap`], recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOp {
    RemoveLayer(String),
    RemoveSource(String),
    AddSource(String),
    AddLayer(String),
    ReplaceLayerSource { layer: String, source: String },
    SetVisibility { layer: String, visibility: Visibility },
}

/// Headless map surface: keeps the style in memory and records every mutation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMap {
    sources: BTreeMap<String, SourceDefinition>,
    layers: Vec<LayerDefinition>,
    ops: Vec<MapOp>,
}

impl InMemoryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a source/layer pair without recording it.
    #[must_use]
    pub fn with_layer(mut self, source_id: &str, source: SourceDefinition, layer: LayerDefinition) -> Self {
        self.sources.insert(source_id.to_string(), source);
        self.layers.push(layer);
        self
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerDefinition] {
        &self.layers
    }

    #[must_use]
    pub fn ops(&self) -> &[MapOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl MapSurface for InMemoryMap {
    fn layer(&self, id: &str) -> Option<LayerDefinition> {
        self.layers.iter().find(|layer| layer.id == id).cloned()
    }

    fn source(&self, id: &str) -> Option<SourceDefinition> {
        self.sources.get(id).cloned()
    }

    fn remove_layer(&mut self, id: &str) {
        self.layers.retain(|layer| layer.id != id);
        self.ops.push(MapOp::RemoveLayer(id.to_string()));
    }

    fn remove_source(&mut self, id: &str) {
        self.sources.remove(id);
        self.ops.push(MapOp::RemoveSource(id.to_string()));
    }

    fn add_source(&mut self, id: &str, source: SourceDefinition) {
        self.sources.insert(id.to_string(), source);
        self.ops.push(MapOp::AddSource(id.to_string()));
    }

    fn add_layer(&mut self, layer: LayerDefinition) {
        self.ops.push(MapOp::AddLayer(layer.id.clone()));
        self.layers.push(layer);
    }

    fn set_layer_visibility(&mut self, id: &str, visibility: Visibility) {
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == id) {
            layer
                .layout
                .insert("visibility".to_string(), Value::from(visibility.as_str()));
            self.ops.push(MapOp::SetVisibility {
                layer: id.to_string(),
                visibility,
            });
        }
    }

    /// Replaces in place, so the layer keeps its position in the draw order.
    fn replace_layer_source(
        &mut self,
        layer: LayerDefinition,
        source_id: &str,
        source: SourceDefinition,
    ) {
        self.sources.insert(source_id.to_string(), source);
        self.ops.push(MapOp::ReplaceLayerSource {
            layer: layer.id.clone(),
            source: source_id.to_string(),
        });
        match self.layers.iter_mut().find(|existing| existing.id == layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }
}
