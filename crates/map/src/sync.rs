use crate::surface::{MapSurface, SourceDefinition, Visibility};
use crate::urls::TileUrls;
use rezoning_filters::{compile_layer, CompiledQuery, FilterDescriptor};
use rezoning_geometry::Area;
use rezoning_protocol::Resource;

/// Suffix of the source backing a filter layer.
pub const SOURCE_SUFFIX: &str = "_source";

#[must_use]
pub fn source_id(layer_id: &str) -> String {
    format!("{layer_id}{SOURCE_SUFFIX}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Replaced,
    /// The map has not loaded the filter's source yet; nothing was touched.
    MissingSource,
    MissingLayer,
}

/// Points filter layers at tiles rendered for the current filter values.
#[derive(Debug, Clone)]
pub struct LayerSourceSynchronizer {
    urls: TileUrls,
}

impl LayerSourceSynchronizer {
    #[must_use]
    pub fn new(urls: TileUrls) -> Self {
        Self { urls }
    }

    #[must_use]
    pub fn urls(&self) -> &TileUrls {
        &self.urls
    }

    /// Replace the tiles behind `filter`'s layer with ones rendered for `fragment`.
    ///
    /// The old source keeps its type, tile size, data and promoted id; the old layer
    /// definition is reattached unchanged so paint and layout survive the swap.
    /// Calls made before the map has the source are ignored.
    pub fn apply_source<M>(
        &self,
        map: &mut M,
        filter: &FilterDescriptor,
        fragment: &CompiledQuery,
        area: &Area,
        resource: Resource,
    ) -> SyncOutcome
    where
        M: MapSurface + ?Sized,
    {
        let source_id = source_id(&filter.layer);
        let Some(source) = map.source(&source_id) else {
            log::debug!("source {source_id} not loaded yet, skipping refresh");
            return SyncOutcome::MissingSource;
        };
        let Some(layer) = map.layer(&filter.layer) else {
            log::debug!("layer {} not loaded yet, skipping refresh", filter.layer);
            return SyncOutcome::MissingLayer;
        };

        let tiles = self
            .urls
            .layer_tiles(&area.id, resource, &filter.layer, fragment);
        log::debug!("refreshing {} -> {tiles}", filter.layer);
        let next = SourceDefinition {
            tiles: vec![tiles],
            ..source
        };
        map.replace_layer_source(layer, &source_id, next);
        SyncOutcome::Replaced
    }

    /// [`apply_source`](Self::apply_source) with the filter's own compiled fragment.
    pub fn refresh<M>(
        &self,
        map: &mut M,
        filter: &FilterDescriptor,
        area: &Area,
        resource: Resource,
    ) -> SyncOutcome
    where
        M: MapSurface + ?Sized,
    {
        self.apply_source(map, filter, &compile_layer(filter), area, resource)
    }

    /// Mirror each filter's `visible` flag onto its layer. Only layers whose
    /// visibility differs are touched; returns how many changed.
    pub fn apply_visibility<'a, M, I>(&self, map: &mut M, filters: I) -> usize
    where
        M: MapSurface + ?Sized,
        I: IntoIterator<Item = &'a FilterDescriptor>,
    {
        let mut changed = 0;
        for filter in filters {
            let Some(layer) = map.layer(&filter.layer) else {
                continue;
            };
            let wanted = Visibility::from_visible(filter.visible);
            if layer.visibility() != wanted {
                map.set_layer_visibility(&filter.layer, wanted);
                changed += 1;
            }
        }
        changed
    }
}
