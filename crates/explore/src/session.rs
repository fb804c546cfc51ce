use crate::api::ApiClient;
use crate::error::{ExploreError, Result};
use crate::fetcher::ZoneFetcher;
use crate::presets::InputPresets;
use crate::state::{Completion, ZoneRequestState};
use rezoning_filters::{
    CompiledQuery, FilterCatalog, FilterSchema, FilterValue, PresetStore, SchemaNormalizer,
};
use rezoning_geometry::{find_area, Area, GeometryResolver, ResolvedExtent};
use rezoning_map::{LayerSourceSynchronizer, MapSurface, SyncOutcome, TileUrls};
use rezoning_protocol::{GridSpec, LcoeParams, Resource, Weights, ZoneRequestParams, GRID_OPTIONS};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// State of one exploration: chosen area and resource, the filter catalog, grid
/// settings and the zone request lifecycle.
///
/// Every map mutation goes through the session's [`LayerSourceSynchronizer`].
#[derive(Debug)]
pub struct ExploreSession {
    catalog: FilterCatalog,
    presets: PresetStore,
    weights: Weights,
    weight_presets: InputPresets<Weights>,
    lcoe: LcoeParams,
    lcoe_presets: InputPresets<LcoeParams>,
    areas: Vec<Area>,
    area_id: Option<String>,
    resource: Option<Resource>,
    extent: Option<ResolvedExtent>,
    grid_mode: bool,
    grid: GridSpec,
    filtered_layer_url: Option<String>,
    resolver: GeometryResolver,
    synchronizer: LayerSourceSynchronizer,
    fetcher: ZoneFetcher,
}

impl ExploreSession {
    /// Normalize `schema` into the initial catalog; the presets are seeded from it.
    pub fn new(
        schema: &FilterSchema,
        areas: Vec<Area>,
        urls: TileUrls,
        fetcher: ZoneFetcher,
    ) -> Result<Self> {
        schema.validate()?;
        let catalog = SchemaNormalizer::default().normalize(schema);
        let presets = PresetStore::new(catalog.clone());
        Ok(Self {
            catalog,
            presets,
            weights: Weights::default(),
            weight_presets: InputPresets::new("weights", Weights::default()),
            lcoe: LcoeParams::default(),
            lcoe_presets: InputPresets::new("lcoe", LcoeParams::default()),
            areas,
            area_id: None,
            resource: None,
            extent: None,
            grid_mode: false,
            grid: GridSpec::default(),
            filtered_layer_url: None,
            resolver: GeometryResolver,
            synchronizer: LayerSourceSynchronizer::new(urls),
            fetcher,
        })
    }

    /// Starting weights and LCOE values; `reset` on either section returns to them.
    pub fn with_inputs(mut self, weights: Weights, lcoe: LcoeParams) -> Result<Self> {
        ensure_finite("weights", &weights.0)?;
        ensure_finite("lcoe", &lcoe.0)?;
        self.weight_presets = InputPresets::new("weights", weights.clone());
        self.lcoe_presets = InputPresets::new("lcoe", lcoe.clone());
        self.weights = weights;
        self.lcoe = lcoe;
        Ok(self)
    }

    /// Fetch the schema from the API and start a session that generates zones there.
    pub async fn load(api: &ApiClient, areas: Vec<Area>) -> Result<Self> {
        let schema = api.fetch_filter_schema().await?;
        let fetcher = ZoneFetcher::new(Arc::new(api.clone()));
        Self::new(&schema, areas, TileUrls::new(api.config()), fetcher)
    }

    #[must_use]
    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetStore {
        &mut self.presets
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    #[must_use]
    pub fn lcoe(&self) -> &LcoeParams {
        &self.lcoe
    }

    #[must_use]
    pub fn weight_presets(&self) -> &InputPresets<Weights> {
        &self.weight_presets
    }

    pub fn weight_presets_mut(&mut self) -> &mut InputPresets<Weights> {
        &mut self.weight_presets
    }

    #[must_use]
    pub fn lcoe_presets(&self) -> &InputPresets<LcoeParams> {
        &self.lcoe_presets
    }

    pub fn lcoe_presets_mut(&mut self) -> &mut InputPresets<LcoeParams> {
        &mut self.lcoe_presets
    }

    #[must_use]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    #[must_use]
    pub fn selected_area(&self) -> Option<&Area> {
        self.area_id
            .as_deref()
            .and_then(|id| find_area(&self.areas, id))
    }

    #[must_use]
    pub fn selected_resource(&self) -> Option<Resource> {
        self.resource
    }

    /// Whether the area picker still has to be shown.
    #[must_use]
    pub fn needs_area(&self) -> bool {
        self.area_id.is_none()
    }

    #[must_use]
    pub fn needs_resource(&self) -> bool {
        self.resource.is_none()
    }

    /// Extent zones are generated in, once both area and resource are chosen.
    #[must_use]
    pub fn extent(&self) -> Option<ResolvedExtent> {
        self.extent
    }

    #[must_use]
    pub fn grid_mode(&self) -> bool {
        self.grid_mode
    }

    pub fn set_grid_mode(&mut self, enabled: bool) {
        self.grid_mode = enabled;
    }

    #[must_use]
    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn set_grid_size(&mut self, size_km2: u32) -> Result<()> {
        if !GRID_OPTIONS.contains(&size_km2) {
            return Err(ExploreError::UnsupportedGridSize(size_km2));
        }
        self.grid = GridSpec { size_km2 };
        Ok(())
    }

    #[must_use]
    pub fn filtered_layer_url(&self) -> Option<&str> {
        self.filtered_layer_url.as_deref()
    }

    #[must_use]
    pub fn fetcher(&self) -> &ZoneFetcher {
        &self.fetcher
    }

    #[must_use]
    pub fn zone_state(&self) -> ZoneRequestState {
        self.fetcher.state()
    }

    /// Choose the area to explore. Any outstanding zone request is dropped first.
    pub fn select_area(&mut self, id: &str) -> Result<()> {
        if find_area(&self.areas, id).is_none() {
            return Err(ExploreError::UnknownArea(id.to_string()));
        }
        self.area_id = Some(id.to_string());
        self.fetcher.select(self.area_id.as_deref(), self.resource);
        self.resolve()
    }

    /// Choose the resource. Offshore wind widens the extent to the maritime zones
    /// and switches grid mode on.
    pub fn select_resource(&mut self, resource: Resource) -> Result<()> {
        self.resource = Some(resource);
        self.fetcher.select(self.area_id.as_deref(), self.resource);
        self.resolve()
    }

    fn resolve(&mut self) -> Result<()> {
        self.extent = None;
        let (Some(area), Some(resource)) = (self.selected_area(), self.resource) else {
            return Ok(());
        };
        let resolved = self.resolver.resolve(area, resource)?;
        log::debug!("{} / {resource}: extent {}", area.id, resolved.extent);
        if resolved.requires_grid {
            self.grid_mode = true;
        }
        self.extent = Some(resolved);
        Ok(())
    }

    pub fn toggle_filter(&mut self, id: &str) -> Result<bool> {
        let active = self.catalog.toggle_active(id)?;
        self.fetcher.touch_input();
        Ok(active)
    }

    pub fn set_filter_active(&mut self, id: &str, active: bool) -> Result<()> {
        self.catalog.set_active(id, active)?;
        self.fetcher.touch_input();
        Ok(())
    }

    /// Slider edit; ignored (and reported as `false`) while the filter is inactive.
    pub fn set_filter_range(&mut self, id: &str, min: f64, max: f64) -> Result<bool> {
        let applied = self.catalog.set_range_value(id, min, max)?;
        if applied {
            self.fetcher.touch_input();
        }
        Ok(applied)
    }

    pub fn assign_filter_value(&mut self, id: &str, value: FilterValue) -> Result<()> {
        self.catalog.assign_value(id, value)?;
        self.fetcher.touch_input();
        Ok(())
    }

    /// Visibility only affects the map; it never marks inputs as touched.
    pub fn toggle_filter_visible(&mut self, id: &str) -> Result<bool> {
        Ok(self.catalog.toggle_visible(id)?)
    }

    /// Mark inputs as touched after an edit the session does not track itself.
    pub fn touch_inputs(&self) {
        self.fetcher.touch_input();
    }

    pub fn set_weight(&mut self, id: &str, value: f64) -> Result<()> {
        check_finite("weights", id, value)?;
        self.weights.set(id, value);
        self.fetcher.touch_input();
        Ok(())
    }

    pub fn set_lcoe(&mut self, id: &str, value: f64) -> Result<()> {
        check_finite("lcoe", id, value)?;
        self.lcoe.set(id, value);
        self.fetcher.touch_input();
        Ok(())
    }

    /// Replace the weights with a named preset, or `reset` to the starting values.
    pub fn apply_weight_preset(&mut self, name: &str) -> Result<()> {
        self.weights = self.weight_presets.apply(name)?;
        self.fetcher.touch_input();
        log::info!("Applied weights preset {name}");
        Ok(())
    }

    pub fn apply_lcoe_preset(&mut self, name: &str) -> Result<()> {
        self.lcoe = self.lcoe_presets.apply(name)?;
        self.fetcher.touch_input();
        log::info!("Applied lcoe preset {name}");
        Ok(())
    }

    /// Replace the catalog with a preset (or `reset` for the schema defaults).
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        self.catalog = self.presets.apply(name)?;
        self.fetcher.touch_input();
        log::info!("Applied filter preset {name}");
        Ok(())
    }

    /// Compile the full filter set, point the filtered overlay at it and generate
    /// zones with the given weights and LCOE parameters.
    pub fn update_filtered_layer(
        &mut self,
        weights: Weights,
        lcoe: LcoeParams,
    ) -> Result<JoinHandle<Completion>> {
        let fragment = self.catalog.compile();
        let overlay = self.synchronizer.urls().filtered_overlay(&fragment);
        let params = self.request_params(fragment, weights, lcoe)?;
        self.filtered_layer_url = Some(overlay);
        Ok(self.fetcher.generate_zones(params))
    }

    /// [`Self::update_filtered_layer`] with the session's own weights and LCOE values.
    pub fn regenerate(&mut self) -> Result<JoinHandle<Completion>> {
        let (weights, lcoe) = (self.weights.clone(), self.lcoe.clone());
        self.update_filtered_layer(weights, lcoe)
    }

    /// Dispatch zone generation for the current selection.
    pub fn generate_zones(
        &self,
        fragment: CompiledQuery,
        weights: Weights,
        lcoe: LcoeParams,
    ) -> Result<JoinHandle<Completion>> {
        let params = self.request_params(fragment, weights, lcoe)?;
        Ok(self.fetcher.generate_zones(params))
    }

    fn request_params(
        &self,
        fragment: CompiledQuery,
        weights: Weights,
        lcoe: LcoeParams,
    ) -> Result<ZoneRequestParams> {
        let (Some(area_id), Some(resource), Some(resolved)) =
            (&self.area_id, self.resource, self.extent)
        else {
            return Err(ExploreError::SelectionIncomplete);
        };
        ensure_finite("weights", &weights.0)?;
        ensure_finite("lcoe", &lcoe.0)?;
        Ok(ZoneRequestParams {
            area_id: area_id.clone(),
            resource,
            extent: resolved.extent,
            grid: self.grid_mode.then_some(self.grid),
            filters: fragment.into_string(),
            weights,
            lcoe,
        })
    }

    /// Refresh the tiles of one filter's layer for the current selection.
    pub fn sync_layer<M>(&self, map: &mut M, filter_id: &str) -> Result<SyncOutcome>
    where
        M: MapSurface + ?Sized,
    {
        let filter = self
            .catalog
            .get(filter_id)
            .ok_or_else(|| rezoning_filters::FilterError::UnknownFilter(filter_id.to_string()))?;
        let (Some(area), Some(resource)) = (self.selected_area(), self.resource) else {
            return Err(ExploreError::SelectionIncomplete);
        };
        Ok(self.synchronizer.refresh(map, filter, area, resource))
    }

    /// Mirror every filter's visibility onto the map.
    pub fn sync_visibility<M>(&self, map: &mut M) -> usize
    where
        M: MapSurface + ?Sized,
    {
        self.synchronizer.apply_visibility(map, self.catalog.iter())
    }
}

fn check_finite(section: &'static str, id: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ExploreError::NonFiniteInput {
            section,
            id: id.to_string(),
            value,
        })
    }
}

fn ensure_finite(section: &'static str, values: &BTreeMap<String, f64>) -> Result<()> {
    values
        .iter()
        .try_for_each(|(id, value)| check_finite(section, id, *value))
}
