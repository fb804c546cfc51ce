use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::CliConfig;
use flags::{parse_key_value, parse_range_edit, RangeEdit};
use rezoning_explore::{ApiClient, ExploreSession, ZoneFetcher, ZoneRequestState};
use rezoning_filters::{FilterCatalog, FilterSchema, SchemaNormalizer};
use rezoning_geometry::{find_area, load_areas, Area, GeometryResolver};
use rezoning_map::TileUrls;
use rezoning_protocol::{ApiConfig, LcoeParams, Resource, Weights, ZonePayload};
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod flags;

#[derive(Parser)]
#[command(name = "rezoning")]
#[command(about = "Explore renewable energy zones from the command line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (defaults to ./rezoning.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API endpoint (overrides config file and REZONING_API_ENDPOINT)
    #[arg(long, global = true)]
    api_endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the filters offered for zone exploration, grouped by category
    Schema(SchemaArgs),

    /// Compile filter settings into the query fragment sent to the API
    Compile(CompileArgs),

    /// Resolve the extent zones are generated in for an area and resource
    Extent(ExtentArgs),

    /// Print the tile URL template of one filter layer
    Tiles(TilesArgs),

    /// Generate zones through the API
    Zones(ZonesArgs),
}

#[derive(Args)]
struct SchemaSource {
    /// Read the filter schema from a file instead of GET /filter/schema
    #[arg(long)]
    schema_file: Option<PathBuf>,
}

#[derive(Args)]
struct FilterEdits {
    /// Activate a filter at its default range (repeatable)
    #[arg(long = "enable", value_name = "FILTER")]
    enable: Vec<String>,

    /// Activate a filter and set its range, e.g. f_roads=10,50 (repeatable)
    #[arg(long = "set", value_name = "FILTER=MIN,MAX", value_parser = parse_range_edit)]
    set: Vec<RangeEdit>,
}

#[derive(Args)]
struct AreaSource {
    /// Area list JSON (overrides [data].areas)
    #[arg(long)]
    areas: Option<PathBuf>,

    /// EEZ TopoJSON used for offshore extents (overrides [data].eez)
    #[arg(long)]
    eez: Option<PathBuf>,

    /// Area id (country ISO code or region id)
    #[arg(long)]
    area: String,

    /// Solar PV, Wind or Off-Shore Wind (API names solar/wind/offshore also accepted)
    #[arg(long)]
    resource: Resource,
}

#[derive(Args)]
struct SchemaArgs {
    #[command(flatten)]
    source: SchemaSource,

    /// Output the normalized catalog as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CompileArgs {
    #[command(flatten)]
    source: SchemaSource,

    #[command(flatten)]
    edits: FilterEdits,

    /// Also print the filtered overlay URL, as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtentArgs {
    #[command(flatten)]
    area: AreaSource,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TilesArgs {
    #[command(flatten)]
    source: SchemaSource,

    #[command(flatten)]
    area: AreaSource,

    #[command(flatten)]
    edits: FilterEdits,

    /// Filter whose layer to print
    #[arg(long)]
    filter: String,
}

#[derive(Args)]
struct ZonesArgs {
    #[command(flatten)]
    source: SchemaSource,

    #[command(flatten)]
    area: AreaSource,

    #[command(flatten)]
    edits: FilterEdits,

    /// Zone scoring weight, e.g. lcoe=0.5 (repeatable)
    #[arg(long = "weight", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    weights: Vec<(String, f64)>,

    /// LCOE parameter, e.g. capacity_factor=0.3 (repeatable)
    #[arg(long = "lcoe", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    lcoe: Vec<(String, f64)>,

    /// Generate a regular grid of this cell size (km²) instead of discrete zones
    #[arg(long)]
    grid_size: Option<u32>,

    /// Print the zone payload as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.api_endpoint {
        config.api.api_endpoint = endpoint;
    }

    match cli.command {
        Commands::Schema(args) => run_schema(args, &config).await?,
        Commands::Compile(args) => run_compile(args, &config).await?,
        Commands::Extent(args) => run_extent(args, &config).await?,
        Commands::Tiles(args) => run_tiles(args, &config).await?,
        Commands::Zones(args) => run_zones(args, &config).await?,
    }

    Ok(())
}

/// List filters by category
async fn run_schema(args: SchemaArgs, config: &CliConfig) -> Result<()> {
    let schema = load_schema(&args.source, &config.api).await?;
    let catalog = SchemaNormalizer::default().normalize(&schema);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }
    for group in catalog.groups() {
        println!("{}", group.title());
        for filter in group.presentable() {
            let detail = if filter.pattern.is_range() {
                let range = filter.effective_range();
                let unit = filter.unit.as_deref().unwrap_or("");
                format!("[{}..{}] {unit}", range.min, range.max)
            } else {
                "(toggle)".to_string()
            };
            println!("  {:<28} {} {}", filter.id, filter.name, detail.trim_end());
        }
    }
    Ok(())
}

/// Compile filter edits into a query fragment
async fn run_compile(args: CompileArgs, config: &CliConfig) -> Result<()> {
    let schema = load_schema(&args.source, &config.api).await?;
    let mut catalog = SchemaNormalizer::default().normalize(&schema);
    apply_edits(&mut catalog, &args.edits)?;
    let query = catalog.compile();

    if args.json {
        let overlay = TileUrls::new(&config.api).filtered_overlay(&query);
        let output = serde_json::json!({
            "query": query.as_str(),
            "filtered_overlay": overlay,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{query}");
    }
    Ok(())
}

/// Resolve the query extent of an area
async fn run_extent(args: ExtentArgs, config: &CliConfig) -> Result<()> {
    let areas = load_area_list(&args.area, config).await?;
    let area = select_area(&areas, &args.area.area)?;
    let resolved = GeometryResolver.resolve(area, args.area.resource)?;

    if args.json {
        let output = serde_json::json!({
            "area": area.id,
            "resource": args.area.resource,
            "extent": resolved.extent,
            "grid": resolved.requires_grid,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", resolved.extent);
        if resolved.requires_grid {
            eprintln!("Extent includes maritime zones; zones are generated on a grid");
        }
    }
    Ok(())
}

/// Print one filter layer's tile URL
async fn run_tiles(args: TilesArgs, config: &CliConfig) -> Result<()> {
    let schema = load_schema(&args.source, &config.api).await?;
    let mut catalog = SchemaNormalizer::default().normalize(&schema);
    apply_edits(&mut catalog, &args.edits)?;
    let filter = catalog
        .get(&args.filter)
        .with_context(|| format!("Unknown filter: {}", args.filter))?;

    let areas = load_area_list(&args.area, config).await?;
    let area = select_area(&areas, &args.area.area)?;
    let url = TileUrls::new(&config.api).layer_tiles(
        &area.id,
        args.area.resource,
        &filter.layer,
        &rezoning_filters::compile_layer(filter),
    );
    println!("{url}");
    Ok(())
}

/// Generate zones through the API
async fn run_zones(args: ZonesArgs, config: &CliConfig) -> Result<()> {
    let api = ApiClient::new(config.api.clone())?;
    let schema = load_schema(&args.source, &config.api).await?;
    let areas = load_area_list(&args.area, config).await?;
    let mut session = ExploreSession::new(
        &schema,
        areas,
        TileUrls::new(&config.api),
        ZoneFetcher::new(Arc::new(api)),
    )?;
    session.select_area(&args.area.area)?;
    session.select_resource(args.area.resource)?;
    if let Some(size) = args.grid_size {
        session.set_grid_mode(true);
        session.set_grid_size(size)?;
    }
    for id in &args.edits.enable {
        session.set_filter_active(id, true)?;
    }
    for edit in &args.edits.set {
        session.set_filter_active(&edit.id, true)?;
        session.set_filter_range(&edit.id, edit.min, edit.max)?;
    }

    let weights = args
        .weights
        .into_iter()
        .fold(Weights::default(), |weights, (id, value)| weights.with(id, value));
    let lcoe = args
        .lcoe
        .into_iter()
        .fold(LcoeParams::default(), |lcoe, (id, value)| lcoe.with(id, value));

    session
        .update_filtered_layer(weights, lcoe)?
        .await
        .context("Zone generation task failed")?;

    match session.zone_state() {
        ZoneRequestState::Fetched { zones, .. } => print_zones(&zones, args.json)?,
        ZoneRequestState::Failed { error, .. } => {
            anyhow::bail!("Zone generation failed: {error}")
        }
        other => anyhow::bail!("Zone generation ended in state {}", other.name()),
    }
    Ok(())
}

fn print_zones(zones: &ZonePayload, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(zones)?);
        return Ok(());
    }
    let fmt = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    for (i, zone) in zones.iter().enumerate() {
        let summary = &zone.properties.summary;
        let id = zone
            .id
            .as_ref()
            .map_or_else(|| (i + 1).to_string(), ToString::to_string);
        println!(
            "{id:>6}  lcoe {:>10}  score {:>6}  output {:>12}",
            fmt(summary.lcoe),
            fmt(summary.zone_score),
            fmt(summary.zone_output)
        );
    }
    eprintln!("Generated {} zones", zones.len());
    if let Some(zone) = zones.cheapest() {
        eprintln!(
            "Lowest LCOE: {} ({})",
            fmt(zone.properties.summary.lcoe),
            zone.id.as_ref().map_or_else(String::new, ToString::to_string)
        );
    }
    Ok(())
}

async fn load_schema(source: &SchemaSource, api: &ApiConfig) -> Result<FilterSchema> {
    match &source.schema_file {
        Some(path) => {
            let raw = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read schema {}", path.display()))?;
            FilterSchema::from_slice(&raw)
                .with_context(|| format!("Invalid schema {}", path.display()))
        }
        None => Ok(ApiClient::new(api.clone())?.fetch_filter_schema().await?),
    }
}

/// `--set` implies `--enable`; values are clamped to the filter's range.
fn apply_edits(catalog: &mut FilterCatalog, edits: &FilterEdits) -> Result<()> {
    for id in &edits.enable {
        catalog.set_active(id, true)?;
    }
    for edit in &edits.set {
        catalog.set_active(&edit.id, true)?;
        catalog.set_range_value(&edit.id, edit.min, edit.max)?;
    }
    Ok(())
}

async fn load_area_list(source: &AreaSource, config: &CliConfig) -> Result<Vec<Area>> {
    let areas_path = source
        .areas
        .as_ref()
        .or(config.data.areas.as_ref())
        .context("No area list given; pass --areas or set [data].areas in the config")?;
    let eez_path = source.eez.as_ref().or(config.data.eez.as_ref());
    let areas = load_areas(areas_path, eez_path.map(PathBuf::as_path))
        .await
        .with_context(|| format!("Failed to load areas from {}", areas_path.display()))?;
    Ok(areas)
}

fn select_area<'a>(areas: &'a [Area], id: &str) -> Result<&'a Area> {
    find_area(areas, id).with_context(|| format!("Unknown area: {id}"))
}
