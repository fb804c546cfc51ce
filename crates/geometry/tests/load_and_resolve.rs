use rezoning_geometry::{find_area, load_areas, GeometryResolver};
use rezoning_protocol::{Extent, Resource};
use tempfile::TempDir;

const AREAS: &str = r#"[
    {"gid": "AAA", "name": "Atlantis", "type": "country", "bounds": "0,0,10,10"},
    {"gid": "LLL", "name": "Landlocked", "type": "country", "bounds": "20,20,25,25"}
]"#;

// One maritime zone east of AAA: x in [10, 20], y in [0, 10], scale 10.
const EEZ: &str = r#"{
    "type": "Topology",
    "transform": {"scale": [10, 10], "translate": [10, 0]},
    "arcs": [[[0, 0], [1, 0], [0, 1], [-1, 0], [0, -1]]],
    "objects": {"eez_v11": {"type": "GeometryCollection", "geometries": [
        {"type": "Polygon", "arcs": [[0]], "properties": {"ISO_TER1": "AAA"}}
    ]}}
}"#;

#[tokio::test]
async fn offshore_extent_includes_maritime_zone_from_files() {
    let temp = TempDir::new().expect("tempdir");
    let areas_path = temp.path().join("areas.json");
    let eez_path = temp.path().join("eez_v11.topojson");
    tokio::fs::write(&areas_path, AREAS).await.expect("write areas");
    tokio::fs::write(&eez_path, EEZ).await.expect("write eez");

    let areas = load_areas(&areas_path, Some(eez_path.as_path()))
        .await
        .expect("load areas");
    assert_eq!(areas.len(), 2);

    let atlantis = find_area(&areas, "AAA").expect("AAA");
    let offshore = GeometryResolver
        .resolve(atlantis, Resource::OffshoreWind)
        .expect("resolve");
    assert_eq!(offshore.extent, Extent::new(0.0, 0.0, 20.0, 10.0));

    let landlocked = find_area(&areas, "LLL").expect("LLL");
    assert!(landlocked.eez.is_empty());
    let resolved = GeometryResolver
        .resolve(landlocked, Resource::OffshoreWind)
        .expect("resolve");
    assert_eq!(resolved.extent, Extent::new(20.0, 20.0, 25.0, 25.0));
}

#[tokio::test]
async fn missing_area_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let err = load_areas(temp.path().join("nope.json"), None)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("IO error"));
}
