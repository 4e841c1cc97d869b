use std::path::Path;

use anyhow::{Context, Result, anyhow};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value, json};

use crate::geometry;
use crate::model::{CoverReport, Station, Territory};

/// Read and parse a GeoJSON FeatureCollection from disk.
pub fn read_feature_collection(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("[load] cannot read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("[load] {} is not valid JSON", path.display()))?;
    if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(anyhow!("[load] {} is not a FeatureCollection", path.display()));
    }
    Ok(value)
}

/// Union all Polygon/MultiPolygon features of a FeatureCollection into the
/// demand-region boundary.
pub fn boundary_from_geojson(collection: &Value) -> Result<MultiPolygon<f64>> {
    let shapes: Vec<MultiPolygon<f64>> = features(collection)
        .filter_map(|feature| feature.get("geometry"))
        .filter_map(geometry_to_multipolygon)
        .collect();

    geometry::union_all(shapes).ok_or_else(|| anyhow!("[boundary] no polygon features found"))
}

/// Extract stations from a FeatureCollection of Point/MultiPoint features,
/// flattening each MultiPoint into one station per coordinate. The identifier
/// comes from the `STATION` or `ID` property, defaulting to `"ID"`.
pub fn stations_from_geojson(collection: &Value) -> Result<Vec<Station>> {
    let mut stations = Vec::new();
    for feature in features(collection) {
        let id = station_id(feature.get("properties"));
        let Some(geometry) = feature.get("geometry") else { continue };
        match geometry.get("type").and_then(Value::as_str) {
            Some("Point") => {
                if let Some(c) = geometry.get("coordinates").and_then(coord_pair) {
                    stations.push(Station::new(id.clone(), c.x, c.y));
                }
            }
            Some("MultiPoint") => {
                let coords = geometry.get("coordinates").and_then(Value::as_array);
                for c in coords.into_iter().flatten().filter_map(coord_pair) {
                    stations.push(Station::new(id.clone(), c.x, c.y));
                }
            }
            _ => {}
        }
    }

    if stations.is_empty() {
        return Err(anyhow!("[stations] no point features found"));
    }
    Ok(stations)
}

/// Export territories as a GeoJSON FeatureCollection.
pub fn territories_to_geojson(territories: &[Territory], stations: &[Station]) -> Value {
    let features: Vec<Value> = territories.iter()
        .map(|territory| {
            let mut properties = Map::new();
            properties.insert("station_index".into(), json!(territory.station));
            if let Some(station) = stations.get(territory.station) {
                properties.insert("station_id".into(), json!(station.id));
            }
            properties.insert("fill".into(), json!(territory.color));
            if let Some(mean) = territory.mean_weight {
                properties.insert("raster_mean".into(), json!(mean));
            }
            json!({
                "type": "Feature",
                "geometry": multipolygon_to_geojson(&territory.geometry),
                "properties": properties,
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Export a set-cover report: selected station points, their coverage
/// buffers, and the boundary-clipped coverage union.
pub fn cover_report_to_geojson(report: &CoverReport, stations: &[Station]) -> Value {
    let mut features = Vec::new();
    for (&idx, buffer) in report.selected.iter().zip(&report.buffers) {
        let station = &stations[idx];
        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [station.coord.x(), station.coord.y()],
            },
            "properties": { "station_id": station.id, "radius_m": report.radii[idx] },
        }));
        features.push(json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(buffer),
            "properties": { "station_id": station.id, "kind": "buffer" },
        }));
    }
    if let Some(coverage) = &report.coverage {
        features.push(json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(coverage),
            "properties": { "kind": "coverage_union", "status": report.status },
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}

fn features(collection: &Value) -> impl Iterator<Item = &Value> {
    collection.get("features").and_then(Value::as_array).into_iter().flatten()
}

fn station_id(properties: Option<&Value>) -> String {
    let from_key = |key: &str| {
        properties?.get(key).map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
    };
    from_key("STATION")
        .or_else(|| from_key("ID"))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "ID".to_string())
}

fn coord_pair(value: &Value) -> Option<Coord<f64>> {
    let pair = value.as_array()?;
    Some(Coord { x: pair.first()?.as_f64()?, y: pair.get(1)?.as_f64()? })
}

fn ring(value: &Value) -> Option<LineString<f64>> {
    Some(LineString(value.as_array()?.iter().filter_map(coord_pair).collect()))
}

fn polygon_from_rings(value: &Value) -> Option<Polygon<f64>> {
    let rings = value.as_array()?;
    let exterior = ring(rings.first()?)?;
    let interiors: Vec<LineString<f64>> = rings[1..].iter().filter_map(ring).collect();
    Some(Polygon::new(exterior, interiors))
}

fn geometry_to_multipolygon(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let coordinates = geometry.get("coordinates")?;
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Some(MultiPolygon(vec![polygon_from_rings(coordinates)?])),
        Some("MultiPolygon") => Some(MultiPolygon(
            coordinates.as_array()?.iter().filter_map(polygon_from_rings).collect(),
        )),
        _ => None,
    }
}

/// Convert a MultiPolygon to a GeoJSON geometry Value.
fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = mp.0.iter()
        .map(|polygon| {
            let exterior: Vec<Value> = polygon.exterior().coords()
                .map(|c| json!([c.x, c.y]))
                .collect();
            let mut rings = vec![json!(exterior)];
            for interior in polygon.interiors() {
                rings.push(json!(
                    interior.coords().map(|c| json!([c.x, c.y])).collect::<Vec<_>>()
                ));
            }
            json!(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    fn square_feature(min: f64, max: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]],
            },
        })
    }

    #[test]
    fn boundary_unions_polygon_features() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [square_feature(0.0, 0.01), square_feature(0.005, 0.015)],
        });
        let boundary = boundary_from_geojson(&collection).unwrap();
        assert_eq!(boundary.0.len(), 1);
        assert!(boundary.contains(&geo::Point::new(0.012, 0.012)));
    }

    #[test]
    fn boundary_requires_polygons() {
        let collection = json!({ "type": "FeatureCollection", "features": [] });
        assert!(boundary_from_geojson(&collection).is_err());
    }

    #[test]
    fn stations_flatten_multipoints() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "STATION": " 14 " },
                    "geometry": { "type": "Point", "coordinates": [-79.4, 43.7] },
                },
                {
                    "type": "Feature",
                    "properties": { "ID": 7 },
                    "geometry": {
                        "type": "MultiPoint",
                        "coordinates": [[-79.5, 43.6], [-79.6, 43.65]],
                    },
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                },
            ],
        });
        let stations = stations_from_geojson(&collection).unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].id, "14");
        assert_eq!(stations[1].id, "7");
        assert_eq!(stations[2].id, "7");
        assert_eq!(stations[0].coord.x(), -79.4);
    }

    #[test]
    fn missing_identifier_falls_back() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "STATION": "  " },
                "geometry": { "type": "Point", "coordinates": [-79.4, 43.7] },
            }],
        });
        let stations = stations_from_geojson(&collection).unwrap();
        assert_eq!(stations[0].id, "ID");
    }

    #[test]
    fn territories_round_trip_to_features() {
        use crate::geometry::tests::planar_square;
        let territories = vec![Territory {
            station: 0,
            geometry: planar_square(0.0, 1000.0),
            mean_weight: Some(0.42),
            color: "rgb(1,2,3)".into(),
        }];
        let stations = vec![Station::new("A", 0.0, 0.0)];
        let value = territories_to_geojson(&territories, &stations);
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["properties"]["station_id"], "A");
        assert_eq!(features[0]["properties"]["raster_mean"], 0.42);
        assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");
    }
}
