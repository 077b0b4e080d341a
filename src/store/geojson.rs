//! GeoJSON feature collection I/O and property access helpers.

use std::path::Path;

use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};

use crate::Error;

pub fn read_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingDataset(path.display().to_string()),
        _ => Error::IoError(e),
    })?;
    let geojson: GeoJson = contents.parse()?;
    FeatureCollection::try_from(geojson).map_err(Error::from)
}

pub fn write_collection(path: &Path, features: Vec<Feature>) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    std::fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Extract a point geometry, failing on anything else.
pub fn point_of(feature: &Feature) -> Result<Point<f64>, Error> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::Point(coords)) if coords.len() >= 2 => {
            Ok(Point::new(coords[0], coords[1]))
        }
        _ => Err(Error::InvalidData("expected point geometry".to_string())),
    }
}

/// Extract a linestring geometry, failing on anything else.
pub fn linestring_of(feature: &Feature) -> Result<LineString<f64>, Error> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::LineString(coords)) if coords.len() >= 2 => {
            let points: Vec<(f64, f64)> = coords.iter().map(|c| (c[0], c[1])).collect();
            Ok(LineString::from(points))
        }
        _ => Err(Error::InvalidData(
            "expected linestring geometry".to_string(),
        )),
    }
}

/// Whether any feature carries the named property. Dataset-level check,
/// mirroring a column-existence test.
pub fn has_column(features: &[Feature], name: &str) -> bool {
    features
        .iter()
        .any(|f| f.properties.as_ref().is_some_and(|p| p.contains_key(name)))
}

pub fn prop_f64(feature: &Feature, name: &str) -> Option<f64> {
    feature.properties.as_ref()?.get(name)?.as_f64()
}

pub fn prop_i64(feature: &Feature, name: &str) -> Option<i64> {
    feature.properties.as_ref()?.get(name)?.as_i64()
}

/// Property rendered as text, matching the text cast the analysis keys on.
pub fn prop_text(feature: &Feature, name: &str) -> Option<String> {
    match feature.properties.as_ref()?.get(name)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
