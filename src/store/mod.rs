//! Filesystem-backed spatial store: named GeoJSON/CSV datasets, grouped
//! into schema subdirectories the way tables live in database schemas.

pub mod geojson;

use std::path::{Path, PathBuf};

use ::geojson::{Feature, Geometry, JsonObject, Value};

use crate::model::{Edge, Node, Poi};
use crate::{Error, NodeId};

/// A directory of named datasets. A dotted `schema.table` name resolves to
/// a subdirectory; plain names live at the root.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// GeoJSON path for a dotted table name.
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.named_path(name, "geojson")
    }

    /// CSV path for a dotted table name, for purely tabular outputs.
    pub fn csv_path(&self, name: &str) -> PathBuf {
        self.named_path(name, "csv")
    }

    fn named_path(&self, name: &str, extension: &str) -> PathBuf {
        match name.split_once('.') {
            Some((schema, table)) => self.root.join(schema).join(format!("{table}.{extension}")),
            None => self.root.join(format!("{name}.{extension}")),
        }
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.table_path(name).exists()
    }

    /// All GeoJSON table names under a schema, sorted.
    pub fn tables(&self, schema: &str) -> Result<Vec<String>, Error> {
        let dir = self.root.join(schema);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "geojson")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(format!("{schema}.{stem}"));
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn drop_table(&self, name: &str) -> Result<(), Error> {
        let path = self.table_path(name);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Edge dataset plus whether the derived columns already exist, so the
/// builder can skip recomputation entirely.
pub struct EdgeDataset {
    pub edges: Vec<Edge>,
    pub has_node_ids: bool,
    pub has_minutes: bool,
}

pub fn load_edges(workspace: &Workspace, table: &str) -> Result<EdgeDataset, Error> {
    let collection = geojson::read_collection(&workspace.table_path(table))?;
    let has_node_ids = geojson::has_column(&collection.features, "start_id")
        || geojson::has_column(&collection.features, "end_id");
    let has_minutes = geojson::has_column(&collection.features, "minutes");

    let mut edges = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        edges.push(Edge {
            id: geojson::prop_i64(feature, "id").map_or(i as u64, |v| v as u64),
            geometry: geojson::linestring_of(feature)?,
            start_id: geojson::prop_i64(feature, "start_id"),
            end_id: geojson::prop_i64(feature, "end_id"),
            len_meters: geojson::prop_f64(feature, "len_meters"),
            minutes: geojson::prop_f64(feature, "minutes"),
        });
    }
    Ok(EdgeDataset {
        edges,
        has_node_ids,
        has_minutes,
    })
}

/// Persist edges back in place with their derived columns.
pub fn save_edges(workspace: &Workspace, table: &str, edges: &[Edge]) -> Result<(), Error> {
    let features = edges
        .iter()
        .map(|edge| {
            let mut props = JsonObject::new();
            props.insert("id".to_string(), edge.id.into());
            if let Some(v) = edge.start_id {
                props.insert("start_id".to_string(), v.into());
            }
            if let Some(v) = edge.end_id {
                props.insert("end_id".to_string(), v.into());
            }
            if let Some(v) = edge.len_meters {
                props.insert("len_meters".to_string(), v.into());
            }
            if let Some(v) = edge.minutes {
                props.insert("minutes".to_string(), v.into());
            }
            feature_with(Value::from(&edge.geometry), props)
        })
        .collect();
    geojson::write_collection(&workspace.table_path(table), features)
}

pub fn load_nodes(
    workspace: &Workspace,
    table: &str,
    id_column: &str,
) -> Result<Vec<Node>, Error> {
    let collection = geojson::read_collection(&workspace.table_path(table))?;
    let mut nodes = Vec::with_capacity(collection.features.len());
    for feature in &collection.features {
        let id: NodeId = geojson::prop_i64(feature, id_column)
            .ok_or_else(|| Error::InvalidData(format!("node in {table} missing {id_column}")))?;
        nodes.push(Node {
            id,
            geometry: geojson::point_of(feature)?,
        });
    }
    Ok(nodes)
}

pub fn save_nodes(
    workspace: &Workspace,
    table: &str,
    id_column: &str,
    nodes: &[Node],
) -> Result<(), Error> {
    let features = nodes
        .iter()
        .map(|node| {
            let mut props = JsonObject::new();
            props.insert(id_column.to_string(), node.id.into());
            feature_with(Value::from(&node.geometry), props)
        })
        .collect();
    geojson::write_collection(&workspace.table_path(table), features)
}

pub fn load_pois(workspace: &Workspace, table: &str, id_column: &str) -> Result<Vec<Poi>, Error> {
    let collection = geojson::read_collection(&workspace.table_path(table))?;
    let mut pois = Vec::with_capacity(collection.features.len());
    for feature in &collection.features {
        let raw_id = geojson::prop_text(feature, id_column)
            .ok_or_else(|| Error::InvalidData(format!("POI in {table} missing {id_column}")))?;
        pois.push(Poi {
            raw_id,
            geometry: geojson::point_of(feature)?,
        });
    }
    Ok(pois)
}

/// Assemble a feature from a geometry value and properties.
pub fn feature_with(geometry: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
