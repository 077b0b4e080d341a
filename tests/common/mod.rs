//! Fixture helpers shared by the integration tests.

use geojson::{JsonObject, Value};
use walkshed::store::{Workspace, feature_with, geojson as gj};

pub fn write_edges(workspace: &Workspace, table: &str, segments: &[Vec<(f64, f64)>]) {
    let features = segments
        .iter()
        .enumerate()
        .map(|(i, points)| {
            let coords: Vec<Vec<f64>> = points.iter().map(|&(x, y)| vec![x, y]).collect();
            let mut props = JsonObject::new();
            props.insert("id".to_string(), (i as u64).into());
            feature_with(Value::LineString(coords), props)
        })
        .collect();
    gj::write_collection(&workspace.table_path(table), features).unwrap();
}

pub fn write_nodes(workspace: &Workspace, table: &str, id_column: &str, nodes: &[(i64, (f64, f64))]) {
    let features = nodes
        .iter()
        .map(|&(id, (x, y))| {
            let mut props = JsonObject::new();
            props.insert(id_column.to_string(), id.into());
            feature_with(Value::Point(vec![x, y]), props)
        })
        .collect();
    gj::write_collection(&workspace.table_path(table), features).unwrap();
}

pub fn write_pois(workspace: &Workspace, table: &str, id_column: &str, pois: &[(&str, (f64, f64))]) {
    let features = pois
        .iter()
        .map(|&(raw_id, (x, y))| {
            let mut props = JsonObject::new();
            props.insert(id_column.to_string(), raw_id.into());
            feature_with(Value::Point(vec![x, y]), props)
        })
        .collect();
    gj::write_collection(&workspace.table_path(table), features).unwrap();
}

/// Two 50m edges meeting at a right angle, so the three nodes are not
/// collinear.
pub fn bent_network(workspace: &Workspace, edge_table: &str, node_table: &str) {
    write_edges(
        workspace,
        edge_table,
        &[
            vec![(0.0, 0.0), (50.0, 0.0)],
            vec![(50.0, 0.0), (50.0, 50.0)],
        ],
    );
    write_nodes(
        workspace,
        node_table,
        "node_id",
        &[(1, (0.0, 0.0)), (2, (50.0, 0.0)), (3, (50.0, 50.0))],
    );
}

/// Two 50m edges in a line with nodes at 0, 50 and 100 meters.
pub fn line_network(workspace: &Workspace, edge_table: &str, node_table: &str) {
    write_edges(
        workspace,
        edge_table,
        &[
            vec![(0.0, 0.0), (50.0, 0.0)],
            vec![(50.0, 0.0), (100.0, 0.0)],
        ],
    );
    write_nodes(
        workspace,
        node_table,
        "node_id",
        &[(1, (0.0, 0.0)), (2, (50.0, 0.0)), (3, (100.0, 0.0))],
    );
}
