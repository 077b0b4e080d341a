//! Merges per-category result frames into the final wide outputs: one CSV
//! table and one GeoJSON layer joined back onto the node geometries.

use std::collections::BTreeMap;

use geojson::{JsonObject, JsonValue, Value};
use log::info;

use super::sink::ResultFrame;
use crate::model::Network;
use crate::store::{self, Workspace, geojson as gj};
use crate::{Error, NodeId};

/// Where the merged outputs land: `<schema>.<table>_table` (CSV) and
/// `<schema>.<table>_results` (GeoJSON).
pub struct OutputLocation {
    pub table: String,
    pub schema: String,
}

pub struct ResultAssembler<'a> {
    workspace: &'a Workspace,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Outer-join all frames on node id and write both outputs. The CSV
    /// holds only nodes that appear in at least one frame; the GeoJSON
    /// layer carries every network node, with nulls where a node reaches
    /// nothing.
    pub fn assemble(
        &self,
        frames: &[ResultFrame],
        network: &Network,
        output: &OutputLocation,
    ) -> Result<(), Error> {
        let columns: Vec<String> = frames.iter().flat_map(|f| f.columns.clone()).collect();
        let width = columns.len();

        let mut merged: BTreeMap<NodeId, Vec<Option<f64>>> = BTreeMap::new();
        let mut offset = 0;
        for frame in frames {
            for (&node_id, ranks) in &frame.rows {
                let row = merged.entry(node_id).or_insert_with(|| vec![None; width]);
                row[offset..offset + ranks.len()].copy_from_slice(ranks);
            }
            offset += frame.columns.len();
        }

        let csv_name = format!("{}.{}_table", output.schema, output.table);
        info!("Writing {csv_name}");
        self.write_csv(&csv_name, &columns, &merged)?;

        let geo_name = format!("{}.{}_results", output.schema, output.table);
        info!("Writing {geo_name}");
        self.write_layer(&geo_name, &columns, &merged, network)
    }

    fn write_csv(
        &self,
        name: &str,
        columns: &[String],
        merged: &BTreeMap<NodeId, Vec<Option<f64>>>,
    ) -> Result<(), Error> {
        let path = self.workspace.csv_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["node_id".to_string()];
        header.extend(columns.iter().cloned());
        writer.write_record(&header)?;

        for (node_id, row) in merged {
            let mut record = vec![node_id.to_string()];
            record.extend(
                row.iter()
                    .map(|v| v.map(|m| m.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_layer(
        &self,
        name: &str,
        columns: &[String],
        merged: &BTreeMap<NodeId, Vec<Option<f64>>>,
        network: &Network,
    ) -> Result<(), Error> {
        let features = network
            .nodes
            .iter()
            .map(|node| {
                let mut props = JsonObject::new();
                props.insert(network.node_id_column.clone(), node.id.into());
                for (i, column) in columns.iter().enumerate() {
                    let value = merged
                        .get(&node.id)
                        .and_then(|row| row[i])
                        .map_or(JsonValue::Null, |m| m.into());
                    props.insert(column.clone(), value);
                }
                store::feature_with(Value::from(&node.geometry), props)
            })
            .collect();
        gj::write_collection(&self.workspace.table_path(name), features)
    }
}
