//! QAQC connector lines: a visual record of where each POI snapped onto
//! the network, one straight line from POI to matched node.

use geojson::{Feature, JsonObject, Value};
use log::info;

use super::analyzer::CategoryOutcome;
use crate::model::Network;
use crate::store::{self, Workspace, geojson as gj};
use crate::Error;

pub const QAQC_SCHEMA: &str = "qaqc";

/// Writes one `qaqc.qa_<key>` table per analyzed category, then
/// consolidates them into a single table for review.
pub struct QaqcAssigner<'a> {
    workspace: &'a Workspace,
    poi_id_column: &'a str,
}

impl<'a> QaqcAssigner<'a> {
    pub fn new(workspace: &'a Workspace, poi_id_column: &'a str) -> Self {
        Self {
            workspace,
            poi_id_column,
        }
    }

    /// Record the POI-to-node match lines for one category outcome.
    pub fn record(&self, network: &Network, outcome: &CategoryOutcome) -> Result<(), Error> {
        let mut features = Vec::with_capacity(outcome.assignments.len());
        for &(poi_index, node_id) in &outcome.assignments {
            let (Some(poi), Some(node_point)) =
                (outcome.pois.get(poi_index), network.node_point(node_id))
            else {
                continue;
            };
            let line = geo::LineString::from(vec![
                (poi.geometry.x(), poi.geometry.y()),
                (node_point.x(), node_point.y()),
            ]);
            let mut props = JsonObject::new();
            props.insert(self.poi_id_column.to_string(), poi.raw_id.clone().into());
            props.insert("node_id".to_string(), node_id.into());
            features.push(store::feature_with(Value::from(&line), props));
        }

        let table = format!("{QAQC_SCHEMA}.qa_{}", outcome.category.key);
        gj::write_collection(&self.workspace.table_path(&table), features)
    }

    /// Merge every per-category QAQC table into
    /// `<output_schema>.qaqc_node_match` and drop the originals.
    pub fn consolidate(&self, output_schema: &str) -> Result<(), Error> {
        let tables = self.workspace.tables(QAQC_SCHEMA)?;
        if tables.is_empty() {
            return Ok(());
        }
        info!("Consolidating {} QAQC tables", tables.len());

        let mut features = Vec::new();
        for table in &tables {
            let collection = gj::read_collection(&self.workspace.table_path(table))?;
            for feature in collection.features {
                // Keep only the POI id and geometry in the merged table.
                let props = feature.properties.as_ref().and_then(|p| {
                    p.get(self.poi_id_column)
                        .map(|v| (self.poi_id_column.to_string(), v.clone()))
                });
                let mut kept = JsonObject::new();
                if let Some((k, v)) = props {
                    kept.insert(k, v);
                }
                features.push(Feature {
                    properties: Some(kept),
                    ..feature
                });
            }
        }

        let merged = format!("{output_schema}.qaqc_node_match");
        gj::write_collection(&self.workspace.table_path(&merged), features)?;

        for table in &tables {
            self.workspace.drop_table(table)?;
        }
        Ok(())
    }
}
