//! Walkshed isochrones from per-category access CSVs, plus the A/B area
//! ratio comparing two networks' sheds around the same POIs.

use std::path::PathBuf;

use geo::{Area, ConcaveHull, LineString, MultiPoint, MultiPolygon, Point};
use geojson::{JsonObject, Value};
use hashbrown::HashMap;
use log::{info, warn};

use crate::algo::buffer::{buffer_line, buffer_point, buffer_polygon};
use crate::config::AnalysisConfig;
use crate::model::{CategoryCatalog, Network, Poi};
use crate::store::{self, Workspace, geojson as gj};
use crate::{Error, HULL_CONCAVITY, ISOCHRONE_BUFFER, NodeId};

/// Ratio value when neither network reaches the POI.
pub const AB_NEITHER: f64 = -2.0;
/// Ratio value when only the A network reaches the POI.
pub const AB_A_ONLY: f64 = -1.0;

/// One category's walkshed polygon on one network.
pub struct Isochrone {
    /// Sanitized category key.
    pub poi_uid: String,
    /// Edge table of the network the shed was computed on.
    pub src_network: String,
    pub geometry: MultiPolygon<f64>,
}

/// Builds walkshed polygons from the per-category CSVs a
/// [`DoubleNetworkComparator`](crate::analysis::DoubleNetworkComparator)
/// run left behind.
pub struct IsochroneGenerator<'a> {
    data_dir: PathBuf,
    network_a: &'a Network,
    network_b: &'a Network,
    catalog: &'a CategoryCatalog,
    /// Nodes count toward the shed when their nearest POI is within this
    /// many minutes.
    minutes_cutoff: f64,
}

impl<'a> IsochroneGenerator<'a> {
    /// `distance_miles` is the walkshed radius; it converts to a time
    /// cutoff at the configured walking speed.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        network_a: &'a Network,
        network_b: &'a Network,
        catalog: &'a CategoryCatalog,
        config: &AnalysisConfig,
        distance_miles: f64,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            network_a,
            network_b,
            catalog,
            minutes_cutoff: distance_miles * 60.0 / config.walking_mph,
        }
    }

    /// Node ids within the time cutoff for one category, from that
    /// network's access CSV. `None` when the CSV was never written.
    fn reachable_nodes(&self, network: &Network, key: &str) -> Result<Option<Vec<NodeId>>, Error> {
        let path = self
            .data_dir
            .join(format!("{}_{key}.csv", network.edge_table));
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let node_col = headers.iter().position(|h| h == "node_id");
        let n1_col = headers.iter().position(|h| h == "n_1");
        let (Some(node_col), Some(n1_col)) = (node_col, n1_col) else {
            return Err(Error::InvalidData(format!(
                "{} is missing node_id or n_1",
                path.display()
            )));
        };

        let mut ids = Vec::new();
        for record in reader.records() {
            let record = record?;
            let node_id: NodeId = record
                .get(node_col)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| Error::InvalidData(format!("bad node id in {}", path.display())))?;
            let n_1: Option<f64> = record.get(n1_col).and_then(|v| v.parse().ok());
            if n_1.is_some_and(|m| m <= self.minutes_cutoff) {
                ids.push(node_id);
            }
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(Some(ids))
    }

    /// Shed polygon over a reachable node set. The hull degrades
    /// gracefully with the node count: a buffered point for one node, a
    /// buffered line for two, a buffered concave hull for three or more.
    fn isochrone_for(&self, network: &Network, node_ids: &[NodeId]) -> Option<MultiPolygon<f64>> {
        let points: Vec<Point<f64>> = node_ids
            .iter()
            .filter_map(|&id| network.node_point(id))
            .collect();

        match points.len() {
            0 => None,
            1 => Some(buffer_point(&points[0], ISOCHRONE_BUFFER)),
            2 => {
                let line = LineString::from(vec![
                    (points[0].x(), points[0].y()),
                    (points[1].x(), points[1].y()),
                ]);
                Some(buffer_line(&line, ISOCHRONE_BUFFER))
            }
            _ => {
                let hull = MultiPoint::new(points).concave_hull(HULL_CONCAVITY);
                Some(buffer_polygon(&hull, ISOCHRONE_BUFFER))
            }
        }
    }

    /// All walkshed polygons, both networks, every category that reached
    /// at least one node.
    pub fn isochrones(&self) -> Result<Vec<Isochrone>, Error> {
        let mut isochrones = Vec::new();
        for category in self.catalog.iter() {
            for network in [self.network_a, self.network_b] {
                let Some(node_ids) = self.reachable_nodes(network, &category.key)? else {
                    continue;
                };
                if let Some(geometry) = self.isochrone_for(network, &node_ids) {
                    isochrones.push(Isochrone {
                        poi_uid: category.key.clone(),
                        src_network: network.edge_table.clone(),
                        geometry,
                    });
                }
            }
        }
        info!("Generated {} isochrones", isochrones.len());
        Ok(isochrones)
    }

    /// Shed-area ratio A/B per category key.
    ///
    /// Sentinels: [`AB_NEITHER`] when neither network produced a shed,
    /// [`AB_A_ONLY`] when only A did. A missing A shed with a present B
    /// shed yields a plain 0.
    pub fn ab_ratios(&self, isochrones: &[Isochrone]) -> Vec<(String, f64)> {
        let mut areas: HashMap<(&str, &str), f64> = HashMap::new();
        for iso in isochrones {
            areas.insert(
                (iso.poi_uid.as_str(), iso.src_network.as_str()),
                iso.geometry.unsigned_area(),
            );
        }

        self.catalog
            .iter()
            .map(|category| {
                let key = category.key.as_str();
                let a = areas
                    .get(&(key, self.network_a.edge_table.as_str()))
                    .copied();
                let b = areas
                    .get(&(key, self.network_b.edge_table.as_str()))
                    .copied();
                let ratio = match (a, b) {
                    (None, None) => {
                        warn!("{key} is unreachable on both networks");
                        AB_NEITHER
                    }
                    _ if b.unwrap_or(0.0) == 0.0 => AB_A_ONLY,
                    _ => a.unwrap_or(0.0) / b.unwrap_or(0.0),
                };
                (category.key.clone(), ratio)
            })
            .collect()
    }
}

/// Persist isochrones to a GeoJSON table.
pub fn save_isochrones(
    workspace: &Workspace,
    table: &str,
    isochrones: &[Isochrone],
) -> Result<(), Error> {
    let features = isochrones
        .iter()
        .map(|iso| {
            let mut props = JsonObject::new();
            props.insert("poi_uid".to_string(), iso.poi_uid.clone().into());
            props.insert("src_network".to_string(), iso.src_network.clone().into());
            store::feature_with(Value::from(&iso.geometry), props)
        })
        .collect();
    gj::write_collection(&workspace.table_path(table), features)
}

/// Persist per-POI A/B ratios as a point table: every POI point carries
/// its category's ratio.
pub fn save_ab_ratios(
    workspace: &Workspace,
    table: &str,
    pois: &[Poi],
    catalog: &CategoryCatalog,
    ratios: &[(String, f64)],
) -> Result<(), Error> {
    let by_key: HashMap<&str, f64> = ratios.iter().map(|(k, r)| (k.as_str(), *r)).collect();

    let features = pois
        .iter()
        .filter_map(|poi| {
            let key = catalog.key_for(&poi.raw_id)?;
            let ratio = by_key.get(key)?;
            let mut props = JsonObject::new();
            props.insert("poi_uid".to_string(), key.into());
            props.insert("ab_ratio".to_string(), (*ratio).into());
            Some(store::feature_with(Value::from(&poi.geometry), props))
        })
        .collect();
    gj::write_collection(&workspace.table_path(table), features)
}
