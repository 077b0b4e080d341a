//! Per-category accessibility analysis over one network.

use geo::Point;
use log::warn;

use super::sink::{ResultFrame, ResultSink};
use crate::config::AnalysisConfig;
use crate::model::{Category, Network, Poi};
use crate::Error;

/// What one category's analysis produced, for downstream QAQC recording.
pub struct CategoryOutcome {
    pub category: Category,
    /// POIs of this category that passed the proximity filter.
    pub pois: Vec<Poi>,
    /// (index into `pois`, snapped node id) pairs.
    pub assignments: Vec<(usize, crate::NodeId)>,
}

/// Runs the nearest-POI query for one category at a time and hands the
/// result to a sink.
pub struct AccessibilityAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> AccessibilityAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze one category. Returns `None` without touching the graph
    /// when the sink already holds this category's output, or when no POI
    /// of the category lies within the match threshold of the network.
    pub fn analyze(
        &self,
        network: &mut Network,
        pois: &[Poi],
        category: &Category,
        sink: &mut dyn ResultSink,
    ) -> Result<Option<CategoryOutcome>, Error> {
        if sink.is_complete(&category.key) {
            return Ok(None);
        }

        // Only POIs close enough to the network are worth routing to; a
        // POI hundreds of meters from the nearest sidewalk would snap to
        // an arbitrary node and poison the results.
        let subset: Vec<Poi> = pois
            .iter()
            .filter(|p| p.raw_id == category.raw)
            .filter(|p| network.within_edge_distance(&p.geometry, self.config.poi_match_threshold))
            .cloned()
            .collect();
        if subset.is_empty() {
            warn!(
                "No {} POIs within {} meters of {}. Skipping...",
                category.raw, self.config.poi_match_threshold, network.edge_table
            );
            return Ok(None);
        }

        let points: Vec<Point<f64>> = subset.iter().map(|p| p.geometry).collect();
        network.graph.set_pois(
            &category.key,
            &points,
            self.config.max_minutes,
            self.config.num_pois,
        );
        let all_rows =
            network
                .graph
                .nearest_pois(&category.key, self.config.max_minutes, self.config.num_pois)?;

        let columns: Vec<String> = (1..=self.config.num_pois)
            .map(|rank| {
                if sink.qualified_columns() {
                    format!("n_{rank}_{}", category.key)
                } else {
                    format!("n_{rank}")
                }
            })
            .collect();

        // Keep nodes whose nearest POI is strictly inside the horizon;
        // rows at or beyond it only say "not reachable in time".
        let rows = all_rows
            .into_iter()
            .filter(|(_, ranks)| {
                ranks
                    .first()
                    .copied()
                    .flatten()
                    .is_some_and(|n_1| n_1 < self.config.max_minutes)
            })
            .collect();

        let assignments = network
            .graph
            .poi_assignments(&category.key)
            .ok_or_else(|| Error::UnknownLabel(category.key.clone()))?;

        sink.write(ResultFrame {
            key: category.key.clone(),
            columns,
            rows,
        })?;

        Ok(Some(CategoryOutcome {
            category: category.clone(),
            pois: subset,
            assignments,
        }))
    }
}
