//! Side-by-side analysis of two networks against one POI set, the input
//! for isochrone area-ratio comparison.

use log::info;

use super::analyzer::AccessibilityAnalyzer;
use super::sink::FileSink;
use crate::config::AnalysisConfig;
use crate::loading::NetworkBuilder;
use crate::model::CategoryCatalog;
use crate::store::{self, Workspace};
use crate::Error;

/// One network's source datasets.
pub struct NetworkSpec {
    pub edge_table: String,
    pub node_table: String,
    pub node_id_column: String,
}

/// Inputs shared by both sides of the comparison.
pub struct SharedArgs {
    pub poi_table: String,
    pub poi_id_column: String,
}

/// Runs the full per-category analysis over an A and a B network, writing
/// per-category CSVs into a data directory. Categories whose CSV already
/// exists are skipped, so an interrupted run resumes where it stopped.
pub struct DoubleNetworkComparator<'a> {
    workspace: &'a Workspace,
    config: &'a AnalysisConfig,
    data_dir: std::path::PathBuf,
}

impl<'a> DoubleNetworkComparator<'a> {
    pub fn new(
        workspace: &'a Workspace,
        config: &'a AnalysisConfig,
        data_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self {
            workspace,
            config,
            data_dir: data_dir.into(),
        }
    }

    pub fn compute(
        &self,
        shared: &SharedArgs,
        a: &NetworkSpec,
        b: &NetworkSpec,
    ) -> Result<CategoryCatalog, Error> {
        let pois = store::load_pois(self.workspace, &shared.poi_table, &shared.poi_id_column)?;
        let catalog = CategoryCatalog::from_pois(&pois);

        let builder = NetworkBuilder::new(self.workspace, self.config);
        info!("Building {} network", a.edge_table);
        let mut network_a = builder.ensure_ready(&a.edge_table, &a.node_table, &a.node_id_column)?;
        info!("Building {} network", b.edge_table);
        let mut network_b = builder.ensure_ready(&b.edge_table, &b.node_table, &b.node_id_column)?;

        let mut sink_a = FileSink::new(&self.data_dir, &a.edge_table);
        let mut sink_b = FileSink::new(&self.data_dir, &b.edge_table);
        let analyzer = AccessibilityAnalyzer::new(self.config);

        let total = catalog.len().max(1);
        for (i, category) in catalog.iter().enumerate() {
            info!(
                "-> Working on {:?} - pct complete: {:.2}",
                category.raw,
                i as f64 / total as f64 * 100.0
            );
            analyzer.analyze(&mut network_a, &pois, category, &mut sink_a)?;
            analyzer.analyze(&mut network_b, &pois, category, &mut sink_b)?;
        }
        Ok(catalog)
    }
}
