//! Accessibility analysis: per-category nearest-POI travel times, result
//! persistence, QAQC recording, and dual-network comparison runs.

mod analyzer;
mod assembler;
mod compare;
mod qaqc;
mod sink;

pub use analyzer::{AccessibilityAnalyzer, CategoryOutcome};
pub use assembler::{OutputLocation, ResultAssembler};
pub use compare::{DoubleNetworkComparator, NetworkSpec, SharedArgs};
pub use qaqc::{QAQC_SCHEMA, QaqcAssigner};
pub use sink::{FileSink, ResultFrame, ResultSink, TableSink};

use log::info;

use crate::config::AnalysisConfig;
use crate::model::{CategoryCatalog, Network, Poi};
use crate::store::Workspace;
use crate::Error;

/// Run the analysis for every distinct POI category over one network,
/// merge the per-category frames into the wide table and GeoJSON layer,
/// and consolidate the QAQC match lines.
pub fn compute_all_categories(
    workspace: &Workspace,
    network: &mut Network,
    pois: &[Poi],
    poi_id_column: &str,
    config: &AnalysisConfig,
    output: &OutputLocation,
) -> Result<(), Error> {
    let catalog = CategoryCatalog::from_pois(pois);
    let analyzer = AccessibilityAnalyzer::new(config);
    let qaqc = QaqcAssigner::new(workspace, poi_id_column);
    let mut sink = TableSink::new();

    let total = catalog.len().max(1);
    for (i, category) in catalog.iter().enumerate() {
        info!(
            "-> Working on {:?} - pct complete: {:.2}",
            category.raw,
            i as f64 / total as f64 * 100.0
        );
        if let Some(outcome) = analyzer.analyze(network, pois, category, &mut sink)? {
            qaqc.record(network, &outcome)?;
        }
    }

    let frames = sink.into_frames();
    ResultAssembler::new(workspace).assemble(&frames, network, output)?;
    qaqc.consolidate(&output.schema)
}
