mod common;

use geo::Point;
use walkshed::analysis::{
    AccessibilityAnalyzer, DoubleNetworkComparator, NetworkSpec, OutputLocation, SharedArgs,
    TableSink, compute_all_categories,
};
use walkshed::loading::NetworkBuilder;
use walkshed::model::{CategoryCatalog, Poi};
use walkshed::store::{Workspace, geojson as gj};
use walkshed::AnalysisConfig;

fn config(num_pois: usize) -> AnalysisConfig {
    AnalysisConfig {
        num_pois,
        ..AnalysisConfig::default()
    }
}

fn poi(raw: &str, x: f64, y: f64) -> Poi {
    Poi {
        raw_id: raw.to_string(),
        geometry: Point::new(x, y),
    }
}

#[test]
fn travel_times_across_a_three_node_line() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    let config = config(1);
    let mut network = NetworkBuilder::new(&workspace, &config)
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();

    let pois = vec![poi("Library", 0.0, 10.0)];
    let catalog = CategoryCatalog::from_pois(&pois);
    let category = catalog.iter().next().unwrap();

    let mut sink = TableSink::new();
    let outcome = AccessibilityAnalyzer::new(&config)
        .analyze(&mut network, &pois, category, &mut sink)
        .unwrap()
        .expect("library should be analyzed");
    assert_eq!(outcome.assignments, vec![(0, 1)]);

    let frames = sink.into_frames();
    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!(frame.key, "library");
    assert_eq!(frame.columns, vec!["n_1_library".to_string()]);

    // 50m at 2.5 mph is 44.74s of walking, 45s in graph cost.
    assert_eq!(frame.rows[&1], vec![Some(0.0)]);
    assert_eq!(frame.rows[&2], vec![Some(0.75)]);
    assert_eq!(frame.rows[&3], vec![Some(1.5)]);
}

#[test]
fn pois_beyond_the_match_threshold_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    let config = config(1);
    let mut network = NetworkBuilder::new(&workspace, &config)
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();

    let pois = vec![poi("Library", 0.0, 500.0)];
    let catalog = CategoryCatalog::from_pois(&pois);
    let category = catalog.iter().next().unwrap();

    let mut sink = TableSink::new();
    let outcome = AccessibilityAnalyzer::new(&config)
        .analyze(&mut network, &pois, category, &mut sink)
        .unwrap();
    assert!(outcome.is_none());
    assert!(sink.into_frames().is_empty());
}

#[test]
fn match_threshold_widens_the_poi_subset() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    let pois = vec![poi("Library", 0.0, 50.0)];
    let catalog = CategoryCatalog::from_pois(&pois);
    let category = catalog.iter().next().unwrap();

    for (threshold, expected) in [(45.0, false), (60.0, true)] {
        let config = AnalysisConfig {
            num_pois: 1,
            poi_match_threshold: threshold,
            ..AnalysisConfig::default()
        };
        let mut network = NetworkBuilder::new(&workspace, &config)
            .ensure_ready("sidewalks", "sw_nodes", "node_id")
            .unwrap();
        let mut sink = TableSink::new();
        let outcome = AccessibilityAnalyzer::new(&config)
            .analyze(&mut network, &pois, category, &mut sink)
            .unwrap();
        assert_eq!(outcome.is_some(), expected, "threshold {threshold}");
    }
}

#[test]
fn nodes_at_the_horizon_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    // 0.75 minutes is exactly the cost of one 50m hop.
    let config = AnalysisConfig {
        num_pois: 1,
        max_minutes: 0.75,
        ..AnalysisConfig::default()
    };
    let mut network = NetworkBuilder::new(&workspace, &config)
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();

    let pois = vec![poi("Library", 0.0, 10.0)];
    let catalog = CategoryCatalog::from_pois(&pois);
    let category = catalog.iter().next().unwrap();

    let mut sink = TableSink::new();
    AccessibilityAnalyzer::new(&config)
        .analyze(&mut network, &pois, category, &mut sink)
        .unwrap();

    let frames = sink.into_frames();
    let rows = &frames[0].rows;
    assert!(rows.contains_key(&1));
    // Node 2 reaches the POI in exactly 0.75 minutes; the horizon is
    // exclusive, so it is dropped along with everything further out.
    assert!(!rows.contains_key(&2));
    assert!(!rows.contains_key(&3));
}

#[test]
fn missing_node_table_is_generated_from_edge_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::write_edges(
        &workspace,
        "sidewalks",
        &[
            vec![(0.0, 0.0), (50.0, 0.0)],
            vec![(50.0, 0.0), (100.0, 0.0)],
        ],
    );

    let config = config(1);
    let network = NetworkBuilder::new(&workspace, &config)
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();

    assert!(workspace.table_exists("sw_nodes"));
    assert_eq!(network.nodes.len(), 3);
    assert_eq!(network.graph.edge_count(), 2);
}

#[test]
fn preparation_is_idempotent_and_preserves_existing_weights() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    let config = config(1);
    let builder = NetworkBuilder::new(&workspace, &config);
    builder
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();
    let first = std::fs::read_to_string(workspace.table_path("sidewalks")).unwrap();

    builder
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();
    let second = std::fs::read_to_string(workspace.table_path("sidewalks")).unwrap();
    assert_eq!(first, second);

    let collection = gj::read_collection(&workspace.table_path("sidewalks")).unwrap();
    for feature in &collection.features {
        assert!(gj::prop_f64(feature, "minutes").is_some());
        assert!(gj::prop_i64(feature, "start_id").is_some());
    }
}

#[test]
fn comparator_resumes_past_existing_category_files() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");
    common::line_network(&workspace, "osm", "osm_nodes");
    common::write_pois(&workspace, "pois", "category", &[("Library", (0.0, 10.0))]);

    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let sentinel_path = data_dir.join("sidewalks_library.csv");
    std::fs::write(&sentinel_path, "sentinel").unwrap();

    let config = config(1);
    let comparator = DoubleNetworkComparator::new(&workspace, &config, &data_dir);
    let catalog = comparator
        .compute(
            &SharedArgs {
                poi_table: "pois".to_string(),
                poi_id_column: "category".to_string(),
            },
            &NetworkSpec {
                edge_table: "sidewalks".to_string(),
                node_table: "sw_nodes".to_string(),
                node_id_column: "node_id".to_string(),
            },
            &NetworkSpec {
                edge_table: "osm".to_string(),
                node_table: "osm_nodes".to_string(),
                node_id_column: "node_id".to_string(),
            },
        )
        .unwrap();
    assert_eq!(catalog.len(), 1);

    // The pre-existing A-side file is untouched; the B side was computed.
    assert_eq!(std::fs::read_to_string(&sentinel_path).unwrap(), "sentinel");
    let osm = std::fs::read_to_string(data_dir.join("osm_library.csv")).unwrap();
    assert!(osm.starts_with("node_id,n_1"));
    assert!(osm.lines().count() > 1);
}

#[test]
fn full_run_merges_categories_and_consolidates_qaqc() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    common::line_network(&workspace, "sidewalks", "sw_nodes");

    let config = config(1);
    let mut network = NetworkBuilder::new(&workspace, &config)
        .ensure_ready("sidewalks", "sw_nodes", "node_id")
        .unwrap();

    let pois = vec![poi("Library", 0.0, 10.0), poi("Clinic", 100.0, 10.0)];
    let output = OutputLocation {
        table: "walk".to_string(),
        schema: "results".to_string(),
    };
    compute_all_categories(&workspace, &mut network, &pois, "category", &config, &output).unwrap();

    let table = std::fs::read_to_string(workspace.csv_path("results.walk_table")).unwrap();
    assert!(table.starts_with("node_id,n_1_clinic,n_1_library"));
    assert_eq!(table.lines().count(), 4);

    let layer = gj::read_collection(&workspace.table_path("results.walk_results")).unwrap();
    assert_eq!(layer.features.len(), 3);
    for feature in &layer.features {
        assert!(gj::prop_f64(feature, "n_1_clinic").is_some());
        assert!(gj::prop_f64(feature, "n_1_library").is_some());
    }

    // Per-category QAQC tables are folded into one and dropped.
    assert!(workspace.table_exists("results.qaqc_node_match"));
    assert!(!workspace.table_exists("qaqc.qa_library"));
    assert!(!workspace.table_exists("qaqc.qa_clinic"));
    let qaqc = gj::read_collection(&workspace.table_path("results.qaqc_node_match")).unwrap();
    assert_eq!(qaqc.features.len(), 2);
}
