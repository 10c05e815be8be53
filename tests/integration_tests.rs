use std::fs;
use std::io::Write;

use traffic_graph::PipelineError;
use traffic_graph::dataset::{TrafficDataset, load_csv};
use traffic_graph::graph::centrality::CentralityOptions;
use traffic_graph::graph::{Intersection, RoadGraph, RoadSegment};
use traffic_graph::infra::overpass::OsmFileProvider;
use traffic_graph::matching::{EdgeMatcher, RecordingObserver};
use traffic_graph::pipeline::{PipelineConfig, run_pipeline};
use traffic_graph::services::street_network::{NetworkType, StreetNetworkProvider};

const TRAFFIC_CSV: &str = "\
Date,Area Name,Road/Intersection Name,Traffic Volume,Average Speed,Congestion Level
2024-01-02,Indiranagar,MG Rd,100,20,80
2024-01-06,Indiranagar,MG Rd,140,30,60
2024-01-02,Koramangala,Hosur Rd,50,15,90
2024-01-07,Koramangala,Brigade Road,70,25,
";

/// A square of four intersections around central Bangalore with a named,
/// a ref-only and a nameless edge.
fn synthetic_graph() -> RoadGraph {
    let mut g = RoadGraph::new();
    g.add_intersection(Intersection::new(1, 77.590, 12.970));
    g.add_intersection(Intersection::new(2, 77.600, 12.970));
    g.add_intersection(Intersection::new(3, 77.600, 12.980));
    g.add_intersection(Intersection::new(4, 77.590, 12.980));
    g.add_segment(1, 2, RoadSegment::named("MG Road"));
    g.add_segment(
        2,
        3,
        RoadSegment {
            r#ref: Some("Hosur Road".into()),
            ..Default::default()
        },
    );
    g.add_segment(3, 4, RoadSegment::named("Brigade Rd"));
    g.add_segment(4, 1, RoadSegment::default());
    g
}

fn write_csv(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("traffic.csv");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn config(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        output_dir: dir.join("outputs"),
        centrality: CentralityOptions {
            k: None,
            seed: Some(7),
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_csv(write_csv(dir.path(), TRAFFIC_CSV)).unwrap();

    let report = run_pipeline(
        synthetic_graph(),
        &dataset,
        &EdgeMatcher::default(),
        &config(dir.path()),
    )
    .unwrap();

    for path in report.outputs.all() {
        assert!(path.exists(), "missing {}", path.display());
        assert!(fs::metadata(path).unwrap().len() > 0);
    }
    assert!(
        report
            .outputs
            .web_map
            .ends_with("outputs/bangalore_basic_map.html")
    );

    let summary = report.summary;
    assert_eq!(summary.total_edges, 4);
    assert_eq!(summary.edges_with_data, 3);
    assert_eq!(summary.unmatched, 1);

    let mg = report.graph.segment(1, 2).unwrap().traffic.unwrap();
    assert_eq!(mg.traffic_volume, 120.0);
    assert_eq!(mg.average_speed, 25.0);
    assert_eq!(mg.congestion_level, 70.0);

    let hosur = report.graph.segment(2, 3).unwrap().traffic.unwrap();
    assert_eq!(hosur.traffic_volume, 50.0);

    let brigade = report.graph.segment(3, 4).unwrap().traffic.unwrap();
    assert_eq!(brigade.traffic_volume, 70.0);
    assert_eq!(brigade.congestion_level, 0.0);

    let nameless = report.graph.segment(4, 1).unwrap().traffic.unwrap();
    assert_eq!(nameless.traffic_volume, 0.0);
    assert_eq!(nameless.average_speed, 0.0);
    assert_eq!(nameless.congestion_level, 0.0);

    // every node of a 4-cycle has degree 2 out of 3 possible neighbours
    for node in report.graph.intersections() {
        let degree = node.degree_centrality.unwrap();
        assert!((degree - 2.0 / 3.0).abs() < 1e-12);
        assert!(node.betweenness.is_some_and(|b| b > 0.0));
    }
}

#[test]
fn test_exports_contents() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_csv(write_csv(dir.path(), TRAFFIC_CSV)).unwrap();
    let report = run_pipeline(
        synthetic_graph(),
        &dataset,
        &EdgeMatcher::default(),
        &config(dir.path()),
    )
    .unwrap();
    let outputs = &report.outputs;

    let edges = fs::read_to_string(&outputs.edge_list).unwrap();
    let mut lines = edges.lines();
    assert_eq!(
        lines.next(),
        Some("u,v,traffic_volume,average_speed,congestion_level")
    );
    assert_eq!(lines.count(), 4);
    assert!(edges.contains("1,2,120.0,25.0,70.0"));

    let layered = fs::read_to_string(&outputs.time_layer_map).unwrap();
    assert!(layered.contains("Weekday Traffic"));
    assert!(layered.contains("Weekend Traffic"));

    let kepler = fs::read_to_string(&outputs.kepler_map).unwrap();
    assert!(kepler.contains("Bangalore Traffic"));
    assert!(kepler.contains("position:fixed"));

    let (width, height) = image::image_dimensions(&outputs.heatmap).unwrap();
    assert_eq!((width, height), (1500, 1500));
}

#[test]
fn test_missing_name_column_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = TrafficDataset::from_reader("traffic_volume\n5\n".as_bytes()).unwrap();

    let err = run_pipeline(
        synthetic_graph(),
        &dataset,
        &EdgeMatcher::default(),
        &config(dir.path()),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::MissingField { ref field } if field == "road_intersection_name"));
    assert!(!dir.path().join("outputs/bangalore_basic_map.html").exists());
}

#[test]
fn test_empty_graph_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = load_csv(write_csv(dir.path(), TRAFFIC_CSV)).unwrap();

    let err = run_pipeline(
        RoadGraph::new(),
        &dataset,
        &EdgeMatcher::default(),
        &config(dir.path()),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::NoData(_)));
}

#[test]
fn test_matching_is_idempotent() {
    let dataset = TrafficDataset::from_reader(TRAFFIC_CSV.as_bytes()).unwrap();
    let matcher = EdgeMatcher::default();
    let fields = Default::default();
    let mut graph = synthetic_graph();

    let mut observer = RecordingObserver::default();
    matcher
        .map_traffic(&mut graph, &dataset, &fields, Default::default(), &mut observer)
        .unwrap();
    let first: Vec<_> = graph.segments().map(|s| s.traffic).collect();

    matcher
        .map_traffic(&mut graph, &dataset, &fields, Default::default(), &mut ())
        .unwrap();
    let second: Vec<_> = graph.segments().map(|s| s.traffic).collect();

    assert_eq!(first, second);
    assert!(
        graph
            .segments()
            .all(|s| s.traffic.is_some_and(|t| t.traffic_volume >= 0.0))
    );
}

#[tokio::test]
async fn test_pipeline_from_saved_osm_response() {
    let provider = OsmFileProvider::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/small_network.json"
    ));
    let graph = provider
        .fetch_road_graph("Bangalore, India", NetworkType::Drive)
        .await
        .unwrap();

    // the footway is not drivable; MG Road and Brigade Road are split at node 2
    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 5);

    let dir = tempfile::tempdir().unwrap();
    let dataset = load_csv(write_csv(dir.path(), TRAFFIC_CSV)).unwrap();
    let report = run_pipeline(graph, &dataset, &EdgeMatcher::default(), &config(dir.path())).unwrap();

    assert_eq!(
        report.graph.segment(1, 2).unwrap().traffic.unwrap().traffic_volume,
        120.0
    );
    assert_eq!(
        report.graph.segment(4, 2).unwrap().traffic.unwrap().traffic_volume,
        70.0
    );
    assert_eq!(report.summary.unmatched, 1);
}
