//! Property tests over randomly generated communication logs.

use proptest::prelude::*;

use email_network_analyzer::centrality::{
    betweenness_centrality, compute_all, in_degree_centrality,
};
use email_network_analyzer::cluster::{detect_communities, modularity};
use email_network_analyzer::graph::{build_graph, build_graph_parallel, to_undirected, RawRecord};
use email_network_analyzer::AnalysisConfig;

const EPS: f64 = 1e-9;

fn arb_records() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec((0u8..16, 0u8..16), 1..80).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(s, d)| RawRecord::new(format!("user{s:02}@enron.com"), format!("user{d:02}@enron.com")))
            .collect()
    })
}

fn arb_records_and_shuffle() -> impl Strategy<Value = (Vec<RawRecord>, Vec<RawRecord>)> {
    arb_records().prop_flat_map(|records| {
        let shuffled = Just(records.clone()).prop_shuffle();
        (Just(records), shuffled)
    })
}

proptest! {
    #[test]
    fn rebuilding_ignores_record_order((records, shuffled) in arb_records_and_shuffle()) {
        let first = build_graph(&records).unwrap();
        let second = build_graph(&shuffled).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, build_graph_parallel(&shuffled).unwrap());
    }

    #[test]
    fn weight_is_conserved(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        prop_assert_eq!(graph.total_weight(), records.len() as u64);
        for (src, dst, _) in graph.edges() {
            prop_assert!((src as usize) < graph.node_count);
            prop_assert!((dst as usize) < graph.node_count);
        }
    }

    #[test]
    fn in_degree_is_bounded_and_zero_only_without_predecessors(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let scores = in_degree_centrality(&graph).unwrap();
        for node in 0..graph.node_count {
            let value = scores.get(node);
            prop_assert!((0.0..=1.0).contains(&value));
            let has_predecessor = graph
                .incoming_edges(node)
                .iter()
                .any(|&src| src as usize != node);
            prop_assert_eq!(value == 0.0, !has_predecessor);
        }
    }

    #[test]
    fn betweenness_is_bounded(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let scores = betweenness_centrality(&graph).unwrap();
        prop_assert!(scores.values.iter().all(|&v| (-EPS..=1.0 + EPS).contains(&v)));
    }

    #[test]
    fn eigenvector_is_a_unit_vector_in_the_unit_box(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let config = AnalysisConfig {
            eigenvector_max_iterations: 200,
            accept_unconverged: true,
            ..AnalysisConfig::default()
        };
        let values = compute_all(&graph, &config).unwrap().eigenvector.values;

        prop_assert_eq!(values.len(), graph.node_count);
        prop_assert!(values.iter().all(|&v| (0.0..=1.0 + EPS).contains(&v)), "{:?}", values);
        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        prop_assert!((norm - 1.0).abs() < 1e-9, "norm {}", norm);
    }

    #[test]
    fn partition_covers_every_node_once(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let outcome = detect_communities(&graph, 100).unwrap();
        let partition = &outcome.partition;

        prop_assert_eq!(partition.assignments.len(), graph.node_count);
        prop_assert!(partition.assignments.iter().all(|&c| c < partition.community_count));
        prop_assert_eq!(partition.sizes().iter().sum::<usize>(), graph.node_count);
        prop_assert!(partition.sizes().iter().all(|&size| size > 0));
    }

    #[test]
    fn sweeps_never_decrease_modularity(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let outcome = detect_communities(&graph, 100).unwrap();

        let history: Vec<f64> = outcome
            .levels
            .iter()
            .flat_map(|level| level.sweep_modularity.iter().copied())
            .collect();
        for pair in history.windows(2) {
            prop_assert!(pair[1] >= pair[0] - EPS, "modularity fell: {:?}", history);
        }

        if let Some(last) = history.last() {
            let recomputed = modularity(&to_undirected(&graph), &outcome.partition);
            prop_assert!((last - recomputed).abs() < 1e-6);
            prop_assert!((outcome.modularity - recomputed).abs() < EPS);
        }
    }

    #[test]
    fn louvain_is_deterministic(records in arb_records()) {
        let graph = build_graph(&records).unwrap();
        let first = detect_communities(&graph, 100).unwrap();
        let second = detect_communities(&graph, 100).unwrap();
        prop_assert_eq!(first, second);
    }
}
