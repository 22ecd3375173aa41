//! End-to-end clustering scenarios through the engine

use trigger_cell_clustering::{
    ClusterType, ClusteringConfig, ClusteringEngine, ClusteringError, CompressedNeighborMap,
    ErrorKind, NeighborMapBuilder, Position, Side, Subdetector, TriggerCell,
};

fn cell(id: u32, x: f64, mip_pt: f64) -> TriggerCell {
    TriggerCell {
        id,
        position: Position::new(x, 50.0, 330.0),
        mip_pt,
        pt: mip_pt * 0.5,
        subdet: Subdetector::Silicon,
        layer: 1,
        side: Side::Plus,
    }
}

fn links(pairs: &[(u32, u32)]) -> CompressedNeighborMap {
    let mut builder = NeighborMapBuilder::default();
    for &(a, b) in pairs {
        builder.add_link(a, b);
    }
    builder.build()
}

fn engine(cluster_type: ClusterType, dr_cluster: f64) -> ClusteringEngine {
    let config = ClusteringConfig::new(5.0, 5.0, 2.0, 2.0, dr_cluster, cluster_type);
    ClusteringEngine::new(config).unwrap()
}

#[test]
fn test_scenario_a_radius_decides_merging() {
    let cells = vec![cell(1, 0.0, 10.0), cell(2, 0.5, 9.0)];
    let geometry = links(&[]);

    let wide = engine(ClusterType::Dr, 1.0).run(&cells, &geometry).unwrap();
    assert_eq!(wide.len(), 1);
    assert_eq!(wide.clusters[0].len(), 2);

    let narrow = engine(ClusterType::Dr, 0.1).run(&cells, &geometry).unwrap();
    assert_eq!(narrow.len(), 2);
    assert!(narrow.iter().all(|c| c.len() == 1));
}

#[test]
fn test_scenario_b_lonely_cell_below_threshold() {
    let cells = vec![cell(1, 0.0, 1.0)];
    let geometry = links(&[]);

    for cluster_type in [ClusterType::Dr, ClusterType::Nn, ClusterType::DrNn] {
        let collection = engine(cluster_type, 3.0).run(&cells, &geometry).unwrap();
        assert!(collection.is_empty(), "{} produced clusters", cluster_type);
    }
}

#[test]
fn test_scenario_c_chain_without_seed_is_discarded() {
    let cells = vec![cell(1, 0.0, 3.0), cell(2, 1.0, 4.5), cell(3, 2.0, 3.0)];
    let geometry = links(&[(1, 2), (2, 3), (1, 3)]);

    let collection = engine(ClusterType::Nn, 3.0).run(&cells, &geometry).unwrap();
    assert!(collection.is_empty());
}

#[test]
fn test_scenario_d_fractional_sharing() {
    let config = ClusteringConfig::new(0.5, 0.5, 0.1, 0.1, 3.0, ClusterType::DrNn);
    let engine = ClusteringEngine::new(config).unwrap();
    let cells = vec![cell(1, 0.0, 3.0), cell(2, 4.0, 1.0), cell(3, 2.0, 0.3)];
    let geometry = links(&[(1, 3), (3, 2)]);

    let collection = engine.run(&cells, &geometry).unwrap();
    assert_eq!(collection.len(), 2);

    let heavy = collection.iter().find(|c| c.id == 1).unwrap();
    let light = collection.iter().find(|c| c.id == 2).unwrap();
    assert!((heavy.fraction_of(3).unwrap() - 0.75).abs() < 1e-12);
    assert!((light.fraction_of(3).unwrap() - 0.25).abs() < 1e-12);
}

#[test]
fn test_nn_halo_touching_clusters_merge() {
    let cells = vec![cell(1, 0.0, 10.0), cell(3, 2.0, 10.0), cell(2, 1.0, 3.0)];
    let geometry = links(&[(1, 2), (2, 3)]);

    let collection = engine(ClusterType::Nn, 3.0).run(&cells, &geometry).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.clusters[0].id, 1);
    assert!(collection.clusters[0].contains(3));
}

#[test]
fn test_partitions_do_not_mix_sides_or_layers() {
    let mut other_layer = cell(2, 0.5, 10.0);
    other_layer.layer = 2;
    let mut other_side = cell(3, 0.5, 10.0);
    other_side.side = Side::Minus;
    let cells = vec![cell(1, 0.0, 10.0), other_layer, other_side];
    let geometry = links(&[(1, 2), (1, 3)]);

    for cluster_type in [ClusterType::Dr, ClusterType::Nn, ClusterType::DrNn] {
        let collection = engine(cluster_type, 3.0).run(&cells, &geometry).unwrap();
        assert_eq!(collection.len(), 3, "{}", cluster_type);
    }

    // Partition order: minus side first, then layers ascending
    let collection = engine(ClusterType::Nn, 3.0).run(&cells, &geometry).unwrap();
    let ids: Vec<u32> = collection.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_calibration_identities() {
    let cells = vec![cell(1, 0.0, 10.0), cell(2, 0.5, 4.0)];
    let geometry = links(&[(1, 2)]);

    let global = ClusteringConfig {
        calib_sf_cluster: 1.0,
        ..ClusteringConfig::new(5.0, 5.0, 2.0, 2.0, 1.0, ClusterType::Dr)
    };
    let collection = ClusteringEngine::new(global).unwrap().run(&cells, &geometry).unwrap();
    let cluster = &collection.clusters[0];
    assert_eq!(cluster.kinematics().pt, cluster.pt());
    assert!((cluster.pt() - 7.0).abs() < 1e-12);

    let layered = ClusteringConfig {
        apply_layer_calibration: true,
        layer_weights: vec![1.0; 10],
        ..ClusteringConfig::new(5.0, 5.0, 2.0, 2.0, 1.0, ClusterType::Dr)
    };
    let collection = ClusteringEngine::new(layered).unwrap().run(&cells, &geometry).unwrap();
    assert!((collection.clusters[0].kinematics().pt - 14.0).abs() < 1e-12);
}

#[test]
fn test_zero_layer_weight_is_a_configuration_error() {
    let config = ClusteringConfig {
        apply_layer_calibration: true,
        layer_weights: vec![1.0, 0.0, 1.0],
        ..ClusteringConfig::new(5.0, 5.0, 2.0, 2.0, 1.0, ClusterType::Nn)
    };
    let engine = ClusteringEngine::new(config).unwrap();
    let geometry = links(&[]);

    let mut elsewhere = cell(2, 0.0, 10.0);
    elsewhere.layer = 2;
    assert_eq!(engine.run(&[elsewhere], &geometry).unwrap().len(), 1);

    let err = engine.run(&[cell(1, 0.0, 10.0), elsewhere], &geometry).unwrap_err();
    assert_eq!(err, ClusteringError::ZeroLayerWeight { layer: 1 });
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
