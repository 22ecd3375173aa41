//! Results persistence module

use anyhow::Result;
use crate::cluster::ClusterBxCollection;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use serde_json::{json, to_string_pretty};

/// Save a cluster collection and its summary to the specified directory
pub fn save_results(collection: &ClusterBxCollection, output_dir: &str) -> Result<()> {
    log::info!("Saving {} clusters to {}", collection.len(), output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_clusters(collection, output_dir)?;
    save_summary(collection, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save every cluster with its (constituent, fraction) pairs
fn save_clusters(collection: &ClusterBxCollection, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("clusters.json");
    let mut file = File::create(path)?;

    let clusters_json = json!({
        "bx": collection.bx,
        "clusters": collection.iter().map(|c| {
            let kinematics = c.kinematics();
            json!({
                "id": c.id,
                "layer": c.layer,
                "side": c.side,
                "subdet": c.subdet,
                "mip_pt": c.mip_pt(),
                "pt": kinematics.pt,
                "eta": kinematics.eta,
                "phi": kinematics.phi,
                "centre": c.centre(),
                "constituents": c.constituent_fractions()
                    .map(|(id, fraction)| json!({ "id": id, "fraction": fraction }))
                    .collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>()
    });

    file.write_all(to_string_pretty(&clusters_json)?.as_bytes())?;

    Ok(())
}

/// Save summary information
fn save_summary(collection: &ClusterBxCollection, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let cluster_count = collection.len();
    let total_constituents: usize = collection.iter().map(|c| c.len()).sum();
    let total_pt: f64 = collection.iter().map(|c| c.kinematics().pt).sum();

    let mut per_layer: BTreeMap<u32, usize> = BTreeMap::new();
    for cluster in collection.iter() {
        *per_layer.entry(cluster.layer).or_insert(0) += 1;
    }

    let summary = json!({
        "bx": collection.bx,
        "cluster_count": cluster_count,
        "total_constituents": total_constituents,
        "avg_constituents": total_constituents as f64 /
                            if cluster_count == 0 { 1.0 } else { cluster_count as f64 },
        "total_calibrated_pt": total_pt,
        "largest_cluster_size": collection.iter().map(|c| c.len()).max().unwrap_or(0),
        "clusters_per_layer": per_layer,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Position, Side, Subdetector, TriggerCell};
    use crate::cluster::Cluster;

    fn cell(id: u32, x: f64, mip_pt: f64) -> TriggerCell {
        TriggerCell {
            id,
            position: Position::new(x, 0.0, 320.0),
            mip_pt,
            pt: mip_pt,
            subdet: Subdetector::Silicon,
            layer: 3,
            side: Side::Minus,
        }
    }

    #[test]
    fn test_save_results_writes_clusters_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let output_dir = output_dir.to_str().unwrap();

        let mut cluster = Cluster::new(&cell(1, 0.0, 6.0));
        cluster.add_constituent(&cell(2, 1.0, 2.0), 0.5);
        let mut collection = ClusterBxCollection::new(0);
        collection.push(cluster);

        save_results(&collection, output_dir).unwrap();

        let clusters: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(Path::new(output_dir).join("clusters.json")).unwrap())
                .unwrap();
        let saved = &clusters["clusters"][0];
        assert_eq!(saved["id"], 1);
        assert_eq!(saved["side"], -1);
        assert_eq!(saved["subdet"], "silicon");
        assert_eq!(saved["constituents"][1]["fraction"], 0.5);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(Path::new(output_dir).join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["cluster_count"], 1);
        assert_eq!(summary["total_constituents"], 2);
        assert_eq!(summary["clusters_per_layer"]["3"], 1);
    }
}
