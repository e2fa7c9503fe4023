use crate::cluster::Cluster;
use crate::distance::nearest_centroid;
use crate::element::Element;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One element moved out of its cluster by [`repartition`]
#[derive(Debug, Clone, PartialEq)]
pub struct Eviction {
    /// Name of the evicted element
    pub element: String,
    /// Cluster the element was taken from
    pub source: usize,
    /// Closer cluster that triggered the eviction
    pub trigger: usize,
    /// Distance to the source centroid
    pub distance: f64,
    /// Distance to the trigger centroid
    pub trigger_distance: f64,
    /// Singleton cluster seeded with the element
    pub new_cluster: usize,
}

/// Result of a re-partitioning pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepartitionReport {
    pub evictions: Vec<Eviction>,
}

impl RepartitionReport {
    /// True when the pass left every cluster untouched
    pub fn is_empty(&self) -> bool {
        self.evictions.is_empty()
    }

    /// Ids of the clusters created by the pass, in creation order
    pub fn new_cluster_ids(&self) -> Vec<usize> {
        self.evictions.iter().map(|e| e.new_cluster).collect()
    }
}

/// Run one dispersion-based re-partitioning pass
///
/// For every cluster present when the pass starts, the members farther than
/// `threshold` from their centroid are ranked farthest first and the top `k`
/// become candidates. A candidate leaves its cluster only when some other
/// cluster's centroid is strictly closer to it than its own. Every evicted
/// element then seeds a new singleton cluster numbered from `next_id`; the
/// closer cluster only decides the eviction, it never receives the element.
///
/// Clusters created during the pass are not scanned by it.
pub fn repartition(
    clusters: &mut Vec<Cluster>,
    next_id: &mut usize,
    threshold: f64,
    k: usize,
) -> RepartitionReport {
    let n_original = clusters.len();
    let mut queued: Vec<Element> = Vec::new();
    let mut evictions: Vec<Eviction> = Vec::new();

    for idx in 0..n_original {
        let mut candidates: Vec<(Element, f64)> = clusters[idx]
            .dispersion()
            .into_iter()
            .filter(|(_, dist)| *dist > threshold)
            .map(|(elem, dist)| (elem.clone(), dist))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(k);

        for (element, dist) in candidates {
            let others = clusters.iter().enumerate().map(|(j, other)| {
                if j == idx {
                    None
                } else {
                    other.centroid().map(Element::attributes)
                }
            });

            let Some((pos, dist_other)) = nearest_centroid(&element.attributes(), others) else {
                trace!(
                    "{} stays in cluster {}: no other populated cluster",
                    element.name(),
                    clusters[idx].id()
                );
                continue;
            };

            if dist_other < dist {
                trace!(
                    "Evicting {} from cluster {} ({:.4} > {:.4} to cluster {})",
                    element.name(),
                    clusters[idx].id(),
                    dist,
                    dist_other,
                    clusters[pos].id()
                );
                clusters[idx].remove(&element);
                evictions.push(Eviction {
                    element: element.name().to_string(),
                    source: clusters[idx].id(),
                    trigger: clusters[pos].id(),
                    distance: dist,
                    trigger_distance: dist_other,
                    new_cluster: 0,
                });
                queued.push(element);
            } else {
                trace!(
                    "{} stays in cluster {} ({:.4} <= {:.4})",
                    element.name(),
                    clusters[idx].id(),
                    dist,
                    dist_other
                );
            }
        }

        clusters[idx].refresh_centroid();
    }

    for (element, eviction) in queued.into_iter().zip(evictions.iter_mut()) {
        let id = *next_id;
        *next_id += 1;

        debug!("Seeding cluster {} with {}", id, element.name());
        clusters.push(Cluster::singleton(id, element));
        eviction.new_cluster = id;
    }

    for cluster in clusters.iter_mut() {
        cluster.refresh_centroid();
    }

    info!(
        "Re-partitioned {} clusters: {} evicted, {} clusters now",
        n_original,
        evictions.len(),
        clusters.len()
    );

    RepartitionReport { evictions }
}

/// Pick `n_clusters` distinct positions out of `0..n_samples`
///
/// The result is sorted so seeds keep their input order.
pub fn sample_seed_indices(n_samples: usize, n_clusters: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let indices: Vec<usize> = (0..n_samples).collect();
    let mut selected: Vec<usize> = indices
        .choose_multiple(&mut rng, n_clusters)
        .cloned()
        .collect();
    selected.sort_unstable();

    selected
}
