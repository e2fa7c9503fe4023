use crate::algorithm::{repartition, sample_seed_indices, RepartitionReport};
use crate::cluster::{Cluster, Replacement};
use crate::config::EngineConfig;
use crate::distance::{nearest_centroid, nearest_centroids_parallel};
use crate::element::Element;
use crate::encoder::{AttributeKind, RawValue, RecordEncoder};
use crate::error::ClusterError;
use log::{debug, warn};
use ndarray::{ArrayView1, ArrayView2};
use std::fmt;

/// Incremental clustering engine.
///
/// Elements arrive one at a time and join the cluster with the nearest
/// centroid. [`ClusterEngine::repartition`] later pulls far-away members out
/// of their cluster and seeds new clusters with them.
///
/// # Example
///
/// ```
/// use streamkmeans_rs::{ClusterEngine, Element};
///
/// let mut engine = ClusterEngine::new(5.0, 1);
/// engine
///     .initialize(vec![
///         Element::new("Elem1", vec![1.0, 2.0]),
///         Element::new("Elem2", vec![5.0, 6.0]),
///     ])
///     .unwrap();
///
/// let id = engine.add_element(Element::new("New", vec![2.0, 3.0])).unwrap();
/// assert_eq!(id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    /// Engine configuration
    config: EngineConfig,

    /// Clusters in creation order
    clusters: Vec<Cluster>,

    /// Id handed to the next spawned cluster
    next_id: usize,

    /// Per-position encoders for mixed-type records
    encoder: RecordEncoder,
}

impl ClusterEngine {
    /// Create an empty engine.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Dispersion cutoff for re-partitioning
    /// * `k` - Maximum evictions per cluster per pass
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0 or `threshold` is negative or NaN.
    pub fn new(threshold: f64, k: usize) -> Self {
        Self::with_config(EngineConfig::new(threshold, k))
    }

    /// Create an empty engine with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0 or `config.threshold` is negative or NaN.
    pub fn with_config(config: EngineConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");
        assert!(
            config.threshold >= 0.0,
            "threshold must be a non-negative number"
        );

        Self::build(config)
    }

    /// Create an empty engine, reporting an invalid configuration as an error.
    pub fn try_with_config(config: EngineConfig) -> Result<Self, ClusterError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            config,
            clusters: Vec::new(),
            next_id: 1,
            encoder: RecordEncoder::new(),
        }
    }

    /// Replace all clusters with one singleton cluster per element.
    ///
    /// Clusters are numbered from 1 in input order. The record encoder is
    /// reset as well, so the next record fixes a fresh schema.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] if the elements disagree on
    /// the number of attributes. The engine is unchanged in that case.
    pub fn initialize(&mut self, elements: Vec<Element>) -> Result<(), ClusterError> {
        check_uniform_dim(&elements)?;

        self.clusters = elements
            .into_iter()
            .enumerate()
            .map(|(i, elem)| Cluster::singleton(i + 1, elem))
            .collect();
        self.next_id = self.clusters.len() + 1;
        self.encoder = RecordEncoder::new();

        debug!("Initialized {} singleton clusters", self.clusters.len());
        Ok(())
    }

    /// Seed `n_clusters` clusters from a random sample and stream the rest in.
    ///
    /// Seeds are drawn with `config.seed`, keep their input order and get ids
    /// `1..=n_clusters`. The remaining elements are then added in input order
    /// through [`ClusterEngine::add_element`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `n_clusters` is 0
    /// - There are fewer elements than `n_clusters`
    /// - The elements disagree on the number of attributes
    pub fn initialize_sampled(
        &mut self,
        elements: Vec<Element>,
        n_clusters: usize,
    ) -> Result<(), ClusterError> {
        if n_clusters == 0 {
            return Err(ClusterError::InvalidK(
                "number of seed clusters must be greater than 0".to_string(),
            ));
        }
        if elements.len() < n_clusters {
            return Err(ClusterError::InsufficientData(format!(
                "Number of elements ({}) is less than number of clusters ({})",
                elements.len(),
                n_clusters
            )));
        }
        check_uniform_dim(&elements)?;

        let seeds = sample_seed_indices(elements.len(), n_clusters, self.config.seed);

        let mut seed_elements = Vec::with_capacity(n_clusters);
        let mut rest = Vec::with_capacity(elements.len() - n_clusters);
        let mut seeds_iter = seeds.iter().peekable();
        for (i, elem) in elements.into_iter().enumerate() {
            if seeds_iter.peek() == Some(&&i) {
                seeds_iter.next();
                seed_elements.push(elem);
            } else {
                rest.push(elem);
            }
        }

        self.initialize(seed_elements)?;
        for elem in rest {
            self.add_element(elem)?;
        }
        Ok(())
    }

    /// Adopt an externally built cluster.
    ///
    /// Later spawned clusters get ids above `cluster.id()`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Validation`] if the id is 0 or already taken,
    /// and [`ClusterError::InvalidDimensions`] if its arity differs from the
    /// engine's.
    pub fn add_cluster(&mut self, cluster: Cluster) -> Result<(), ClusterError> {
        if cluster.id() == 0 {
            return Err(ClusterError::Validation(
                "Cluster ids start at 1".to_string(),
            ));
        }
        if self.cluster(cluster.id()).is_some() {
            return Err(ClusterError::Validation(format!(
                "Cluster id {} is already in use",
                cluster.id()
            )));
        }
        if let Some(d) = cluster.dim() {
            self.check_dim(d)?;
        }

        self.next_id = self.next_id.max(cluster.id() + 1);
        self.clusters.push(cluster);
        Ok(())
    }

    /// Create a new singleton cluster holding `element` and return its id.
    pub fn spawn_cluster(&mut self, element: Element) -> Result<usize, ClusterError> {
        self.check_dim(element.dim())?;

        let id = self.next_id;
        self.next_id += 1;
        debug!("Spawning cluster {} with {}", id, element.name());
        self.clusters.push(Cluster::singleton(id, element));
        Ok(id)
    }

    /// Insert `element` into the cluster with the nearest centroid.
    ///
    /// Empty clusters count as infinitely far; on ties the first cluster in
    /// iteration order wins. If no cluster has a centroid the element goes
    /// to the first cluster, or seeds a new one when there are no clusters.
    ///
    /// # Returns
    ///
    /// The id of the cluster that absorbed the element.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] on an arity mismatch.
    pub fn add_element(&mut self, element: Element) -> Result<usize, ClusterError> {
        self.check_dim(element.dim())?;

        if self.clusters.is_empty() {
            return self.spawn_cluster(element);
        }

        let pos = self
            .nearest(&element.attributes())
            .map(|(pos, _)| pos)
            .unwrap_or(0);

        let cluster = &mut self.clusters[pos];
        debug!("Assigning {} to cluster {}", element.name(), cluster.id());
        cluster.add(element)?;
        Ok(cluster.id())
    }

    /// Encode a mixed-type record and insert it like [`ClusterEngine::add_element`].
    ///
    /// The first accepted record fixes the attribute schema. A rejected
    /// record leaves the encoder untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Validation`] if `values` and `kinds` differ in
    /// length or disagree with the schema, [`ClusterError::NotNumeric`] if
    /// a numerical position holds non-numeric text, and
    /// [`ClusterError::InvalidDimensions`] if the record arity differs from
    /// the engine's.
    pub fn add_record(
        &mut self,
        name: impl Into<String>,
        values: &[RawValue],
        kinds: &[AttributeKind],
    ) -> Result<usize, ClusterError> {
        self.check_dim(kinds.len())?;
        let attributes = self.encoder.encode(values, kinds)?;
        self.add_element(Element::new(name, attributes))
    }

    /// Raw values of an element encoded through [`ClusterEngine::add_record`].
    ///
    /// Categorical codes without a known category decode to
    /// [`crate::UNKNOWN_CATEGORY`].
    pub fn decode(&self, element: &Element) -> Result<Vec<RawValue>, ClusterError> {
        self.encoder.decode(&element.attributes())
    }

    /// Id of the nearest populated cluster for each row, without inserting.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No cluster has a centroid
    /// - The number of columns differs from the engine's arity
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Vec<usize>, ClusterError> {
        let d = self.dim().ok_or(ClusterError::NoClusters)?;
        if data.ncols() != d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                d,
                data.ncols()
            )));
        }

        let centroids: Vec<Option<ArrayView1<f64>>> = self
            .clusters
            .iter()
            .map(|c| c.centroid().map(Element::attributes))
            .collect();

        nearest_centroids_parallel(data, &centroids)
            .into_iter()
            .map(|pos| {
                pos.map(|p| self.clusters[p].id())
                    .ok_or(ClusterError::NoClusters)
            })
            .collect()
    }

    /// Run one dispersion-based re-partitioning pass.
    ///
    /// Members farther than `threshold` from their centroid are ranked
    /// farthest first and at most `k` per cluster are considered. A candidate
    /// is evicted only if another cluster's centroid is strictly closer, and
    /// each evicted element seeds a new singleton cluster. Clusters spawned
    /// by the pass are not scanned in the same pass.
    pub fn repartition(&mut self) -> RepartitionReport {
        repartition(
            &mut self.clusters,
            &mut self.next_id,
            self.config.threshold,
            self.config.k,
        )
    }

    /// Remove `element` from the cluster with the given id.
    ///
    /// Returns `Ok(None)` if the element is not a member.
    pub fn remove_element(
        &mut self,
        cluster_id: usize,
        element: &Element,
    ) -> Result<Option<Element>, ClusterError> {
        Ok(self.cluster_mut(cluster_id)?.remove(element))
    }

    /// Replace `old` with `new` in the cluster with the given id.
    pub fn replace_element(
        &mut self,
        cluster_id: usize,
        old: &Element,
        new: Element,
    ) -> Result<Replacement, ClusterError> {
        self.check_dim(new.dim())?;

        let outcome = self.cluster_mut(cluster_id)?.replace(old, new)?;
        if outcome == Replacement::NotFound {
            warn!(
                "Element {} not found in cluster {}, nothing replaced",
                old.name(),
                cluster_id
            );
        }
        Ok(outcome)
    }

    /// Sort every cluster's members by distance to their centroid.
    pub fn reorder_all(&mut self) {
        for cluster in self.clusters.iter_mut() {
            cluster.reorder_by_centroid_distance();
        }
    }

    /// Get the clusters in creation order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Get a cluster by id.
    pub fn cluster(&self, id: usize) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id() == id)
    }

    /// Get the number of clusters, empty ones included.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of elements across all clusters.
    pub fn n_elements(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// Id the next spawned cluster will receive.
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Number of attributes, `None` while every cluster is empty.
    pub fn dim(&self) -> Option<usize> {
        self.clusters.iter().find_map(Cluster::dim)
    }

    /// Get the record encoder.
    pub fn encoder(&self) -> &RecordEncoder {
        &self.encoder
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn cluster_mut(&mut self, id: usize) -> Result<&mut Cluster, ClusterError> {
        self.clusters
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(ClusterError::UnknownCluster(id))
    }

    fn nearest(&self, point: &ArrayView1<f64>) -> Option<(usize, f64)> {
        nearest_centroid(
            point,
            self.clusters
                .iter()
                .map(|c| c.centroid().map(Element::attributes)),
        )
    }

    fn check_dim(&self, got: usize) -> Result<(), ClusterError> {
        match self.dim() {
            Some(d) if d != got => Err(ClusterError::InvalidDimensions(format!(
                "Expected {} attributes, got {}",
                d, got
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ClusterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cluster) in self.clusters.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", cluster)?;
        }
        Ok(())
    }
}

fn check_uniform_dim(elements: &[Element]) -> Result<(), ClusterError> {
    if let Some(first) = elements.first() {
        if let Some(bad) = elements.iter().find(|e| e.dim() != first.dim()) {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} attributes, got {}",
                first.dim(),
                bad.dim()
            )));
        }
    }
    Ok(())
}
