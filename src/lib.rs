//! # streamkmeans-rs
//!
//! Incremental k-means clustering in Rust, built on ndarray.
//!
//! ## Features
//!
//! - **Online assignment**: Elements arrive one at a time and join the cluster
//!   with the nearest centroid; centroids are kept up to date on every change
//! - **Dispersion-driven splitting**: A re-partitioning pass evicts members that
//!   are far from their own centroid and closer to another one, seeding new
//!   clusters with them
//! - **Mixed attributes**: Categorical and numerical values share one distance
//!   computation through per-position encoders
//! - **Parallel prediction**: Read-only batch assignment uses rayon
//!
//! ## Example
//!
//! ```rust
//! use streamkmeans_rs::{Cluster, ClusterEngine, Element};
//!
//! let mut engine = ClusterEngine::new(5.0, 1);
//! let a = Cluster::with_elements(1, vec![
//!     Element::new("A", vec![1.0, 1.0]),
//!     Element::new("B", vec![1.0, 2.0]),
//!     Element::new("C", vec![10.0, 10.0]),
//! ]).unwrap();
//! let b = Cluster::with_elements(2, vec![
//!     Element::new("D", vec![5.0, 5.0]),
//!     Element::new("E", vec![6.0, 5.0]),
//! ]).unwrap();
//! engine.add_cluster(a).unwrap();
//! engine.add_cluster(b).unwrap();
//!
//! let report = engine.repartition();
//! assert_eq!(report.new_cluster_ids(), vec![3]);
//! assert_eq!(engine.len(), 3);
//! ```
//!
//! ## Mixed-Type Records
//!
//! ```rust
//! use streamkmeans_rs::{AttributeKind, ClusterEngine, RawValue};
//!
//! let kinds = [AttributeKind::Categorical, AttributeKind::Numerical];
//! let mut engine = ClusterEngine::new(1.0, 1);
//!
//! engine.add_record("p1", &["red".into(), 1.5.into()], &kinds).unwrap();
//! engine.add_record("p2", &["blue".into(), 2.0.into()], &kinds).unwrap();
//!
//! let first = &engine.clusters()[0].elements()[0];
//! assert_eq!(engine.decode(first).unwrap()[0], RawValue::Text("red".to_string()));
//! ```

mod algorithm;
mod cluster;
mod config;
mod distance;
mod element;
mod encoder;
mod engine;
mod error;

pub use algorithm::{Eviction, RepartitionReport};
pub use cluster::{Cluster, Replacement};
pub use config::EngineConfig;
pub use distance::{euclidean, try_euclidean};
pub use element::Element;
pub use encoder::{
    AttributeKind, CategoricalEncoder, Encoder, NumericalEncoder, RawValue, RecordEncoder,
    UNKNOWN_CATEGORY,
};
pub use engine::ClusterEngine;
pub use error::ClusterError;

#[cfg(test)]
pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
