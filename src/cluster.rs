use crate::distance::euclidean;
use crate::element::Element;
use crate::error::ClusterError;
use ndarray::Array1;
use std::fmt;

/// Outcome of [`Cluster::replace`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The old element was found and swapped in place
    Replaced,
    /// The old element is not a member; the cluster is untouched
    NotFound,
}

/// A group of elements and the mean of their attributes.
///
/// The centroid is recomputed after every mutation of the member list, so it
/// is never stale. An empty cluster has no centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: usize,
    elements: Vec<Element>,
    centroid: Option<Element>,
}

impl Cluster {
    /// Create an empty cluster
    pub fn new(id: usize) -> Self {
        Self {
            id,
            elements: Vec::new(),
            centroid: None,
        }
    }

    /// Create a cluster from a list of elements
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] if the elements disagree on
    /// the number of attributes.
    pub fn with_elements(id: usize, elements: Vec<Element>) -> Result<Self, ClusterError> {
        let mut cluster = Self::new(id);
        for element in elements {
            cluster.add(element)?;
        }
        Ok(cluster)
    }

    /// Create a cluster holding a single element
    pub fn singleton(id: usize, element: Element) -> Self {
        let mut cluster = Self::new(id);
        cluster.elements.push(element);
        cluster.refresh_centroid();
        cluster
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn centroid(&self) -> Option<&Element> {
        self.centroid.as_ref()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of attributes shared by the members, `None` when empty
    pub fn dim(&self) -> Option<usize> {
        self.elements.first().map(Element::dim)
    }

    /// Append an element and recompute the centroid.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] if the element's arity
    /// differs from the existing members. The cluster is left unchanged.
    pub fn add(&mut self, element: Element) -> Result<(), ClusterError> {
        if let Some(d) = self.dim() {
            if element.dim() != d {
                return Err(ClusterError::InvalidDimensions(format!(
                    "Cluster {} expects {} attributes, got {}",
                    self.id,
                    d,
                    element.dim()
                )));
            }
        }

        self.elements.push(element);
        self.refresh_centroid();
        Ok(())
    }

    /// Remove the first member equal to `element`.
    ///
    /// Returns the removed member, or `None` if it was not present.
    pub fn remove(&mut self, element: &Element) -> Option<Element> {
        let pos = self.position(element)?;
        let removed = self.elements.remove(pos);
        self.refresh_centroid();
        Some(removed)
    }

    /// Swap `old` for `new` at the same position.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidDimensions`] if `new` does not match the
    /// cluster's arity (a sole member may be replaced by any arity).
    pub fn replace(&mut self, old: &Element, new: Element) -> Result<Replacement, ClusterError> {
        let Some(pos) = self.position(old) else {
            return Ok(Replacement::NotFound);
        };

        if self.elements.len() > 1 && new.dim() != old.dim() {
            return Err(ClusterError::InvalidDimensions(format!(
                "Cluster {} expects {} attributes, got {}",
                self.id,
                old.dim(),
                new.dim()
            )));
        }

        self.elements[pos] = new;
        self.refresh_centroid();
        Ok(Replacement::Replaced)
    }

    /// Sort members by ascending distance to the centroid (stable).
    pub fn reorder_by_centroid_distance(&mut self) {
        let Some(centroid) = self.centroid.as_ref() else {
            return;
        };
        let center = centroid.attributes();

        let mut keyed: Vec<(f64, Element)> = self
            .elements
            .drain(..)
            .map(|e| (euclidean(&e.attributes(), &center), e))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        self.elements = keyed.into_iter().map(|(_, e)| e).collect();
    }

    /// Distance of every member to the centroid, in member order.
    pub fn dispersion(&self) -> Vec<(&Element, f64)> {
        let Some(centroid) = self.centroid.as_ref() else {
            return Vec::new();
        };
        let center = centroid.attributes();

        self.elements
            .iter()
            .map(|e| (e, euclidean(&e.attributes(), &center)))
            .collect()
    }

    /// Recompute the centroid from the current members.
    ///
    /// Clears the centroid flag on every member first, then stores the
    /// per-attribute mean as a fresh centroid element.
    pub fn refresh_centroid(&mut self) {
        if self.elements.is_empty() {
            self.centroid = None;
            return;
        }

        for elem in self.elements.iter_mut() {
            elem.is_centroid = false;
        }

        let n_attributes = self.elements[0].dim();
        let mut sums: Array1<f64> = Array1::zeros(n_attributes);
        for elem in &self.elements {
            sums += &elem.attributes();
        }
        let means = sums / self.elements.len() as f64;

        self.centroid = Some(Element::centroid(self.id, means));
    }

    fn position(&self, element: &Element) -> Option<usize> {
        self.elements.iter().position(|e| e == element)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cluster {} - Centroide: ", self.id)?;
        match &self.centroid {
            Some(c) => write!(f, "{}", c)?,
            None => write!(f, "None")?,
        }
        write!(f, "\nElementos:")?;
        for elem in &self.elements {
            write!(f, "\n{}", elem)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn elem(name: &str, attrs: &[f64]) -> Element {
        Element::new(name, Array1::from(attrs.to_vec()))
    }

    #[test]
    fn test_centroid_is_mean() {
        let mut cluster = Cluster::new(1);
        cluster.add(elem("A", &[1.0, 2.0, 3.0])).unwrap();
        cluster.add(elem("B", &[2.0, 4.0, 5.0])).unwrap();
        cluster.add(elem("C", &[6.0, 0.0, 1.0])).unwrap();

        let centroid = cluster.centroid().unwrap();
        assert_eq!(centroid.name(), "Centroide_1");
        assert!(centroid.is_centroid());
        assert_relative_eq!(centroid.attributes()[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.attributes()[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.attributes()[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_members_never_flagged() {
        let mut cluster = Cluster::new(2);
        let mut flagged = elem("X", &[1.0]);
        flagged.is_centroid = true;

        cluster.add(flagged).unwrap();
        cluster.add(elem("Y", &[3.0])).unwrap();

        assert!(cluster.elements().iter().all(|e| !e.is_centroid()));
        assert!(cluster.centroid().unwrap().is_centroid());
    }

    #[test]
    fn test_add_rejects_arity_mismatch() {
        let mut cluster = Cluster::new(1);
        cluster.add(elem("A", &[1.0, 2.0])).unwrap();

        let result = cluster.add(elem("B", &[1.0]));
        assert!(matches!(result, Err(ClusterError::InvalidDimensions(_))));
        assert_eq!(cluster.len(), 1);
    }

    #[test]
    fn test_remove_last_member_clears_centroid() {
        let mut cluster = Cluster::new(1);
        let a = elem("A", &[1.0, 1.0]);
        cluster.add(a.clone()).unwrap();

        assert_eq!(cluster.remove(&a), Some(a.clone()));
        assert!(cluster.is_empty());
        assert!(cluster.centroid().is_none());

        // Absent element is a no-op
        assert_eq!(cluster.remove(&a), None);
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut cluster = Cluster::new(1);
        let dup = elem("D", &[0.0, 0.0]);
        cluster.add(dup.clone()).unwrap();
        cluster.add(elem("E", &[4.0, 4.0])).unwrap();
        cluster.add(dup.clone()).unwrap();

        cluster.remove(&dup);
        assert_eq!(cluster.len(), 2);
        assert_eq!(cluster.elements()[0].name(), "E");
        assert_eq!(cluster.centroid().unwrap().attributes(), array![2.0, 2.0]);
    }

    #[test]
    fn test_replace() {
        let mut cluster = Cluster::new(1);
        let a = elem("A", &[1.0, 2.0]);
        let b = elem("B", &[3.0, 4.0]);
        cluster.add(a.clone()).unwrap();
        cluster.add(b.clone()).unwrap();

        let outcome = cluster.replace(&a, elem("A2", &[5.0, 6.0])).unwrap();
        assert_eq!(outcome, Replacement::Replaced);
        assert_eq!(cluster.elements()[0].name(), "A2");
        assert_eq!(cluster.centroid().unwrap().attributes(), array![4.0, 5.0]);

        let before = cluster.clone();
        let missing = cluster.replace(&a, elem("Z", &[0.0, 0.0])).unwrap();
        assert_eq!(missing, Replacement::NotFound);
        assert_eq!(cluster, before);
    }

    #[test]
    fn test_replace_rejects_arity_mismatch() {
        let mut cluster = Cluster::new(1);
        let a = elem("A", &[1.0, 2.0]);
        cluster.add(a.clone()).unwrap();
        cluster.add(elem("B", &[3.0, 4.0])).unwrap();

        let result = cluster.replace(&a, elem("A2", &[1.0]));
        assert!(matches!(result, Err(ClusterError::InvalidDimensions(_))));
        assert_eq!(cluster.elements()[0], a);
    }

    #[test]
    fn test_reorder_is_sorted_and_stable() {
        let mut cluster = Cluster::new(1);
        cluster.add(elem("far", &[10.0, 0.0])).unwrap();
        cluster.add(elem("left", &[-1.0, 0.0])).unwrap();
        cluster.add(elem("near", &[3.0, 0.0])).unwrap();
        cluster.add(elem("right", &[5.0, 0.0])).unwrap();
        // centroid is (4.25, 0)

        cluster.reorder_by_centroid_distance();
        let names: Vec<&str> = cluster.elements().iter().map(Element::name).collect();
        assert_eq!(names, vec!["right", "near", "left", "far"]);

        let dists: Vec<f64> = cluster.dispersion().iter().map(|(_, d)| *d).collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_reorder_keeps_ties_in_order() {
        let mut cluster = Cluster::new(1);
        cluster.add(elem("P", &[1.0, 0.0])).unwrap();
        cluster.add(elem("Q", &[-1.0, 0.0])).unwrap();
        cluster.add(elem("R", &[0.0, 1.0])).unwrap();
        cluster.add(elem("S", &[0.0, -1.0])).unwrap();

        cluster.reorder_by_centroid_distance();
        let names: Vec<&str> = cluster.elements().iter().map(Element::name).collect();
        assert_eq!(names, vec!["P", "Q", "R", "S"]);
    }

    #[test]
    fn test_dispersion() {
        let mut cluster = Cluster::new(1);
        assert!(cluster.dispersion().is_empty());

        cluster.add(elem("A", &[0.0, 0.0])).unwrap();
        cluster.add(elem("B", &[6.0, 8.0])).unwrap();

        let disp = cluster.dispersion();
        assert_eq!(disp.len(), 2);
        assert_eq!(disp[0].0.name(), "A");
        assert_relative_eq!(disp[0].1, 5.0, epsilon = 1e-12);
        assert_relative_eq!(disp[1].1, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display() {
        let mut cluster = Cluster::new(4);
        assert_eq!(cluster.to_string(), "Cluster 4 - Centroide: None\nElementos:");

        cluster.add(elem("A", &[1.0, 2.0])).unwrap();
        assert_eq!(
            cluster.to_string(),
            "Cluster 4 - Centroide: Centroide_4: [1.0, 2.0] (Centroide)\nElementos:\nA: [1.0, 2.0]"
        );
    }
}
