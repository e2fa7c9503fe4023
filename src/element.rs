use crate::error::ClusterError;
use ndarray::{Array1, ArrayView1};
use std::fmt;
use std::str::FromStr;

const CENTROID_SUFFIX: &str = " (Centroide)";

/// A named record with an encoded attribute vector.
///
/// Equality is structural: name, attributes and centroid flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Array1<f64>,
    pub(crate) is_centroid: bool,
}

impl Element {
    /// Create a data-bearing element
    pub fn new(name: impl Into<String>, attributes: impl Into<Array1<f64>>) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into(),
            is_centroid: false,
        }
    }

    /// Synthetic element carrying a cluster mean
    pub(crate) fn centroid(cluster_id: usize, attributes: Array1<f64>) -> Self {
        Self {
            name: format!("Centroide_{}", cluster_id),
            attributes,
            is_centroid: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> ArrayView1<'_, f64> {
        self.attributes.view()
    }

    /// Number of attributes
    pub fn dim(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_centroid(&self) -> bool {
        self.is_centroid
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.name)?;
        for (i, value) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", value)?;
        }
        write!(f, "]")?;
        if self.is_centroid {
            write!(f, "{}", CENTROID_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for Element {
    type Err = ClusterError;

    /// Parse the `Display` rendering back into an element.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, is_centroid) = match s.strip_suffix(CENTROID_SUFFIX) {
            Some(body) => (body, true),
            None => (s, false),
        };

        // Names may contain ": [" themselves, the attribute list never does
        let split = body
            .rfind(": [")
            .ok_or_else(|| ClusterError::Validation(format!("Malformed element: {:?}", s)))?;
        let name = &body[..split];
        let list = body[split + 2..]
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ClusterError::Validation(format!("Malformed attributes: {:?}", s)))?;

        let attributes = if list.trim().is_empty() {
            Vec::new()
        } else {
            list.split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .map_err(|_| ClusterError::NotNumeric(v.trim().to_string()))
                })
                .collect::<Result<Vec<f64>, ClusterError>>()?
        };

        Ok(Self {
            name: name.to_string(),
            attributes: Array1::from(attributes),
            is_centroid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_display() {
        let elem = Element::new("Elem1", array![1.0, 2.5]);
        assert_eq!(elem.to_string(), "Elem1: [1.0, 2.5]");

        let centroid = Element::centroid(3, array![0.5, -1.0]);
        assert_eq!(centroid.to_string(), "Centroide_3: [0.5, -1.0] (Centroide)");
    }

    #[test]
    fn test_rendering_round_trip() {
        let elements = [
            Element::new("A", array![1.0, 2.0]),
            Element::new("odd: [name]", array![0.1, 1e-9, -3.25]),
            Element::centroid(7, array![4.0, 13.0 / 3.0]),
            Element::new("empty", Array1::<f64>::zeros(0)),
        ];

        for elem in elements {
            let parsed: Element = elem.to_string().parse().unwrap();
            assert_eq!(parsed, elem);
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!("no attributes here".parse::<Element>().is_err());
        assert!(matches!(
            "A: [1.0, x]".parse::<Element>(),
            Err(ClusterError::NotNumeric(_))
        ));
    }
}
