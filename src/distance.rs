use crate::error::ClusterError;
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Euclidean distance between two equal-length vectors
///
/// # Panics
///
/// Panics if the vectors have different lengths. Use [`try_euclidean`]
/// when the arity is not already guaranteed by the caller.
#[inline]
pub fn euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "euclidean distance needs vectors of equal length"
    );

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Euclidean distance that reports an arity mismatch instead of panicking
pub fn try_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64, ClusterError> {
    if a.len() != b.len() {
        return Err(ClusterError::InvalidDimensions(format!(
            "Expected {} attributes, got {}",
            a.len(),
            b.len()
        )));
    }
    Ok(euclidean(a, b))
}

/// Find the closest centroid to `point`
///
/// `centroids` yields one entry per cluster in iteration order; `None` marks
/// an empty cluster and counts as infinitely far. Ties keep the first
/// candidate because only a strictly smaller distance replaces the best.
///
/// # Returns
/// * `Some((position, distance))` of the winner, `None` if no centroid exists
pub fn nearest_centroid<'a, I>(point: &ArrayView1<f64>, centroids: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = Option<ArrayView1<'a, f64>>>,
{
    let mut best: Option<(usize, f64)> = None;
    let mut best_dist = f64::INFINITY;

    for (pos, centroid) in centroids.into_iter().enumerate() {
        let Some(centroid) = centroid else {
            continue;
        };
        let dist = euclidean(point, &centroid);
        if best.is_none() || dist < best_dist {
            best_dist = dist;
            best = Some((pos, dist));
        }
    }

    best
}

/// Nearest centroid position for every row of `data`
///
/// Rows are processed in parallel; the result keeps row order. Each entry is
/// `None` only when no centroid is present at all.
pub fn nearest_centroids_parallel(
    data: &ArrayView2<f64>,
    centroids: &[Option<ArrayView1<f64>>],
) -> Vec<Option<usize>> {
    let rows: Vec<ArrayView1<f64>> = data.outer_iter().collect();

    rows.par_iter()
        .map(|row| nearest_centroid(row, centroids.iter().cloned()).map(|(pos, _)| pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_euclidean() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![4.0, 6.0, 3.0];

        assert_relative_eq!(euclidean(&a.view(), &b.view()), 5.0, epsilon = 1e-12);
        assert_relative_eq!(euclidean(&a.view(), &a.view()), 0.0);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_euclidean_length_mismatch_panics() {
        let a = array![1.0, 2.0];
        let b = array![1.0, 2.0, 3.0];
        let _ = euclidean(&a.view(), &b.view());
    }

    #[test]
    fn test_try_euclidean_length_mismatch() {
        let a = array![1.0, 2.0];
        let b = array![1.0];

        let result = try_euclidean(&a.view(), &b.view());
        assert!(matches!(result, Err(ClusterError::InvalidDimensions(_))));
    }

    #[test]
    fn test_nearest_centroid() {
        let c0 = array![0.0, 0.0];
        let c1 = array![10.0, 10.0];
        let point = array![1.0, 1.0];

        let (pos, dist) =
            nearest_centroid(&point.view(), vec![Some(c0.view()), Some(c1.view())]).unwrap();
        assert_eq!(pos, 0);
        assert_relative_eq!(dist, 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_nearest_centroid_skips_empty_and_keeps_first_tie() {
        let c1 = array![0.0, 0.0];
        let c2 = array![2.0, 0.0];
        let point = array![1.0, 0.0];

        // (1,0) is equidistant to both populated centroids
        let best = nearest_centroid(&point.view(), vec![None, Some(c1.view()), Some(c2.view())]);
        assert_eq!(best.map(|(pos, _)| pos), Some(1));

        let empty: Vec<Option<ArrayView1<f64>>> = vec![None, None];
        let none = nearest_centroid(&point.view(), empty);
        assert!(none.is_none());
    }

    #[test]
    fn test_nearest_centroids_parallel() {
        let data = array![[0.0, 0.0], [10.0, 10.0], [9.0, 8.0], [-1.0, 0.5]];
        let c0 = array![0.0, 0.0];
        let c1 = array![10.0, 10.0];

        let labels = nearest_centroids_parallel(&data.view(), &[Some(c0.view()), Some(c1.view())]);
        assert_eq!(labels, vec![Some(0), Some(1), Some(1), Some(0)]);
    }
}
