//! Distance weighting schemes evaluated at a single grid node.

/// An observation near a grid node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Neighbor {
    pub index: usize,
    /// Squared distance to the node
    pub dist_2: f64,
}

/// Weighted mean of the neighbour values.
///
/// Falls back to the plain mean when the weights vanish (all zero, or
/// underflowed).
fn weighted_mean(neighbors: &[Neighbor], values: &[f64], weight: impl Fn(f64) -> f64) -> f64 {
    let weights: Vec<f64> = neighbors.iter().map(|n| weight(n.dist_2)).collect();
    let total: f64 = weights.iter().sum();

    if total > 0.0 && total.is_finite() {
        neighbors
            .iter()
            .zip(&weights)
            .map(|(n, w)| values[n.index] * (w / total))
            .sum()
    } else {
        mean(neighbors, values)
    }
}

fn mean(neighbors: &[Neighbor], values: &[f64]) -> f64 {
    let sum: f64 = neighbors.iter().map(|n| values[n.index]).sum();
    sum / neighbors.len() as f64
}

/// Inverse distance squared weighting.
///
/// Observations exactly at the node win outright.
pub(crate) fn inverse_distance(neighbors: &[Neighbor], values: &[f64]) -> f64 {
    let coincident: Vec<Neighbor> = neighbors
        .iter()
        .copied()
        .filter(|n| n.dist_2 == 0.0)
        .collect();
    if !coincident.is_empty() {
        return mean(&coincident, values);
    }
    weighted_mean(neighbors, values, |d2| 1.0 / d2)
}

pub(crate) fn cressman(neighbors: &[Neighbor], values: &[f64], radius_2: f64) -> f64 {
    weighted_mean(neighbors, values, |d2| (radius_2 - d2) / (radius_2 + d2))
}

pub(crate) fn barnes(neighbors: &[Neighbor], values: &[f64], kappa: f64) -> f64 {
    weighted_mean(neighbors, values, |d2| (-d2 / kappa).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(entries: &[(usize, f64)]) -> Vec<Neighbor> {
        entries
            .iter()
            .map(|&(index, dist)| Neighbor {
                index,
                dist_2: dist * dist,
            })
            .collect()
    }

    #[test]
    fn test_inverse_distance_coincident() {
        let values = [10.0, 20.0, 30.0];
        let n = near(&[(0, 0.0), (1, 5.0), (2, 0.0)]);
        assert_eq!(inverse_distance(&n, &values), 20.0);
    }

    #[test]
    fn test_inverse_distance_closer_dominates() {
        let values = [10.0, 20.0];
        let n = near(&[(0, 1.0), (1, 2.0)]);
        // Weights 1 and 1/4
        let expected = (10.0 * 1.0 + 20.0 * 0.25) / 1.25;
        assert!((inverse_distance(&n, &values) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cressman_on_radius_falls_back_to_mean() {
        let values = [1000.0, 1010.0];
        let n = near(&[(0, 100.0), (1, 100.0)]);
        assert_eq!(cressman(&n, &values, 100.0 * 100.0), 1005.0);
    }

    #[test]
    fn test_cressman_weights() {
        let values = [0.0, 10.0];
        let n = near(&[(0, 0.0), (1, 50.0)]);
        let r2 = 100.0 * 100.0;
        // Weights 1 and (1 - 0.25) / (1 + 0.25) = 0.6
        let expected = 10.0 * 0.6 / 1.6;
        assert!((cressman(&n, &values, r2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_barnes_single_value_is_exact() {
        let values = [1013.7];
        let n = near(&[(0, 123.0)]);
        assert_eq!(barnes(&n, &values, 1e4), 1013.7);
    }

    #[test]
    fn test_barnes_underflow_falls_back_to_mean() {
        let values = [2.0, 4.0];
        let n = near(&[(0, 1e6), (1, 1e6)]);
        assert_eq!(barnes(&n, &values, 1.0), 3.0);
    }
}
