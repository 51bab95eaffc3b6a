//! Share-based concentration indices.

fn total(distribution: &[f64]) -> f64 {
    distribution.iter().sum()
}

/// Smallest number of top entities whose combined share reaches `threshold`.
///
/// Entities are consumed in the given (descending) order; a share exactly
/// equal to the threshold counts as reached. `None` when the total is zero.
pub fn tau_index(distribution: &[f64], threshold: f64) -> Option<usize> {
    let total = total(distribution);
    if total == 0.0 {
        return None;
    }

    let mut tau = 0;
    let mut covered = 0.0;
    for value in distribution {
        if covered >= threshold {
            break;
        }
        tau += 1;
        covered += value / total;
    }
    Some(tau)
}

/// Minimum number of entities controlling at least half of the contributions.
pub fn nakamoto_coefficient(distribution: &[f64]) -> Option<usize> {
    tau_index(distribution, 0.5)
}

/// Sum of squared percentage shares, in `[0, 10000]`.
pub fn herfindahl_hirschman_index(distribution: &[f64]) -> Option<f64> {
    let total = total(distribution);
    if total == 0.0 {
        return None;
    }
    Some(
        distribution
            .iter()
            .map(|value| (100.0 * value / total).powi(2))
            .sum(),
    )
}

pub fn total_entities(distribution: &[f64]) -> usize {
    distribution.len()
}

/// Share of the largest entity. Defined as 0 for an empty or all-zero
/// distribution.
pub fn max_power_ratio(distribution: &[f64]) -> f64 {
    let total = total(distribution);
    match distribution.first() {
        Some(largest) if total != 0.0 => largest / total,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tau_index_stops_once_threshold_is_met() {
        let d = [5.0, 3.0, 1.0, 1.0];
        assert_eq!(tau_index(&d, 0.5), Some(1));
        assert_eq!(tau_index(&d, 0.66), Some(2));
        assert_eq!(tau_index(&d, 0.85), Some(3));
        assert_eq!(tau_index(&d, 1.0), Some(4));
    }

    #[test]
    fn tau_index_threshold_tie_counts_as_met() {
        assert_eq!(tau_index(&[1.0, 1.0], 0.5), Some(1));
        assert_eq!(tau_index(&[1.0, 1.0, 1.0, 1.0], 0.5), Some(2));
    }

    #[test]
    fn tau_index_undefined_without_contributions() {
        assert_eq!(tau_index(&[], 0.5), None);
        assert_eq!(nakamoto_coefficient(&[0.0, 0.0]), None);
    }

    #[test]
    fn nakamoto_is_tau_at_one_half() {
        let d = [10.0, 9.0, 8.0, 2.0, 1.0];
        assert_eq!(nakamoto_coefficient(&d), tau_index(&d, 0.5));
        assert_eq!(nakamoto_coefficient(&d), Some(2));
    }

    #[test]
    fn hhi_bounds() {
        assert_eq!(herfindahl_hirschman_index(&[100.0]), Some(10000.0));
        let hhi = herfindahl_hirschman_index(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert!((hhi - 2500.0).abs() < 1e-9);
        assert_eq!(herfindahl_hirschman_index(&[]), None);
    }

    #[test]
    fn max_power_ratio_is_zero_not_undefined() {
        assert_eq!(max_power_ratio(&[]), 0.0);
        assert_eq!(max_power_ratio(&[0.0]), 0.0);
        assert_eq!(max_power_ratio(&[3.0, 1.0]), 0.75);
    }

    #[test]
    fn total_entities_counts_entries() {
        assert_eq!(total_entities(&[]), 0);
        assert_eq!(total_entities(&[4.0, 2.0, 1.0]), 3);
    }
}
