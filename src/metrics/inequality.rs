//! Inequality indices (Gini, Theil).

/// Gini coefficient of the distribution.
///
/// Computed on the ascending-sorted values as
/// `Σ (2·rank − n − 1)·x / (n·Σx)` with 1-based ranks. Negative inputs are
/// shifted by the minimum first. `None` when the total is zero.
pub fn gini(distribution: &[f64]) -> Option<f64> {
    let total: f64 = distribution.iter().sum();
    if total == 0.0 {
        return None;
    }

    let mut values = distribution.to_vec();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        values.iter_mut().for_each(|v| *v -= min);
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return None;
    }

    let n = values.len() as f64;
    let weighted: f64 = values
        .iter()
        .enumerate()
        .map(|(i, x)| (2.0 * (i as f64 + 1.0) - n - 1.0) * x)
        .sum();
    Some(weighted / (n * sum))
}

/// Theil T index: `(1/n) Σ (x/μ)·ln(x/μ)` with `μ` the mean; zero entries
/// contribute nothing. An empty or all-zero distribution has no inequality,
/// so the index is `0` rather than undefined.
pub fn theil_index(distribution: &[f64]) -> Option<f64> {
    let total: f64 = distribution.iter().sum();
    if distribution.is_empty() || total == 0.0 {
        return Some(0.0);
    }

    let n = distribution.len() as f64;
    let mu = total / n;
    let sum: f64 = distribution
        .iter()
        .map(|value| value / mu)
        .filter(|x| *x > 0.0)
        .map(|x| x * x.ln())
        .sum();
    Some(sum / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gini_of_equal_shares_is_zero() {
        assert!(close(gini(&[4.0, 4.0, 4.0]).unwrap(), 0.0));
        assert!(close(gini(&[7.0]).unwrap(), 0.0));
    }

    #[test]
    fn gini_of_two_to_one() {
        assert!(close(gini(&[2.0, 1.0]).unwrap(), 1.0 / 6.0));
    }

    #[test]
    fn gini_approaches_one_with_dominant_entity() {
        let mut d = vec![1_000_000.0];
        d.extend(std::iter::repeat(1.0).take(999));
        let g = gini(&d).unwrap();
        assert!(g > 0.99, "gini was {g}");
        assert!(g <= 1.0);
    }

    #[test]
    fn gini_shifts_negative_values() {
        // [-1, 1, 3] shifts to [0, 2, 4]: (0·(-2) + 2·0 + 4·2) / (3·6)
        assert!(close(gini(&[3.0, 1.0, -1.0]).unwrap(), 4.0 / 9.0));
        assert_eq!(gini(&[-1.0, -1.0]), None);
    }

    #[test]
    fn gini_undefined_when_empty() {
        assert_eq!(gini(&[]), None);
        assert_eq!(gini(&[0.0, 0.0]), None);
    }

    #[test]
    fn theil_of_equal_shares_is_zero() {
        assert!(close(theil_index(&[5.0, 5.0, 5.0, 5.0]).unwrap(), 0.0));
    }

    #[test]
    fn theil_matches_closed_form() {
        // mu = 2, terms: 1.5 ln 1.5 + 0.5 ln 0.5
        let expected = (1.5 * 1.5f64.ln() + 0.5 * 0.5f64.ln()) / 2.0;
        assert!(close(theil_index(&[3.0, 1.0]).unwrap(), expected));
    }

    #[test]
    fn theil_is_zero_without_contributions() {
        assert_eq!(theil_index(&[]), Some(0.0));
        assert_eq!(theil_index(&[0.0, 0.0]), Some(0.0));
    }
}
