//! Generalized (Rényi) entropy in bits.

/// Entropy of the relative shares `p_i = x_i / total`.
///
/// - `alpha == 1`: Shannon entropy `−Σ p·log2(p)`
/// - `alpha == −1`: min-entropy `−log2(max p)`
/// - otherwise: Rényi entropy `log2(Σ p^alpha) / (1 − alpha)`
///
/// `None` when the total is zero.
pub fn entropy(distribution: &[f64], alpha: f64) -> Option<f64> {
    let total: f64 = distribution.iter().sum();
    if total == 0.0 {
        return None;
    }

    let shares = distribution.iter().map(|x| x / total).filter(|p| *p > 0.0);

    let value = if alpha == 1.0 {
        -shares.map(|p| p * p.log2()).sum::<f64>()
    } else if alpha == -1.0 {
        let max = shares.fold(0.0, f64::max);
        -max.log2()
    } else {
        shares.map(|p| p.powf(alpha)).sum::<f64>().log2() / (1.0 - alpha)
    };
    Some(value)
}

pub fn shannon_entropy(distribution: &[f64]) -> Option<f64> {
    entropy(distribution, 1.0)
}

pub fn min_entropy(distribution: &[f64]) -> Option<f64> {
    entropy(distribution, -1.0)
}
