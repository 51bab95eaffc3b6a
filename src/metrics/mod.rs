//! Concentration and inequality indices over a window's contribution
//! distribution.
//!
//! Every function takes the distribution sorted in descending order with
//! zero entries removed (see [`Distribution`]). A total of zero yields `None`
//! ("undefined") for every index except [`total_entities`],
//! [`max_power_ratio`] and [`theil_index`], which report `0`.

pub mod concentration;
pub mod entropy;
pub mod inequality;

pub use concentration::{
    herfindahl_hirschman_index, max_power_ratio, nakamoto_coefficient, tau_index, total_entities,
};
pub use entropy::{entropy, min_entropy, shannon_entropy};
pub use inequality::{gini, theil_index};

use crate::error::GconcError;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// A metric result; `None` marks an undefined value.
pub type MetricValue = Option<f64>;

/// Per-entity totals of one window, zeros removed, sorted descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(Vec<f64>);

impl Distribution {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut values: Vec<f64> = values
            .into_iter()
            .filter(|v| *v != 0.0 && !v.is_nan())
            .collect();
        values.sort_by(|a, b| b.total_cmp(a));
        Self(values)
    }

    pub fn from_counts<I: IntoIterator<Item = u64>>(counts: I) -> Self {
        Self::new(counts.into_iter().map(|c| c as f64))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for Distribution {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// The closed set of metrics the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    TauIndex(f64),
    NakamotoCoefficient,
    Gini,
    HerfindahlHirschmanIndex,
    Entropy(f64),
    TotalEntities,
    MaxPowerRatio,
    TheilIndex,
}

impl Metric {
    pub fn defaults() -> Vec<Metric> {
        vec![
            Metric::NakamotoCoefficient,
            Metric::Gini,
            Metric::HerfindahlHirschmanIndex,
            Metric::Entropy(1.0),
            Metric::TheilIndex,
            Metric::TotalEntities,
            Metric::MaxPowerRatio,
        ]
    }

    pub fn compute(&self, distribution: &[f64]) -> MetricValue {
        match *self {
            Metric::TauIndex(threshold) => tau_index(distribution, threshold).map(|k| k as f64),
            Metric::NakamotoCoefficient => nakamoto_coefficient(distribution).map(|k| k as f64),
            Metric::Gini => gini(distribution),
            Metric::HerfindahlHirschmanIndex => herfindahl_hirschman_index(distribution),
            Metric::Entropy(alpha) => entropy(distribution, alpha),
            Metric::TotalEntities => Some(total_entities(distribution) as f64),
            Metric::MaxPowerRatio => Some(max_power_ratio(distribution)),
            Metric::TheilIndex => theil_index(distribution),
        }
    }
}

fn parse_parameter(metric: &str, raw: &str) -> Result<f64, GconcError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GconcError::UnsupportedMetric(format!("{metric}: bad parameter '{raw}'")))
}

impl FromStr for Metric {
    type Err = GconcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, param) = match s.split_once('=') {
            Some((name, param)) => (name.trim(), Some(param)),
            None => (s, None),
        };

        match (name, param) {
            ("tau_index", Some(raw)) => {
                let threshold = parse_parameter(name, raw)?;
                if threshold <= 0.0 || threshold > 1.0 {
                    return Err(GconcError::UnsupportedMetric(format!(
                        "tau_index: threshold {threshold} outside (0, 1]"
                    )));
                }
                Ok(Metric::TauIndex(threshold))
            }
            ("entropy", Some(raw)) => Ok(Metric::Entropy(parse_parameter(name, raw)?)),
            ("nakamoto_coefficient", None) => Ok(Metric::NakamotoCoefficient),
            ("gini", None) => Ok(Metric::Gini),
            ("hhi" | "herfindahl_hirschman_index", None) => Ok(Metric::HerfindahlHirschmanIndex),
            ("entropy" | "shannon_entropy", None) => Ok(Metric::Entropy(1.0)),
            ("min_entropy", None) => Ok(Metric::Entropy(-1.0)),
            ("total_entities", None) => Ok(Metric::TotalEntities),
            ("max_power_ratio", None) => Ok(Metric::MaxPowerRatio),
            ("theil_index", None) => Ok(Metric::TheilIndex),
            _ => Err(GconcError::UnsupportedMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::TauIndex(threshold) => write!(f, "tau_index={threshold}"),
            Metric::NakamotoCoefficient => f.write_str("nakamoto_coefficient"),
            Metric::Gini => f.write_str("gini"),
            Metric::HerfindahlHirschmanIndex => f.write_str("hhi"),
            Metric::Entropy(alpha) if *alpha == 1.0 => f.write_str("entropy"),
            Metric::Entropy(alpha) if *alpha == -1.0 => f.write_str("min_entropy"),
            Metric::Entropy(alpha) => write!(f, "entropy={alpha}"),
            Metric::TotalEntities => f.write_str("total_entities"),
            Metric::MaxPowerRatio => f.write_str("max_power_ratio"),
            Metric::TheilIndex => f.write_str("theil_index"),
        }
    }
}
