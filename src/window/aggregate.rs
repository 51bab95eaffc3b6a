use super::ContributionMatrix;
use crate::error::{GconcError, Result};
use crate::identity::IdentityMap;
use crate::metrics::{Distribution, Metric, MetricValue};
use crate::model::{Commit, EntityType, Granularity, WeightKind};
use crate::util::mean_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

/// A kept sampling window and its representative date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub index: usize,
    pub date: NaiveDate,
}

/// Result of bucketing one repository's commits.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub granularity: Granularity,
    pub windows: Vec<Window>,
    pub matrix: ContributionMatrix,
    /// Commits that fell into a dropped trailing window.
    pub dropped_commits: usize,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn distribution(&self, window: usize) -> Distribution {
        self.matrix.distribution(window)
    }

    /// Values of `metrics` for every kept window, in window order.
    pub fn window_metrics(&self, metrics: &[Metric]) -> Vec<(Window, Vec<MetricValue>)> {
        self.windows
            .iter()
            .map(|window| {
                let distribution = self.distribution(window.index);
                let values = metrics.iter().map(|m| m.compute(&distribution)).collect();
                (*window, values)
            })
            .collect()
    }
}

/// Buckets commits into sampling windows per entity.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    granularity: Granularity,
    entity_type: EntityType,
    weight_kind: WeightKind,
    identities: Option<&'a IdentityMap>,
    require_commits: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(granularity: Granularity, entity_type: EntityType, weight_kind: WeightKind) -> Self {
        Self {
            granularity,
            entity_type,
            weight_kind,
            identities: None,
            require_commits: false,
        }
    }

    /// Group by the resolved name of the selected e-mail instead of the raw name.
    pub fn with_identities(mut self, identities: &'a IdentityMap) -> Self {
        self.identities = Some(identities);
        self
    }

    /// Fail with [`GconcError::EmptyCommitSequence`] on an empty history.
    pub fn require_commits(mut self, require: bool) -> Self {
        self.require_commits = require;
        self
    }

    fn entity<'c>(&self, commit: &'c Commit) -> Result<&'c str>
    where
        'a: 'c,
    {
        match self.identities {
            Some(identities) => identities.resolve(self.entity_type.email(commit)),
            None => Ok(self.entity_type.name(commit)),
        }
    }

    /// Aggregate `commits`, given newest-first, into windows counted from the
    /// oldest commit. An incomplete trailing window is dropped unless it is
    /// the only one.
    pub fn aggregate(&self, commits: &[Commit]) -> Result<Aggregation> {
        let mut matrix = ContributionMatrix::new();
        let mut timestamps: Vec<Vec<DateTime<Utc>>> = Vec::new();

        for (position, commit) in commits.iter().rev().enumerate() {
            let window = self.granularity.window_of(position);
            if window == timestamps.len() {
                timestamps.push(Vec::new());
            }
            timestamps[window].push(self.entity_type.timestamp(commit));
            let entity = self.entity(commit)?;
            matrix.add(entity, window, self.weight_kind.weight(commit));
        }

        let mut dropped_commits = 0;
        if let Granularity::Commits(size) = self.granularity {
            let windows = timestamps.len();
            if let Some(last) = timestamps.last().filter(|ts| windows > 1 && ts.len() < size) {
                dropped_commits = last.len();
                let kept = timestamps.len() - 1;
                debug!(
                    window = kept,
                    commits = dropped_commits,
                    granularity = size,
                    "Dropping incomplete trailing window"
                );
                timestamps.truncate(kept);
                matrix.truncate_windows(kept);
            }
        }

        if timestamps.is_empty() && self.require_commits {
            return Err(GconcError::EmptyCommitSequence);
        }

        let windows = timestamps
            .iter()
            .enumerate()
            .map(|(index, ts)| {
                mean_date(ts)
                    .map(|date| Window { index, date })
                    .ok_or_else(|| GconcError::InvalidDate(format!("No mean date for window {index}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Aggregation {
            granularity: self.granularity,
            windows,
            matrix,
            dropped_commits,
        })
    }
}

/// Aggregate without identity resolution, tolerating empty input.
pub fn aggregate(
    commits: &[Commit],
    granularity: Granularity,
    entity_type: EntityType,
    weight_kind: WeightKind,
) -> Result<Aggregation> {
    Aggregator::new(granularity, entity_type, weight_kind).aggregate(commits)
}
