//! Runs the aggregator and metrics engine across repositories and settings,
//! and assembles the result tables.

pub mod exec;
pub mod output;

pub use output::{write_tables, MetricsOutput};

use crate::config::{Config, Plan, RepoRef, SingleWindow};
use crate::error::Result;
use crate::identity::IdentityMap;
use crate::metrics::{Metric, MetricValue};
use crate::model::{Combination, Commit, Granularity};
use crate::store::Store;
use crate::window::{Aggregation, Aggregator};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Metric values of one repository window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub ledger: String,
    pub repository: String,
    pub window: usize,
    pub date: NaiveDate,
    pub values: Vec<MetricValue>,
}

/// All rows produced for one combination.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    pub combination: Combination,
    pub metrics: Vec<Metric>,
    pub rows: Vec<MetricRow>,
}

/// One metric as a window × repository grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    pub repositories: Vec<String>,
    pub rows: Vec<(usize, Vec<MetricValue>)>,
}

impl MetricTable {
    pub fn new(combination: Combination, metrics: &[Metric]) -> Self {
        Self {
            combination,
            metrics: metrics.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row per window of `aggregation`; returns the number added.
    ///
    /// A single window only yields a row for whole-history aggregation under
    /// [`SingleWindow::Keep`]; with a finite granularity there is no series.
    pub fn extend_from(&mut self, repo: &RepoRef, aggregation: &Aggregation, single_window: SingleWindow) -> usize {
        let keep_single =
            single_window == SingleWindow::Keep && aggregation.granularity == Granularity::WholeHistory;
        if aggregation.windows.len() < 2 && !keep_single {
            debug!(repository = %repo.name, windows = aggregation.windows.len(), "Single-window result skipped");
            return 0;
        }
        let before = self.rows.len();
        for (window, values) in aggregation.window_metrics(&self.metrics) {
            self.rows.push(MetricRow {
                ledger: repo.ledger.clone(),
                repository: repo.name.clone(),
                window: window.index,
                date: window.date,
                values,
            });
        }
        self.rows.len() - before
    }

    /// Repositories in first-seen order.
    pub fn repositories(&self) -> Vec<String> {
        let mut repos: Vec<String> = Vec::new();
        for row in &self.rows {
            if !repos.contains(&row.repository) {
                repos.push(row.repository.clone());
            }
        }
        repos
    }

    pub fn value(&self, repository: &str, window: usize, metric: &Metric) -> Option<MetricValue> {
        let column = self.metrics.iter().position(|m| m == metric)?;
        self.rows
            .iter()
            .find(|r| r.repository == repository && r.window == window)
            .map(|r| r.values[column])
    }

    /// Pivot `metric` into window rows and repository columns.
    pub fn series(&self, metric: &Metric) -> Option<MetricSeries> {
        let column = self.metrics.iter().position(|m| m == metric)?;
        let repositories = self.repositories();
        let windows = self.rows.iter().map(|r| r.window + 1).max().unwrap_or(0);

        let mut rows: Vec<(usize, Vec<MetricValue>)> =
            (0..windows).map(|w| (w, vec![None; repositories.len()])).collect();
        for row in &self.rows {
            if let Some(col) = repositories.iter().position(|r| *r == row.repository) {
                rows[row.window].1[col] = row.values[column];
            }
        }

        Some(MetricSeries {
            metric: *metric,
            repositories,
            rows,
        })
    }
}

/// Commits (and optionally identities) of one repository.
#[derive(Debug, Clone)]
pub struct RepoData {
    pub repo: RepoRef,
    pub commits: Vec<Commit>,
    pub identities: Option<IdentityMap>,
}

/// Counters reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub repositories: usize,
    pub skipped: usize,
    pub failures: usize,
    pub rows: usize,
    pub matrices: usize,
}

pub struct Summarizer<'a> {
    config: &'a Config,
    plan: &'a Plan,
    store: &'a Store,
}

impl<'a> Summarizer<'a> {
    pub fn new(config: &'a Config, plan: &'a Plan, store: &'a Store) -> Self {
        Self { config, plan, store }
    }

    /// Load the commit data of every planned repository. Repositories with
    /// missing or unreadable data are logged and left out.
    pub fn load_corpus(&self, stats: &mut RunStats) -> Vec<RepoData> {
        let mut corpus = Vec::new();
        for repo in &self.plan.repositories {
            match self.load_repository(repo) {
                Ok(Some(data)) => {
                    debug!(repository = %repo, commits = data.commits.len(), "Loaded commit data");
                    corpus.push(data);
                }
                Ok(None) => {
                    warn!("No commit data for {repo}; skipping");
                    stats.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to load {repo}: {e}");
                    stats.failures += 1;
                }
            }
        }
        stats.repositories = corpus.len();
        corpus
    }

    fn load_repository(&self, repo: &RepoRef) -> Result<Option<RepoData>> {
        let Some(commits) = self.store.load_commits(repo)? else {
            return Ok(None);
        };
        let identities = if self.config.resolve_identities {
            Some(self.store.load_identities(&repo.name)?)
        } else {
            None
        };
        Ok(Some(RepoData {
            repo: repo.clone(),
            commits,
            identities,
        }))
    }

    pub fn aggregate(&self, data: &RepoData, combination: &Combination) -> Result<Aggregation> {
        let mut aggregator = Aggregator::new(
            combination.granularity,
            combination.entity_type,
            combination.weight_kind,
        )
        .require_commits(self.config.require_commits);
        if let Some(identities) = &data.identities {
            aggregator = aggregator.with_identities(identities);
        }
        aggregator.aggregate(&data.commits)
    }

    /// Aggregation of one repository, counting a failure instead of
    /// propagating it.
    fn aggregate_isolated(
        &self,
        data: &RepoData,
        combination: &Combination,
        stats: &mut RunStats,
    ) -> Option<Aggregation> {
        match self.aggregate(data, combination) {
            Ok(aggregation) => Some(aggregation),
            Err(e) => {
                warn!("{} [{combination}]: {e}", data.repo);
                stats.failures += 1;
                None
            }
        }
    }

    fn record_matrix(
        &self,
        data: &RepoData,
        combination: &Combination,
        aggregation: &Aggregation,
        stats: &mut RunStats,
    ) {
        match self.store.write_matrix(combination, &data.repo.name, aggregation) {
            Ok(path) => {
                debug!(path = %path.display(), "Wrote matrix");
                stats.matrices += 1;
            }
            Err(e) => {
                warn!("{}: could not write matrix: {e}", data.repo);
                stats.failures += 1;
            }
        }
    }

    /// Aggregate every repository for `combination` and write the matrices,
    /// without computing any metric.
    pub fn write_matrices(&self, corpus: &[RepoData], combination: &Combination, stats: &mut RunStats) {
        for data in corpus {
            if let Some(aggregation) = self.aggregate_isolated(data, combination, stats) {
                self.record_matrix(data, combination, &aggregation, stats);
            }
        }
    }

    /// Aggregate every repository for `combination`, optionally persisting the
    /// matrices, and compute the metric rows.
    pub fn summarize(&self, corpus: &[RepoData], combination: &Combination, stats: &mut RunStats) -> MetricTable {
        let mut table = MetricTable::new(*combination, &self.plan.metrics);
        for data in corpus {
            let Some(aggregation) = self.aggregate_isolated(data, combination, stats) else {
                continue;
            };
            if self.config.write_matrices {
                self.record_matrix(data, combination, &aggregation, stats);
            }

            let added = table.extend_from(&data.repo, &aggregation, self.config.single_window);
            debug!(repository = %data.repo, windows = aggregation.windows.len(), rows = added, "Summarized");
            stats.rows += added;
        }
        table
    }

    /// Compute metrics from matrices previously written for `combination`.
    pub fn summarize_matrices(&self, combination: &Combination, stats: &mut RunStats) -> MetricTable {
        let mut table = MetricTable::new(*combination, &self.plan.metrics);
        for repo in &self.plan.repositories {
            match self.store.read_matrix(combination, &repo.name) {
                Ok(Some(aggregation)) => {
                    stats.repositories += 1;
                    stats.rows += table.extend_from(repo, &aggregation, self.config.single_window);
                }
                Ok(None) => {
                    warn!("No matrix for {repo} [{combination}]; skipping");
                    stats.skipped += 1;
                }
                Err(e) => {
                    warn!("{repo} [{combination}]: {e}");
                    stats.failures += 1;
                }
            }
        }
        table
    }

    /// Full pipeline over every planned combination.
    pub fn run(&self, stats: &mut RunStats) -> Vec<MetricTable> {
        let corpus = self.load_corpus(stats);
        self.plan
            .combinations
            .iter()
            .map(|combination| {
                info!("Processing {combination}");
                self.summarize(&corpus, combination, stats)
            })
            .collect()
    }
}
