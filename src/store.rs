use crate::config::{Config, RepoRef};
use crate::error::{GconcError, Result};
use crate::identity::IdentityMap;
use crate::model::{Combination, Commit};
use crate::util::date_label;
use crate::window::{Aggregation, ContributionMatrix, Window};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MATRIX_CORNER: &str = "Entity \\ Time period";

/// File layout for commit data, contributor names and tabular outputs.
///
/// ```text
/// <data_dir>/commit_data/<ledger>/<repo>_repo_commits.json
/// <data_dir>/contributor_names/<repo>.json
/// <output_dir>/<weight>/<entity>/<granularity>/commits_per_entity/<repo>_commits_per_entity.csv
/// <output_dir>/<weight>/<entity>/<granularity>/metrics/
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    output_dir: PathBuf,
}

impl Store {
    pub fn new<D: AsRef<Path>, O: AsRef<Path>>(data_dir: D, output_dir: O) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir, &config.output_dir)
    }

    pub fn commit_data_path(&self, repo: &RepoRef) -> PathBuf {
        self.data_dir
            .join("commit_data")
            .join(&repo.ledger)
            .join(format!("{}_repo_commits.json", repo.name))
    }

    /// Commits of `repo`, newest-first. `None` when nothing was collected yet.
    pub fn load_commits(&self, repo: &RepoRef) -> Result<Option<Vec<Commit>>> {
        let path = self.commit_data_path(repo);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let commits = serde_json::from_str(&raw)
            .map_err(|e| GconcError::Parse(format!("{}: {e}", path.display())))?;
        Ok(Some(commits))
    }

    pub fn save_commits(&self, repo: &RepoRef, commits: &[Commit]) -> Result<PathBuf> {
        let path = self.commit_data_path(repo);
        write_json(&path, &commits)?;
        Ok(path)
    }

    pub fn names_path(&self, repository: &str) -> PathBuf {
        self.data_dir
            .join("contributor_names")
            .join(format!("{repository}.json"))
    }

    pub fn load_identities(&self, repository: &str) -> Result<IdentityMap> {
        let path = self.names_path(repository);
        let raw = fs::read_to_string(&path).map_err(|e| {
            GconcError::Config(format!(
                "Contributor names for {repository} not readable at {} ({e}); run `gconc names` first",
                path.display()
            ))
        })?;
        let names: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        Ok(IdentityMap::new(repository, names))
    }

    pub fn save_identities(&self, identities: &IdentityMap) -> Result<PathBuf> {
        let path = self.names_path(identities.repository());
        write_json(&path, identities.names())?;
        Ok(path)
    }

    pub fn combination_dir(&self, combination: &Combination) -> PathBuf {
        self.output_dir
            .join(combination.weight_kind.as_str())
            .join(combination.entity_type.as_str())
            .join(combination.granularity.to_string())
    }

    pub fn metrics_dir(&self, combination: &Combination) -> PathBuf {
        self.combination_dir(combination).join("metrics")
    }

    pub fn matrix_path(&self, combination: &Combination, repository: &str) -> PathBuf {
        self.combination_dir(combination)
            .join("commits_per_entity")
            .join(format!("{repository}_commits_per_entity.csv"))
    }

    /// Write the Entity × Window table; cells of inactive entities are 0.
    pub fn write_matrix(
        &self,
        combination: &Combination,
        repository: &str,
        aggregation: &Aggregation,
    ) -> Result<PathBuf> {
        let path = self.matrix_path(combination, repository);
        ensure_parent(&path)?;
        let mut wtr = csv::Writer::from_path(&path)?;

        let mut header = vec![MATRIX_CORNER.to_string()];
        header.extend(aggregation.windows.iter().map(|w| date_label(&w.date)));
        wtr.write_record(&header)?;

        for entity in aggregation.matrix.entities() {
            let mut row = vec![entity.to_string()];
            row.extend(
                aggregation
                    .windows
                    .iter()
                    .map(|w| aggregation.matrix.get(entity, w.index).to_string()),
            );
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(path)
    }

    /// Read back a table written by [`Store::write_matrix`].
    pub fn read_matrix(&self, combination: &Combination, repository: &str) -> Result<Option<Aggregation>> {
        let path = self.matrix_path(combination, repository);
        if !path.exists() {
            return Ok(None);
        }
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(&path)?;

        let windows = rdr
            .headers()?
            .iter()
            .skip(1)
            .enumerate()
            .map(|(index, label)| {
                NaiveDate::parse_from_str(label.trim(), "%Y-%m-%d")
                    .map(|date| Window { index, date })
                    .map_err(|e| GconcError::InvalidDate(format!("{}: '{label}': {e}", path.display())))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = ContributionMatrix::new();
        for record in rdr.records() {
            let record = record?;
            let Some(entity) = record.get(0) else { continue };
            for (index, cell) in record.iter().skip(1).enumerate().take(windows.len()) {
                let value: u64 = cell.trim().parse().map_err(|_| {
                    GconcError::Parse(format!("{}: bad value '{cell}' for {entity}", path.display()))
                })?;
                matrix.add(entity, index, value);
            }
        }

        Ok(Some(Aggregation {
            granularity: combination.granularity,
            windows,
            matrix,
            dropped_commits: 0,
        }))
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
