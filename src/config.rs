use crate::error::{GconcError, Result};
use crate::metrics::Metric;
use crate::model::{Combination, EntityType, Granularity, WeightKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "gconc.toml";

/// Whether a repository whose whole-history aggregation produced a single
/// window still contributes metric rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingleWindow {
    #[default]
    Keep,
    Skip,
}

/// Where `gconc collect` finds the local clone of a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub path: Option<PathBuf>,
    pub branch: Option<String>,
}

/// Run configuration, read once at start-up and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// ledger → repository names
    pub repositories: BTreeMap<String, Vec<String>>,
    pub metrics: Vec<String>,
    pub granularities: Vec<Granularity>,
    pub entity_types: Vec<String>,
    pub weight_types: Vec<String>,
    pub resolve_identities: bool,
    pub require_commits: bool,
    pub single_window: SingleWindow,
    pub write_matrices: bool,
    /// repository name → clone location
    pub sources: BTreeMap<String, Source>,
    /// repository name → e-mail → display name
    pub identity_overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            repositories: BTreeMap::new(),
            metrics: Metric::defaults().iter().map(Metric::to_string).collect(),
            granularities: vec![Granularity::WholeHistory],
            entity_types: vec![EntityType::Author.to_string()],
            weight_types: vec![WeightKind::Count.to_string()],
            resolve_identities: false,
            require_commits: false,
            single_window: SingleWindow::Keep,
            write_matrices: true,
            sources: BTreeMap::new(),
            identity_overrides: BTreeMap::new(),
        }
    }
}

/// A configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepoRef {
    pub ledger: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ledger)
    }
}

/// Validated work list derived from a [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub metrics: Vec<Metric>,
    pub combinations: Vec<Combination>,
    pub repositories: Vec<RepoRef>,
    /// Identifiers that were dropped during validation.
    pub rejected: Vec<String>,
}

impl Config {
    /// Load `path`, or `gconc.toml` in the working directory when present,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GconcError::Config(format!("Cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_toml(&raw)?;
        // Relative directories are relative to the config file.
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.rebase(base);
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn rebase(&mut self, base: &Path) {
        for dir in [&mut self.data_dir, &mut self.output_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        for source in self.sources.values_mut() {
            if let Some(path) = source.path.as_mut().filter(|p| p.is_relative()) {
                *path = base.join(&*path);
            }
        }
    }

    pub fn repositories(&self) -> Vec<RepoRef> {
        self.repositories
            .iter()
            .flat_map(|(ledger, repos)| {
                repos.iter().map(move |name| RepoRef {
                    ledger: ledger.clone(),
                    name: name.clone(),
                })
            })
            .collect()
    }

    /// Configured repositories restricted to `names` (all when empty).
    /// Names that are not configured are logged.
    pub fn select_repositories(&self, names: &[String]) -> Vec<RepoRef> {
        for name in names {
            if !self.repositories.values().any(|repos| repos.contains(name)) {
                warn!("Repository {name} is not configured; ignoring");
            }
        }
        let mut repos = self.repositories();
        if !names.is_empty() {
            repos.retain(|r| names.contains(&r.name));
        }
        repos
    }

    /// Local clone location, defaulting to `<data_dir>/repos/<ledger>/<repo>`.
    pub fn source_path(&self, repo: &RepoRef) -> PathBuf {
        self.sources
            .get(&repo.name)
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| self.data_dir.join("repos").join(&repo.ledger).join(&repo.name))
    }

    pub fn source_branch(&self, repo: &RepoRef) -> Option<&str> {
        self.sources.get(&repo.name).and_then(|s| s.branch.as_deref())
    }

    /// Parse every identifier. Unknown metrics, entity types and weight kinds
    /// are logged and left out; the run fails only when nothing usable is left.
    pub fn validate(&self) -> Result<Plan> {
        let mut rejected = Vec::new();

        let metrics = parse_all::<Metric>(&self.metrics, &mut rejected);
        if metrics.is_empty() {
            return Err(GconcError::Config("no supported metrics configured".into()));
        }

        let entity_types = parse_all::<EntityType>(&self.entity_types, &mut rejected);
        let weight_kinds = parse_all::<WeightKind>(&self.weight_types, &mut rejected);

        let mut combinations = Vec::new();
        for &weight_kind in &weight_kinds {
            for &entity_type in &entity_types {
                for &granularity in &self.granularities {
                    combinations.push(Combination {
                        granularity,
                        entity_type,
                        weight_kind,
                    });
                }
            }
        }
        if combinations.is_empty() {
            return Err(GconcError::Config(
                "no valid (granularity, entity type, weight type) combination configured".into(),
            ));
        }

        Ok(Plan {
            metrics,
            combinations,
            repositories: self.repositories(),
            rejected,
        })
    }
}

fn parse_all<T>(raw: &[String], rejected: &mut Vec<String>) -> Vec<T>
where
    T: std::str::FromStr<Err = GconcError> + PartialEq,
{
    let mut parsed = Vec::new();
    for item in raw {
        match item.parse::<T>() {
            Ok(value) if !parsed.contains(&value) => parsed.push(value),
            Ok(_) => debug!(item = %item, "Ignoring duplicate identifier"),
            Err(e) => {
                warn!("{e}; skipping");
                rejected.push(item.clone());
            }
        }
    }
    parsed
}
