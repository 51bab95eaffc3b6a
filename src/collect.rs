use crate::cli::CommonArgs;
use crate::config::{Config, RepoRef};
use crate::git::GitRepo;
use crate::model::Commit;
use crate::store::Store;
use anyhow::Context;
use console::Term;
use std::collections::HashMap;
use tracing::{info, warn};

/// Outcome of collecting one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collected {
    pub new_commits: usize,
    pub total_commits: usize,
}

pub fn exec(common: CommonArgs, repos: Vec<String>, no_progress: bool) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let store = Store::from_config(&config);
    let targets = config.select_repositories(&repos);
    if targets.is_empty() {
        anyhow::bail!("No repositories to collect; add them under [repositories] in the configuration");
    }

    let show_progress = !no_progress && Term::stderr().is_term();
    let mut failures = 0;
    for repo in &targets {
        info!("Collecting commits of {repo}...");
        match collect_repository(&config, &store, repo, show_progress) {
            Ok(collected) => info!(
                "Fetched {} new commits. Total commits saved: {}",
                collected.new_commits, collected.total_commits
            ),
            Err(e) => {
                warn!("{repo}: {e:#}");
                failures += 1;
            }
        }
    }

    if failures == targets.len() {
        anyhow::bail!("Commit collection failed for every repository");
    }
    Ok(())
}

/// Walk the local clone of `repo` and merge the result with the saved data.
/// Already saved commits are not diffed again.
pub fn collect_repository(
    config: &Config,
    store: &Store,
    repo: &RepoRef,
    show_progress: bool,
) -> anyhow::Result<Collected> {
    let path = config.source_path(repo);
    let git = GitRepo::open(&path)
        .with_context(|| format!("Failed to open git repository at {}", path.display()))?;

    let existing = store
        .load_commits(repo)
        .context("Failed to read saved commit data")?
        .unwrap_or_default();
    let known: HashMap<String, Commit> = existing
        .iter()
        .filter_map(|c| c.hash.clone().map(|hash| (hash, c.clone())))
        .collect();

    let commits = git
        .collect_commits(config.source_branch(repo), &known, show_progress)
        .context("Failed to walk commit history")?;
    let new_commits = commits
        .iter()
        .filter(|c| c.hash.as_ref().map_or(true, |h| !known.contains_key(h)))
        .count();

    if new_commits > 0 || commits.len() != existing.len() {
        let saved = store.save_commits(repo, &commits).context("Failed to save commit data")?;
        info!("Saved {} commits to {}", commits.len(), saved.display());
    }

    Ok(Collected {
        new_commits,
        total_commits: commits.len(),
    })
}
