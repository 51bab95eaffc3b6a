use crate::cli::CommonArgs;
use crate::identity::IdentityMap;
use crate::store::Store;
use anyhow::Context;
use tracing::{info, warn};

pub fn exec(common: CommonArgs, repos: Vec<String>) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let store = Store::from_config(&config);
    let targets = config.select_repositories(&repos);
    if targets.is_empty() {
        anyhow::bail!("No repositories configured");
    }

    for repo in &targets {
        let Some(commits) = store
            .load_commits(repo)
            .with_context(|| format!("Failed to read commit data of {repo}"))?
        else {
            warn!("No commit data for {repo}; run `gconc collect` first");
            continue;
        };

        let identities = IdentityMap::from_commits(
            repo.name.clone(),
            &commits,
            config.identity_overrides.get(&repo.name),
        );
        let path = store
            .save_identities(&identities)
            .with_context(|| format!("Failed to write contributor names of {repo}"))?;
        info!("{repo}: {} identities written to {}", identities.len(), path.display());
    }
    Ok(())
}
