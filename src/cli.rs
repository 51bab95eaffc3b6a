use crate::config::{Config, Plan};
use crate::model::Granularity;
use crate::summary::exec::{self as summary, Mode};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gconc")]
#[command(about = "Contribution concentration metrics over git commit history")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to configuration file (default: ./gconc.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding commit data and contributor names")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for matrices and metric tables")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,
}

/// Per-run overrides of the configured metrics, settings and repositories.
#[derive(Args, Clone, Debug, Default)]
pub struct PlanArgs {
    #[arg(long = "metric", help = "Metric to compute, e.g. gini or tau_index=0.66 (repeatable)")]
    pub metrics: Vec<String>,

    #[arg(long = "granularity", help = "Commits per window, or 'all' for the whole history (repeatable)")]
    pub granularities: Vec<String>,

    #[arg(long = "entity", help = "Entity type: author or committer (repeatable)")]
    pub entity_types: Vec<String>,

    #[arg(long = "weight", help = "Weight kind, e.g. count or lines_changed (repeatable)")]
    pub weight_types: Vec<String>,

    #[arg(long = "repo", help = "Only process this repository (repeatable)")]
    pub repos: Vec<String>,

    #[arg(long, help = "Group contributors by resolved e-mail identity")]
    pub resolve_identities: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk local clones and save their commit data
    Collect {
        #[arg(long = "repo", help = "Only collect this repository (repeatable)")]
        repos: Vec<String>,

        #[arg(long, help = "Hide the progress spinner")]
        no_progress: bool,
    },
    /// Build the e-mail to contributor name tables
    Names {
        #[arg(long = "repo", help = "Only process this repository (repeatable)")]
        repos: Vec<String>,
    },
    /// Write per-entity contribution matrices
    Aggregate {
        #[clap(flatten)]
        plan: PlanArgs,
    },
    /// Compute metric tables from previously written matrices
    Metrics {
        #[clap(flatten)]
        plan: PlanArgs,
    },
    /// Aggregate and compute metric tables in one pass
    Run {
        #[clap(flatten)]
        plan: PlanArgs,
    },
    /// Print the per-window metrics of one repository
    Show {
        #[arg(help = "Repository name")]
        repo: String,

        #[clap(flatten)]
        plan: PlanArgs,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
}

impl CommonArgs {
    /// Configuration file merged with directory overrides from the command line.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        Ok(config)
    }
}

impl PlanArgs {
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if !self.metrics.is_empty() {
            config.metrics = self.metrics.clone();
        }
        if !self.granularities.is_empty() {
            config.granularities = self
                .granularities
                .iter()
                .map(|g| g.parse::<Granularity>())
                .collect::<std::result::Result<_, _>>()
                .context("Invalid --granularity")?;
        }
        if !self.entity_types.is_empty() {
            config.entity_types = self.entity_types.clone();
        }
        if !self.weight_types.is_empty() {
            config.weight_types = self.weight_types.clone();
        }
        if self.resolve_identities {
            config.resolve_identities = true;
        }
        Ok(())
    }

    /// Apply the overrides and validate the result.
    pub fn plan(&self, config: &mut Config) -> Result<Plan> {
        self.apply(config)?;
        let mut plan = config.validate().context("Invalid configuration")?;
        if !self.repos.is_empty() {
            plan.repositories = config.select_repositories(&self.repos);
        }
        if plan.repositories.is_empty() {
            anyhow::bail!("No repositories to process; add them under [repositories] in the configuration");
        }
        Ok(plan)
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Collect { repos, no_progress } => crate::collect::exec(self.common, repos, no_progress),
            Commands::Names { repos } => crate::names::exec(self.common, repos),
            Commands::Aggregate { plan } => summary::exec(self.common, plan, Mode::Aggregate),
            Commands::Metrics { plan } => summary::exec(self.common, plan, Mode::Metrics),
            Commands::Run { plan } => summary::exec(self.common, plan, Mode::Run),
            Commands::Show { repo, plan, json, ndjson } => crate::show::exec(self.common, repo, plan, json, ndjson),
        }
    }
}
