use super::{write_tables, MetricTable, RunStats, Summarizer};
use crate::cli::{CommonArgs, PlanArgs};
use crate::store::Store;
use anyhow::Context;
use console::style;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Matrices only.
    Aggregate,
    /// Metric tables from existing matrices.
    Metrics,
    /// Matrices (when enabled) and metric tables.
    Run,
}

pub fn exec(common: CommonArgs, plan_args: PlanArgs, mode: Mode) -> anyhow::Result<()> {
    let mut config = common.load_config()?;
    if mode == Mode::Aggregate {
        config.write_matrices = true;
    }
    let plan = plan_args.plan(&mut config)?;
    let store = Store::from_config(&config);
    let summarizer = Summarizer::new(&config, &plan, &store);
    let mut stats = RunStats::default();

    let tables: Vec<MetricTable> = match mode {
        Mode::Aggregate => {
            let corpus = summarizer.load_corpus(&mut stats);
            for combination in &plan.combinations {
                info!("Aggregating {combination}");
                summarizer.write_matrices(&corpus, combination, &mut stats);
            }
            Vec::new()
        }
        Mode::Metrics => plan
            .combinations
            .iter()
            .map(|combination| summarizer.summarize_matrices(combination, &mut stats))
            .collect(),
        Mode::Run => summarizer.run(&mut stats),
    };

    let mut files = 0;
    for table in &tables {
        files += write_tables(&store, table)
            .with_context(|| format!("Failed to write metric tables for {}", table.combination))?
            .len();
    }

    if stats.failures > 0 {
        warn!("{} repository/setting pairs failed; see messages above", stats.failures);
    }
    print_summary(&stats, plan.combinations.len(), files, &config.output_dir, &plan.rejected);
    Ok(())
}

fn print_summary(
    stats: &RunStats,
    combinations: usize,
    files: usize,
    output_dir: &std::path::Path,
    rejected: &[String],
) {
    eprintln!("{}", style("Summary").bold());
    eprintln!("{}", "─".repeat(50));
    eprintln!("Settings: {}", style(combinations).cyan());
    eprintln!("Repositories: {}", style(stats.repositories).cyan());
    if stats.skipped > 0 {
        eprintln!("Skipped: {}", style(stats.skipped).yellow());
    }
    if stats.failures > 0 {
        eprintln!("Failures: {}", style(stats.failures).red());
    }
    if stats.matrices > 0 {
        eprintln!("Matrices: {}", style(stats.matrices).green());
    }
    eprintln!("Metric rows: {}", style(stats.rows).green());
    eprintln!("Metric files: {}", style(files).green());
    if !rejected.is_empty() {
        eprintln!("Ignored identifiers: {}", style(rejected.join(", ")).dim());
    }
    eprintln!("Output: {}", style(output_dir.display()).dim());
}
