use crate::cli::{CommonArgs, PlanArgs};
use crate::store::Store;
use crate::summary::{MetricTable, MetricsOutput, RunStats, Summarizer};
use crate::util::{date_label, format_value};
use console::style;

pub fn exec(common: CommonArgs, repo: String, mut plan_args: PlanArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let mut config = common.load_config()?;
    config.write_matrices = false;
    plan_args.repos = vec![repo.clone()];
    let plan = plan_args.plan(&mut config)?;

    let store = Store::from_config(&config);
    let mut stats = RunStats::default();
    let tables = Summarizer::new(&config, &plan, &store).run(&mut stats);
    if stats.repositories == 0 {
        anyhow::bail!("No commit data for {repo}; run `gconc collect` first");
    }

    if json {
        output_json(&tables)
    } else if ndjson {
        output_ndjson(&tables)
    } else {
        output_table(&repo, &tables);
        Ok(())
    }
}

fn output_json(tables: &[MetricTable]) -> anyhow::Result<()> {
    let outputs: Vec<MetricsOutput> = tables.iter().map(MetricsOutput::from_table).collect();
    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}

fn output_ndjson(tables: &[MetricTable]) -> anyhow::Result<()> {
    for output in tables.iter().map(MetricsOutput::from_table) {
        for row in &output.rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

fn output_table(repo: &str, tables: &[MetricTable]) {
    for table in tables {
        println!("{} {}", style(repo).bold(), style(table.combination).dim());
        if table.is_empty() {
            println!("No metric rows\n");
            continue;
        }

        let names: Vec<String> = table.metrics.iter().map(ToString::to_string).collect();
        let widths: Vec<usize> = names.iter().map(|n| n.len().max(8)).collect();

        let mut header = format!("{:>6}  {:<10}", "window", "date");
        for (name, width) in names.iter().zip(&widths) {
            header.push_str(&format!("  {name:>width$}"));
        }
        println!("{}", style(header).bold());
        println!("{}", "─".repeat(18 + widths.iter().map(|w| w + 2).sum::<usize>()));

        for row in &table.rows {
            let mut line = format!("{:>6}  {:<10}", row.window, date_label(&row.date));
            for (value, width) in row.values.iter().zip(&widths) {
                let cell = match value {
                    Some(v) => format_value(Some((v * 10_000.0).round() / 10_000.0)),
                    None => "-".to_string(),
                };
                line.push_str(&format!("  {cell:>width$}"));
            }
            println!("{line}");
        }
        println!();
    }
}
