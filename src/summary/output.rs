use super::{MetricRow, MetricTable};
use crate::error::Result;
use crate::model::{Combination, SCHEMA_VERSION};
use crate::store::{ensure_parent, Store};
use crate::util::{date_label, format_value};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ALL_METRICS_CSV: &str = "all_metrics.csv";
pub const ALL_METRICS_JSON: &str = "all_metrics.json";

#[derive(Debug, Serialize)]
pub struct MetricsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub granularity: String,
    pub entity_type: String,
    pub weight_type: String,
    pub metrics: Vec<String>,
    pub rows: Vec<MetricsOutputRow>,
}

#[derive(Debug, Serialize)]
pub struct MetricsOutputRow {
    pub ledger: String,
    pub repository: String,
    pub window: usize,
    pub date: NaiveDate,
    pub values: BTreeMap<String, Option<f64>>,
}

impl MetricsOutput {
    pub fn from_table(table: &MetricTable) -> Self {
        let metrics: Vec<String> = table.metrics.iter().map(ToString::to_string).collect();
        let rows = table
            .rows
            .iter()
            .map(|row| MetricsOutputRow {
                ledger: row.ledger.clone(),
                repository: row.repository.clone(),
                window: row.window,
                date: row.date,
                values: metrics
                    .iter()
                    .cloned()
                    .zip(row.values.iter().map(|v| v.filter(|x| x.is_finite())))
                    .collect(),
            })
            .collect();

        let Combination {
            granularity,
            entity_type,
            weight_kind,
        } = table.combination;
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            granularity: granularity.to_string(),
            entity_type: entity_type.to_string(),
            weight_type: weight_kind.to_string(),
            metrics,
            rows,
        }
    }
}

/// Write `all_metrics.csv`, `all_metrics.json` and one `<metric>.csv` per
/// metric into the combination's metrics directory. Nothing is written for an
/// empty table.
pub fn write_tables(store: &Store, table: &MetricTable) -> Result<Vec<PathBuf>> {
    if table.is_empty() {
        info!("No metric rows for {}; nothing written", table.combination);
        return Ok(Vec::new());
    }

    let dir = store.metrics_dir(&table.combination);
    let mut written = Vec::with_capacity(table.metrics.len() + 2);

    let path = dir.join(ALL_METRICS_CSV);
    write_all_metrics(&path, table)?;
    written.push(path);

    let path = dir.join(ALL_METRICS_JSON);
    ensure_parent(&path)?;
    std::fs::write(&path, serde_json::to_string_pretty(&MetricsOutput::from_table(table))?)?;
    written.push(path);

    for metric in &table.metrics {
        let path = dir.join(format!("{metric}.csv"));
        write_series(&path, table, metric)?;
        written.push(path);
    }

    info!("Wrote {} metric files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_all_metrics(path: &Path, table: &MetricTable) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = ["ledger", "repository", "window", "date"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(table.metrics.iter().map(ToString::to_string));
    wtr.write_record(&header)?;

    for row in &table.rows {
        wtr.write_record(&row_record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

fn row_record(row: &MetricRow) -> Vec<String> {
    let mut record = vec![
        row.ledger.clone(),
        row.repository.clone(),
        row.window.to_string(),
        date_label(&row.date),
    ];
    record.extend(row.values.iter().map(|v| format_value(*v)));
    record
}

fn write_series(path: &Path, table: &MetricTable, metric: &crate::metrics::Metric) -> Result<()> {
    let Some(series) = table.series(metric) else {
        return Ok(());
    };
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["window".to_string()];
    header.extend(series.repositories.iter().cloned());
    wtr.write_record(&header)?;

    for (window, values) in &series.rows {
        let mut record = vec![window.to_string()];
        record.extend(values.iter().map(|v| format_value(*v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
