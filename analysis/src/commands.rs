use std::path::Path;

use anyhow::{anyhow, Context};
use pushviz::config::ChartConfig;
use pushviz::data::history::PushHistory;
use pushviz::data::loader::load_records;
use pushviz::data::record::{extract_windows, Extraction};
use pushviz::data::sqlite::save_tables;
use pushviz::metrics::compare::compare_duration;
use pushviz::plot::chart_data::{distribution_chart, save_json, timeline_chart};

use crate::report;

fn load(file: &Path) -> anyhow::Result<Extraction> {
    let records = load_records(file)
        .with_context(|| format!("Failed to read push records from {}", file.display()))?;
    let extraction = extract_windows(&records);
    if !extraction.skipped.is_empty() {
        tracing::warn!(
            skipped = extraction.skipped.len(),
            valid = extraction.windows.len(),
            "Some push records could not be measured"
        );
    }
    Ok(extraction)
}

fn load_history(file: &Path) -> anyhow::Result<PushHistory> {
    Ok(PushHistory::from_windows(load(file)?.windows))
}

pub fn timeline(file: &Path, config: &ChartConfig, json: bool) -> anyhow::Result<()> {
    let extraction = load(file)?;
    let chart = timeline_chart(&extraction, config.time_unit).context("Failed to lay out timeline")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        println!("{}", report::timeline_table(&chart));
        println!("{} pushes on {} rows", chart.bars.len(), chart.row_count);
    }
    Ok(())
}

pub fn distribution(
    file: &Path,
    push_def: &str,
    out: Option<&Path>,
    config: &ChartConfig,
    json: bool,
) -> anyhow::Result<()> {
    let history = load_history(file)?;
    let chart = distribution_chart(&history, push_def, config)
        .with_context(|| format!("No duration distribution for push def '{push_def}'"))?;

    if let Some(out) = out {
        save_json(&chart, out).with_context(|| format!("Failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), "Wrote distribution chart");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        println!("{}", report::distribution_table(&chart));
        println!(
            "{} samples, dot radius {:.1}px",
            chart.samples.len(),
            chart.radius
        );
    }
    Ok(())
}

pub fn compare(file: &Path, push_id: &str, config: &ChartConfig, json: bool) -> anyhow::Result<()> {
    let history = load_history(file)?;
    let window = history
        .find(push_id)
        .ok_or_else(|| anyhow!("Push '{push_id}' not found or not measurable"))?;
    let table = history
        .table(&window.push_def, config.time_unit, config.scale, &config.end_states)
        .context("Failed to build duration table")?;
    let comparison = compare_duration(&table, window.duration(config.time_unit))
        .with_context(|| format!("No history to compare against for push def '{}'", window.push_def))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!(
            "{}",
            report::comparison_line(window, &comparison, config.time_unit, config.scale)
        );
    }
    Ok(())
}

pub fn cache(file: &Path, db: &Path, config: &ChartConfig) -> anyhow::Result<()> {
    let history = load_history(file)?;
    let tables = history
        .tables(config.time_unit, config.scale, &config.end_states)
        .context("Failed to build duration tables")?;
    save_tables(&tables, db).with_context(|| format!("Failed to write {}", db.display()))?;
    println!("Cached {} push defs in {}", tables.len(), db.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushviz::error::DistributionError;
    use tempfile::TempDir;

    const RECORDS: &str = r#"[
        {"id": "ok", "push_def": "web", "states": [
            {"stage": "canary", "state": 1, "start_time_nsec": 0},
            {"state": 2, "start_time_nsec": 120000000000}
        ]},
        {"id": "broken", "push_def": "batch", "states": [
            {"stage": "canary", "state": 1, "start_time_nsec": 0},
            {"state": 4, "start_time_nsec": 60000000000}
        ]}
    ]"#;

    fn records_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("pushes.json");
        std::fs::write(&path, RECORDS).unwrap();
        path
    }

    #[test]
    fn compare_known_push() {
        let dir = TempDir::new().unwrap();
        let file = records_file(&dir);
        compare(&file, "ok", &ChartConfig::default(), true).unwrap();
    }

    #[test]
    fn compare_unknown_push_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = records_file(&dir);
        let err = compare(&file, "missing", &ChartConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("'missing' not found"), "{err}");
    }

    #[test]
    fn compare_without_matching_history_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = records_file(&dir);
        // the only "batch" push failed, and only completed pushes form the history
        let err = compare(&file, "broken", &ChartConfig::default(), false).unwrap_err();
        assert_eq!(
            err.root_cause().downcast_ref::<DistributionError>(),
            Some(&DistributionError::EmptyDataset)
        );
    }

    #[test]
    fn missing_records_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = timeline(&dir.path().join("absent.json"), &ChartConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("Failed to read push records"), "{err}");
    }
}
