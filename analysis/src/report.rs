use comfy_table::Table;
use pushviz::config::{ProbabilityScale, TimeUnit};
use pushviz::data::record::PushWindow;
use pushviz::metrics::compare::PushComparison;
use pushviz::plot::chart_data::{DistributionChart, TimelineChart};

fn format_probability(p: f64, scale: ProbabilityScale) -> String {
    match scale {
        ProbabilityScale::Percent => format!("{p:.1}%"),
        ProbabilityScale::Fraction => format!("{p:.3}"),
    }
}

pub fn timeline_table(chart: &TimelineChart) -> Table {
    let unit = chart.unit.suffix();
    let mut table = Table::new();
    table.set_header(vec!["push", "push def", "start", "end", "row", "state"]);
    for bar in &chart.bars {
        table.add_row(vec![
            bar.id.clone(),
            bar.push_def.clone(),
            format!("{:.2}{unit}", bar.start),
            format!("{:.2}{unit}", bar.end),
            bar.row.to_string(),
            bar.end_state.to_string(),
        ]);
    }
    for skipped in &chart.skipped {
        table.add_row(vec![
            skipped.push_id.clone(),
            String::new(),
            String::new(),
            String::new(),
            "-".to_string(),
            skipped.reason.to_string(),
        ]);
    }
    table
}

pub fn distribution_table(chart: &DistributionChart) -> Table {
    let unit = chart.unit.suffix();
    let mut table = Table::new();
    table.set_header(vec!["percentile", "duration"]);
    for marker in &chart.markers {
        table.add_row(vec![
            format_probability(marker.probability, chart.scale),
            format!("{:.2}{unit}", marker.duration),
        ]);
    }
    table
}

pub fn comparison_line(
    window: &PushWindow,
    comparison: &PushComparison,
    unit: TimeUnit,
    scale: ProbabilityScale,
) -> String {
    let unit = unit.suffix();
    format!(
        "{} ({}, {}): {:.2}{unit}, at {} of history, median {:.2}{unit}{}",
        window.id,
        window.push_def,
        window.end_state,
        comparison.duration,
        format_probability(comparison.percentile, scale),
        comparison.median,
        if comparison.slower_than_median { ", slower than median" } else { "" },
    )
}
