//! Recorded history and trend

use advisor_lib::history::HistoryTrend;
use anyhow::Result;
use tabled::Tabled;

use crate::client::HistoryView;
use crate::output::{
    format_delta, format_percent, format_timestamp, print_heading, print_info, print_json,
    print_table, OutputFormat,
};
use crate::source::Source;

#[derive(Tabled)]
struct MetricsRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
}

#[derive(Tabled)]
struct ContainersRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Running")]
    running: usize,
}

/// Show the most recent `limit` samples of each history list
pub async fn show_history(source: &Source, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let view = source.history(limit).await?;

    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Table => print_view(&view),
    }

    Ok(())
}

fn print_view(view: &HistoryView) {
    if view.log.is_empty() {
        print_info("No history recorded yet; run an analysis first");
        return;
    }

    print_heading("System metrics");
    let metrics: Vec<MetricsRow> = view
        .log
        .system_metrics
        .iter()
        .map(|e| MetricsRow {
            time: format_timestamp(&e.timestamp),
            cpu: format_percent(e.cpu_usage),
            memory: format_percent(e.memory_usage),
            disk: format_percent(e.disk_usage),
        })
        .collect();
    print_table(metrics, "No system metrics recorded");

    print_heading("Containers");
    let containers: Vec<ContainersRow> = view
        .log
        .containers
        .iter()
        .map(|e| ContainersRow {
            time: format_timestamp(&e.timestamp),
            total: e.container_count,
            running: e.running_count,
        })
        .collect();
    print_table(containers, "No container counts recorded");

    if let Some(trend) = &view.trend {
        println!("\n{}", trend_line(trend));
    }
}

fn trend_line(trend: &HistoryTrend) -> String {
    format!(
        "Trend over {} samples: CPU {} ({}), memory {} ({}), disk {} ({}), containers {:+}",
        trend.metric_samples,
        format_percent(trend.average_cpu_usage),
        format_delta(trend.cpu_delta),
        format_percent(trend.average_memory_usage),
        format_delta(trend.memory_delta),
        format_percent(trend.average_disk_usage),
        format_delta(trend.disk_delta),
        trend.container_delta
    )
}
