//! Analysis summary and resource sizing commands

use advisor_lib::analysis::{ResourceRecommendation, UsageAnalysis};
use advisor_lib::engine::AnalysisResult;
use advisor_lib::models::{ContainerRef, HostSnapshot};
use anyhow::Result;
use tabled::Tabled;

use crate::output::{
    color_health, format_percent, print_heading, print_info, print_json, print_table,
    print_warning, OutputFormat,
};
use crate::source::Source;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Class")]
    class: &'static str,
    #[tabled(rename = "Containers")]
    containers: String,
}

/// Print the full analysis summary
pub async fn analyze(source: &Source, format: OutputFormat) -> Result<()> {
    let result = source.analysis().await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => print_summary(&result),
    }

    Ok(())
}

/// Print the recommended resource profile
pub async fn resources(source: &Source, format: OutputFormat) -> Result<()> {
    let resources = source.resources().await?;

    match format {
        OutputFormat::Json => print_json(&resources)?,
        OutputFormat::Table => {
            print_table(resource_rows(&resources), "No resource recommendation");
            println!("\n{}", resources.description);
        }
    }

    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    if let Some(err) = &result.provider_error {
        print_warning(&format!("Snapshot unavailable, analyzed an empty one: {err}"));
    }

    let usage = &result.analysis.container_analysis;
    if usage.is_empty() {
        print_info("No containers found");
    } else {
        print_heading("Containers");
        print_table(container_rows(usage), "No containers found");

        print_heading("Classification");
        print_table(class_rows(usage), "No containers flagged");
    }

    print_heading("Host");
    print_table(host_rows(&result.analysis.system_metrics), "No host metrics");

    print_heading("Resources");
    print_table(resource_rows(&result.resource_recommendation), "No resource recommendation");

    println!(
        "\nHealth: {} ({} issues, {} high priority)",
        color_health(result.health.status),
        result.health.issues_count,
        result.health.high_priority_count
    );
    if !result.normalization.is_clean() {
        println!(
            "Normalized {} fields ({} defaulted)",
            result.normalization.adjustments.len(),
            result.normalization.defaulted_count()
        );
    }
}

fn container_rows(usage: &UsageAnalysis) -> Vec<FieldRow> {
    let families = usage
        .container_types
        .iter()
        .map(|(family, count)| format!("{family} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        FieldRow::new("Total", usage.total_containers),
        FieldRow::new("Running", usage.running_containers),
        FieldRow::new("Stopped", usage.stopped_containers),
        FieldRow::new("Avg memory (MB)", format!("{:.1}", usage.average_memory_usage)),
        FieldRow::new("Avg CPU", format_percent(usage.average_cpu_usage)),
        FieldRow::new("Avg restarts", format!("{:.1}", usage.average_restart_count)),
        FieldRow::new("Images", families),
    ]
}

fn class_rows(usage: &UsageAnalysis) -> Vec<ClassRow> {
    [
        ("High memory", &usage.high_memory_containers),
        ("High CPU", &usage.high_cpu_containers),
        ("Idle", &usage.idle_containers),
        ("Frequent restarts", &usage.high_restart_containers),
    ]
    .into_iter()
    .filter(|(_, refs)| !refs.is_empty())
    .map(|(class, refs)| ClassRow {
        class,
        containers: names(refs),
    })
    .collect()
}

fn host_rows(host: &HostSnapshot) -> Vec<FieldRow> {
    vec![
        FieldRow::new("CPU", format_percent(host.cpu_usage)),
        FieldRow::new("Memory", format_percent(host.memory_usage)),
        FieldRow::new("Disk", format_percent(host.disk_usage)),
        FieldRow::new("Total memory (MB)", format!("{:.0}", host.total_memory)),
    ]
}

fn resource_rows(resources: &ResourceRecommendation) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Profile", resources.resource_profile),
        FieldRow::new("CPUs", resources.recommended_cpu),
        FieldRow::new("Memory", &resources.recommended_memory),
        FieldRow::new("Reservation", &resources.recommended_memory_reservation),
        FieldRow::new("Available", &resources.available_memory),
    ]
}

fn names(refs: &[ContainerRef]) -> String {
    refs.iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_lib::analysis::UsageAnalyzer;
    use advisor_lib::normalize::normalize;
    use advisor_lib::provider::{SimulatedProvider, SnapshotProvider};

    fn demo_usage() -> UsageAnalysis {
        let (snapshot, _) = normalize(SimulatedProvider::new().capture().unwrap());
        UsageAnalyzer::new().analyze(&snapshot.containers)
    }

    #[test]
    fn test_container_rows() {
        let rows = container_rows(&demo_usage());
        assert_eq!(rows[0].value, "4");
        assert_eq!(rows[1].value, "3");
        assert_eq!(rows[2].value, "1");
        assert!(rows[6].value.contains("nginx (1)"));
    }

    #[test]
    fn test_class_rows_skip_empty_classes() {
        let rows = class_rows(&demo_usage());
        assert!(rows.iter().all(|r| !r.containers.is_empty()));
        // postgres-db holds more than 1.75x the running average memory
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].class, "High memory");
        assert_eq!(rows[0].containers, "postgres-db");
    }

    #[test]
    fn test_no_containers_has_no_classes() {
        assert!(class_rows(&UsageAnalysis::no_containers()).is_empty());
    }
}
