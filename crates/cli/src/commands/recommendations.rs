//! Recommendation listing

use advisor_lib::analysis::{Priority, Recommendation, RecommendationKind};
use anyhow::Result;
use tabled::Tabled;

use crate::output::{color_priority, print_json, print_table, OutputFormat};
use crate::source::Source;

/// Row for recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Affects")]
    affected: String,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(r: &Recommendation) -> Self {
        let affected = if !r.affected_containers.is_empty() {
            r.affected_containers.join(", ")
        } else if !r.templates.is_empty() {
            r.templates
                .iter()
                .map(|t| t.template_id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            "-".to_string()
        };

        Self {
            priority: color_priority(r.priority),
            kind: r.kind.to_string(),
            category: r.category.to_string(),
            title: r.title.clone(),
            affected,
        }
    }
}

/// List recommendations, optionally filtered by priority and type
pub async fn get_recommendations(
    source: &Source,
    priority: Option<Priority>,
    kind: Option<RecommendationKind>,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let recommendations = source.recommendations(priority, kind).await?;

    match format {
        OutputFormat::Json => print_json(&recommendations)?,
        OutputFormat::Table => {
            let rows: Vec<RecommendationRow> = recommendations.iter().map(Into::into).collect();
            print_table(rows, "No recommendations found");

            if verbose {
                for r in &recommendations {
                    println!("\n{}: {}", r.title, r.description);
                    for action in &r.actions {
                        println!("  - {action}");
                    }
                }
            }
            println!("\nTotal: {} recommendations", recommendations.len());
        }
    }

    Ok(())
}

/// clap value parser for `--priority`
pub fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("expected one of low, medium, high; got '{s}'"))
}

/// clap value parser for `--type`
pub fn parse_kind(s: &str) -> Result<RecommendationKind, String> {
    RecommendationKind::parse(s).ok_or_else(|| {
        format!("expected one of system, container, image, network, management, templates; got '{s}'")
    })
}
