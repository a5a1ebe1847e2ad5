//! Template catalog and matches

use anyhow::Result;
use tabled::Tabled;

use crate::client::TemplatesView;
use crate::output::{color_confidence, print_json, print_table, OutputFormat};
use crate::source::Source;

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Match")]
    confidence: String,
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Template")]
    template: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Show the catalog, or only the templates matched to the current workload
pub async fn get_templates(source: &Source, matched_only: bool, format: OutputFormat) -> Result<()> {
    let view = source.templates().await?;

    match (format, matched_only) {
        (OutputFormat::Json, true) => print_json(&view.matched)?,
        (OutputFormat::Json, false) => print_json(&view)?,
        (OutputFormat::Table, true) => print_table(match_rows(&view), "No templates matched"),
        (OutputFormat::Table, false) => print_table(catalog_rows(&view), "Template catalog is empty"),
    }

    Ok(())
}

fn catalog_rows(view: &TemplatesView) -> Vec<TemplateRow> {
    view.templates
        .iter()
        .map(|t| {
            let confidence = view
                .matched
                .iter()
                .find(|m| m.template_id == t.id)
                .map(|m| color_confidence(m.confidence))
                .unwrap_or_default();

            TemplateRow {
                id: t.id.to_string(),
                name: t.name.clone(),
                image: t.base_image.clone(),
                profile: t.resource_profile.to_string(),
                ports: t
                    .ports
                    .iter()
                    .map(u16::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                confidence,
            }
        })
        .collect()
}

fn match_rows(view: &TemplatesView) -> Vec<MatchRow> {
    view.matched
        .iter()
        .map(|m| MatchRow {
            template: m.template_id.to_string(),
            confidence: color_confidence(m.confidence),
            reason: m.reason.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_lib::analysis::{catalog, match_templates};
    use std::collections::BTreeMap;

    fn view() -> TemplatesView {
        let types = BTreeMap::from([("redis".to_string(), 1)]);
        TemplatesView {
            templates: catalog(),
            matched: match_templates(&types, 1),
        }
    }

    #[test]
    fn test_catalog_rows_mark_matches() {
        colored::control::set_override(false);
        let rows = catalog_rows(&view());

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].ports, "5432");
        let cache = rows.iter().find(|r| r.id == "cache").unwrap();
        assert_eq!(cache.confidence, "90%");
        assert!(rows.iter().filter(|r| r.confidence.is_empty()).count() == 4);
    }

    #[test]
    fn test_match_rows() {
        let rows = match_rows(&view());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].template, "cache");
    }
}
