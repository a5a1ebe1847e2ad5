//! Where analysis results come from: an in-process engine or a running agent

use crate::client::{ApiClient, HistoryView, TemplatesView};
use advisor_lib::analysis::{catalog, Priority, Recommendation, RecommendationKind, ResourceRecommendation};
use advisor_lib::engine::{AnalysisEngine, AnalysisResult, EngineConfig};
use advisor_lib::history::JsonFileBackend;
use advisor_lib::provider::{FileProvider, SimulatedProvider, SnapshotProvider};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub enum Source {
    /// Query an agent over HTTP
    Remote(ApiClient),
    /// Run the engine in-process against a snapshot file or the demo data
    Local(Arc<AnalysisEngine>),
}

impl Source {
    pub fn remote(api_url: &str) -> Result<Self> {
        Ok(Source::Remote(ApiClient::new(api_url)?))
    }

    pub fn local(snapshot: Option<PathBuf>, data_dir: PathBuf) -> Self {
        let provider: Box<dyn SnapshotProvider> = match snapshot {
            Some(path) => Box::new(FileProvider::new(path)),
            None => Box::new(SimulatedProvider::new()),
        };
        debug!(provider = provider.name(), data_dir = %data_dir.display(), "Running engine locally");

        let config = EngineConfig {
            data_dir: data_dir.clone(),
            ..EngineConfig::default()
        };
        let engine = AnalysisEngine::builder(provider)
            .history_backend(JsonFileBackend::new(data_dir))
            .config(config)
            .build();

        Source::Local(Arc::new(engine))
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Remote(client) => format!("agent at {}", client.base_url()),
            Source::Local(engine) => format!("local engine ({} provider)", engine.provider_name()),
        }
    }

    pub async fn analysis(&self) -> Result<AnalysisResult> {
        match self {
            Source::Remote(client) => client.get("api/v1/analysis", &[]).await,
            Source::Local(engine) => compute(engine).await,
        }
    }

    pub async fn recommendations(
        &self,
        priority: Option<Priority>,
        kind: Option<RecommendationKind>,
    ) -> Result<Vec<Recommendation>> {
        match self {
            Source::Remote(client) => {
                let mut query = Vec::new();
                if let Some(p) = priority {
                    query.push(("priority", p.as_str().to_string()));
                }
                if let Some(k) = kind {
                    query.push(("type", k.as_str().to_string()));
                }
                client.get("api/v1/recommendations", &query).await
            }
            Source::Local(engine) => {
                let result = compute(engine).await?;
                Ok(result
                    .recommendations_matching(priority, kind)
                    .into_iter()
                    .cloned()
                    .collect())
            }
        }
    }

    pub async fn resources(&self) -> Result<ResourceRecommendation> {
        match self {
            Source::Remote(client) => client.get("api/v1/resources", &[]).await,
            Source::Local(engine) => Ok(compute(engine).await?.resource_recommendation),
        }
    }

    pub async fn templates(&self) -> Result<TemplatesView> {
        match self {
            Source::Remote(client) => client.get("api/v1/templates", &[]).await,
            Source::Local(engine) => Ok(TemplatesView {
                templates: catalog(),
                matched: compute(engine).await?.matched_templates,
            }),
        }
    }

    /// Recorded history; a local source reads what previous runs persisted
    pub async fn history(&self, limit: Option<usize>) -> Result<HistoryView> {
        match self {
            Source::Remote(client) => {
                let query: Vec<(&str, String)> =
                    limit.map(|n| ("limit", n.to_string())).into_iter().collect();
                client.get("api/v1/history", &query).await
            }
            Source::Local(engine) => {
                let mut log = engine.history();
                if let Some(n) = limit {
                    log = log.tail(n);
                }
                Ok(HistoryView::new(log))
            }
        }
    }
}

async fn compute(engine: &Arc<AnalysisEngine>) -> Result<AnalysisResult> {
    let engine = Arc::clone(engine);
    let result = tokio::task::spawn_blocking(move || engine.get_or_compute())
        .await
        .context("Analysis task failed")?;
    Ok(result.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_analysis_persists_history() {
        let dir = TempDir::new().unwrap();
        let source = Source::local(None, dir.path().to_path_buf());

        let result = source.analysis().await.unwrap();
        assert_eq!(result.analysis.container_analysis.total_containers, 4);

        // A fresh engine over the same data dir sees the recorded sample
        let reopened = Source::local(None, dir.path().to_path_buf());
        let history = reopened.history(None).await.unwrap();
        assert_eq!(history.log.containers.len(), 1);
        assert_eq!(history.log.containers[0].running_count, 3);
        assert!(history.trend.is_some());
    }

    #[tokio::test]
    async fn test_local_recommendations_filter() {
        let dir = TempDir::new().unwrap();
        let source = Source::local(None, dir.path().to_path_buf());

        let images = source
            .recommendations(None, Some(RecommendationKind::Image))
            .await
            .unwrap();

        assert!(!images.is_empty());
        assert!(images.iter().all(|r| r.kind == RecommendationKind::Image));
    }

    #[tokio::test]
    async fn test_local_snapshot_file() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(
            &snapshot,
            r#"{"containers": [{"id": "1", "name": "queue", "image": "rabbitmq:3", "status": "running",
                "memory_usage": 200.0, "cpu_usage": 3.0, "restart_count": 0}],
               "host": {"cpu_usage": 20.0, "memory_usage": 20.0, "disk_usage": 30.0, "total_memory": 4096.0}}"#,
        )
        .unwrap();

        let source = Source::local(Some(snapshot), dir.path().join("data"));
        let templates = source.templates().await.unwrap();

        assert_eq!(templates.templates.len(), 5);
        assert_eq!(templates.matched.len(), 1);
        assert_eq!(templates.matched[0].template_id.as_str(), "message_queue");
    }

    #[test]
    fn test_describe_remote() {
        let source = Source::remote("http://localhost:9000").unwrap();
        assert_eq!(source.describe(), "agent at http://localhost:9000/");
    }
}
