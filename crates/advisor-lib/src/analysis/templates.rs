//! Workload template catalog and matching
//!
//! Matching is a keyword membership test of image families against fixed
//! family sets. When nothing matches, a heuristic default is suggested based
//! only on how many containers exist; it is not inferred from the workload.

use super::profile::ResourceProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Confidence of the single default suggestion for small setups
const SMALL_SETUP_CONFIDENCE: f32 = 0.6;
/// Confidence of the default suggestions for multi-container setups
const MULTI_SETUP_CONFIDENCE: f32 = 0.7;
/// Containers at or below which a setup counts as small
const SMALL_SETUP_MAX: usize = 2;

/// Workload archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    WebServer,
    Database,
    AppServer,
    Cache,
    MessageQueue,
}

impl TemplateKind {
    /// Catalog order
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::WebServer,
        TemplateKind::Database,
        TemplateKind::AppServer,
        TemplateKind::Cache,
        TemplateKind::MessageQueue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::WebServer => "web_server",
            TemplateKind::Database => "database",
            TemplateKind::AppServer => "app_server",
            TemplateKind::Cache => "cache",
            TemplateKind::MessageQueue => "message_queue",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == id)
    }

    /// Image families that identify this archetype
    pub fn families(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::WebServer => &["nginx", "httpd", "apache"],
            TemplateKind::Database => &["postgres", "mysql", "mariadb", "mongo"],
            TemplateKind::AppServer => &["node", "python", "ruby", "php"],
            TemplateKind::Cache => &["redis", "memcached"],
            TemplateKind::MessageQueue => &["rabbitmq", "kafka", "activemq"],
        }
    }

    fn match_confidence(&self) -> f32 {
        match self {
            TemplateKind::AppServer => 0.8,
            _ => 0.9,
        }
    }

    fn match_reason(&self) -> &'static str {
        match self {
            TemplateKind::WebServer => "Detected web server containers",
            TemplateKind::Database => "Detected database containers",
            TemplateKind::AppServer => "Detected application server containers",
            TemplateKind::Cache => "Detected cache service containers",
            TemplateKind::MessageQueue => "Detected message queue containers",
        }
    }

    pub fn template(&self) -> ContainerTemplate {
        let id = *self;
        match self {
            TemplateKind::WebServer => ContainerTemplate {
                id,
                name: "Web Server".to_string(),
                base_image: "nginx:alpine".to_string(),
                resource_profile: ResourceProfile::Balanced,
                ports: vec![80, 443],
                volumes: strings(&["/var/www", "/etc/nginx/conf.d"]),
                env_vars: strings(&["NGINX_HOST", "NGINX_PORT"]),
                networks: strings(&["frontend"]),
                tags: strings(&["web", "http", "reverse-proxy"]),
            },
            TemplateKind::Database => ContainerTemplate {
                id,
                name: "Database Server".to_string(),
                base_image: "postgres:13-alpine".to_string(),
                resource_profile: ResourceProfile::MemoryOptimized,
                ports: vec![5432],
                volumes: strings(&["/var/lib/postgresql/data"]),
                env_vars: strings(&["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_DB"]),
                networks: strings(&["backend"]),
                tags: strings(&["database", "persistence", "sql"]),
            },
            TemplateKind::AppServer => ContainerTemplate {
                id,
                name: "Application Server".to_string(),
                base_image: "node:16-alpine".to_string(),
                resource_profile: ResourceProfile::Balanced,
                ports: vec![3000],
                volumes: strings(&["/app", "/app/node_modules"]),
                env_vars: strings(&["NODE_ENV", "PORT", "DATABASE_URL"]),
                networks: strings(&["frontend", "backend"]),
                tags: strings(&["application", "server", "api"]),
            },
            TemplateKind::Cache => ContainerTemplate {
                id,
                name: "Cache Server".to_string(),
                base_image: "redis:alpine".to_string(),
                resource_profile: ResourceProfile::MemoryOptimized,
                ports: vec![6379],
                volumes: strings(&["/data"]),
                env_vars: strings(&["REDIS_PASSWORD"]),
                networks: strings(&["backend"]),
                tags: strings(&["cache", "in-memory", "key-value"]),
            },
            TemplateKind::MessageQueue => ContainerTemplate {
                id,
                name: "Message Queue".to_string(),
                base_image: "rabbitmq:3-management-alpine".to_string(),
                resource_profile: ResourceProfile::Balanced,
                ports: vec![5672, 15672],
                volumes: strings(&["/var/lib/rabbitmq"]),
                env_vars: strings(&["RABBITMQ_DEFAULT_USER", "RABBITMQ_DEFAULT_PASS"]),
                networks: strings(&["backend"]),
                tags: strings(&["queue", "messaging", "pubsub"]),
            },
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-configured container setup for a workload archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerTemplate {
    pub id: TemplateKind,
    pub name: String,
    pub base_image: String,
    pub resource_profile: ResourceProfile,
    pub ports: Vec<u16>,
    pub volumes: Vec<String>,
    pub env_vars: Vec<String>,
    pub networks: Vec<String>,
    pub tags: Vec<String>,
}

/// The fixed template catalog
pub fn catalog() -> Vec<ContainerTemplate> {
    TemplateKind::ALL.iter().map(TemplateKind::template).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template_id: TemplateKind,
    pub confidence: f32,
    pub reason: String,
}

impl TemplateMatch {
    fn new(template_id: TemplateKind, confidence: f32, reason: &str) -> Self {
        Self {
            template_id,
            confidence,
            reason: reason.to_string(),
        }
    }
}

/// Score the catalog against an image-family histogram
pub fn match_templates(
    container_types: &BTreeMap<String, usize>,
    total_containers: usize,
) -> Vec<TemplateMatch> {
    let present: Vec<&str> = container_types
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(family, _)| base_name(family))
        .collect();

    let mut matches: Vec<TemplateMatch> = TemplateKind::ALL
        .into_iter()
        .filter(|kind| present.iter().any(|f| kind.families().contains(f)))
        .map(|kind| TemplateMatch::new(kind, kind.match_confidence(), kind.match_reason()))
        .collect();

    if matches.is_empty() && total_containers > 0 {
        if total_containers <= SMALL_SETUP_MAX {
            matches.push(TemplateMatch::new(
                TemplateKind::WebServer,
                SMALL_SETUP_CONFIDENCE,
                "Basic recommendation for simple setup",
            ));
        } else {
            for kind in [
                TemplateKind::WebServer,
                TemplateKind::Database,
                TemplateKind::AppServer,
            ] {
                matches.push(TemplateMatch::new(
                    kind,
                    MULTI_SETUP_CONFIDENCE,
                    "Recommended for multi-container setup",
                ));
            }
        }
    }

    matches
}

/// Last path component of an image family (`docker.io/library/nginx` -> `nginx`)
fn base_name(family: &str) -> &str {
    family.rsplit('/').next().unwrap_or(family)
}
