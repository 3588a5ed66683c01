use crate::config::{PayloadMode, TransportConfig};
use crate::diff::ChangedFile;
use crate::graph::DependencyGraphPayload;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Change notification carrying the raw diff text, optionally bundled with
/// the current dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDiffNotification {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub diff: String,
    pub timestamp: i64,
    #[serde(rename = "dependencyGraph", skip_serializing_if = "Option::is_none")]
    pub dependency_graph: Option<DependencyGraphPayload>,
}

/// Change notification carrying structured change records plus changeset
/// metadata, for integrations that never see raw diff text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFilesNotification {
    #[serde(rename = "mrId")]
    pub mr_id: String,
    pub author: Option<String>,
    pub repository: Option<String>,
    #[serde(rename = "sourceBranch")]
    pub source_branch: Option<String>,
    #[serde(rename = "targetBranch")]
    pub target_branch: Option<String>,
    #[serde(rename = "changedFiles")]
    pub changed_files: Vec<ChangedFile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChangeNotification {
    RawDiff(RawDiffNotification),
    ChangedFiles(ChangedFilesNotification),
}

pub struct ServiceClient {
    config: TransportConfig,
    client: Client,
}

impl ServiceClient {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { config, client })
    }

    /// Build the configured change-notification shape from one analysis
    /// run's outputs.
    pub fn build_notification(
        &self,
        project_name: &str,
        diff_text: &str,
        changed_files: Vec<ChangedFile>,
        graph: Option<DependencyGraphPayload>,
    ) -> ChangeNotification {
        match self.config.payload_mode {
            PayloadMode::RawDiff => ChangeNotification::RawDiff(RawDiffNotification {
                project_name: project_name.to_string(),
                diff: diff_text.to_string(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                dependency_graph: graph,
            }),
            PayloadMode::ChangedFiles => {
                ChangeNotification::ChangedFiles(ChangedFilesNotification {
                    mr_id: uuid::Uuid::new_v4().to_string(),
                    author: self.config.author.clone(),
                    repository: self.config.repository.clone(),
                    source_branch: self.config.source_branch.clone(),
                    target_branch: self.config.target_branch.clone(),
                    changed_files,
                })
            }
        }
    }

    pub async fn send_dependency_graph(&self, graph: &DependencyGraphPayload) -> Result<()> {
        self.post("/analyze", graph).await
    }

    pub async fn send_change_notification(&self, notification: &ChangeNotification) -> Result<()> {
        self.post("/git-diff", notification).await
    }

    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T) -> Result<()> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "analysis service returned status {} for {}",
                response.status(),
                url
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diff::{ChangeStatus, ChangedFile};

    fn client_with_mode(mode: PayloadMode) -> ServiceClient {
        let mut config = Config::default().transport;
        config.payload_mode = mode;
        config.author = Some("dev@example.com".to_string());
        ServiceClient::new(config).unwrap()
    }

    #[test]
    fn raw_diff_mode_builds_diff_shape() {
        let client = client_with_mode(PayloadMode::RawDiff);
        let notification = client.build_notification("demo", "diff --git a/f b/f\n", Vec::new(), None);

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["projectName"], "demo");
        assert!(json["diff"].as_str().unwrap().starts_with("diff --git"));
        assert!(json["timestamp"].as_i64().unwrap() > 0);
        assert!(json.get("dependencyGraph").is_none());
    }

    #[test]
    fn changed_files_mode_builds_structured_shape() {
        let client = client_with_mode(PayloadMode::ChangedFiles);
        let changed = vec![ChangedFile::new(
            "f1".to_string(),
            ChangeStatus::Added,
            3,
            0,
            String::new(),
        )];
        let notification = client.build_notification("demo", "", changed, None);

        let json = serde_json::to_value(&notification).unwrap();
        assert!(!json["mrId"].as_str().unwrap().is_empty());
        assert_eq!(json["author"], "dev@example.com");
        assert_eq!(json["changedFiles"][0]["path"], "f1");
        assert_eq!(json["changedFiles"][0]["status"], "added");
        assert_eq!(json["changedFiles"][0]["linesChanged"], 3);
    }
}
