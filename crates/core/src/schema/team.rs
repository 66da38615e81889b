use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{new_id, require_text, Validate};
use crate::error::ValidationError;

fn default_capacity_hours() -> u32 {
    40
}

fn default_true() -> bool {
    true
}

fn default_sync_interval() -> u32 {
    15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Replaced with a fresh id when the member is added over HTTP.
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default = "default_capacity_hours")]
    pub capacity_hours: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Validate for TeamMember {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ValidationError::new("email", "must be an email address"));
        }
        require_text("role", &self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraIntegration {
    pub project_key: String,
    pub server_url: String,
    pub username: String,
    pub api_token: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackIntegration {
    pub webhook_url: String,
    pub channel: String,
    pub bot_token: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubIntegration {
    pub repo_url: String,
    pub access_token: String,
    pub organization: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Third-party integration configuration. Stored as a single upserted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub jira: Option<JiraIntegration>,
    #[serde(default)]
    pub slack: Option<SlackIntegration>,
    #[serde(default)]
    pub github: Option<GitHubIntegration>,
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_minutes: u32,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        IntegrationSettings {
            id: new_id(),
            jira: None,
            slack: None,
            github: None,
            auto_sync: true,
            sync_interval_minutes: default_sync_interval(),
        }
    }
}

impl IntegrationSettings {
    pub fn jira_enabled(&self) -> bool {
        self.jira.as_ref().is_some_and(|j| j.enabled)
    }

    pub fn slack_enabled(&self) -> bool {
        self.slack.as_ref().is_some_and(|s| s.enabled)
    }

    pub fn github_enabled(&self) -> bool {
        self.github.as_ref().is_some_and(|g| g.enabled)
    }

    /// Enabled flag per integration, keyed `jira`, `slack`, `github`.
    pub fn status(&self) -> BTreeMap<String, bool> {
        BTreeMap::from([
            ("jira".to_string(), self.jira_enabled()),
            ("slack".to_string(), self.slack_enabled()),
            ("github".to_string(), self.github_enabled()),
        ])
    }
}

impl Validate for IntegrationSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)?;
        if self.sync_interval_minutes == 0 {
            return Err(ValidationError::new(
                "sync_interval_minutes",
                "must be at least 1",
            ));
        }
        if let Some(jira) = &self.jira {
            require_text("jira.server_url", &jira.server_url)?;
            require_text("jira.project_key", &jira.project_key)?;
        }
        if let Some(slack) = &self.slack {
            require_text("slack.webhook_url", &slack.webhook_url)?;
        }
        if let Some(github) = &self.github {
            require_text("github.repo_url", &github.repo_url)?;
        }
        Ok(())
    }
}
