use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(StageId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(pub Uuid);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactScope {
    #[default]
    System,
    User,
}

/// Versioned plugin bundle a pipeline runs on. Opaque to the editor panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub scope: ArtifactScope,
}

impl Default for ArtifactRef {
    fn default() -> Self {
        Self {
            name: "cdap-data-pipeline".into(),
            version: "4.0.0".into(),
            scope: ArtifactScope::System,
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            ArtifactScope::System => "system",
            ArtifactScope::User => "user",
        };
        write!(f, "{} {} ({scope})", self.name, self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub name: String,
    pub description: String,
}

impl PipelineMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Where a pipeline opened in clone mode was copied from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonedFrom {
    pub source_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub draft_id: DraftId,
    pub saved_at: DateTime<Utc>,
    pub config: crate::protocol::PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedRecord {
    pub name: String,
    pub published_at: DateTime<Utc>,
    pub config: crate::protocol::PipelineConfig,
}
