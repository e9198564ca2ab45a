use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{ArtifactRef, StageId},
    error::StudioError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "MISSING-NAME")]
    MissingName,
    #[serde(rename = "INVALID-NAME")]
    InvalidName,
    #[serde(rename = "NO-STAGES")]
    NoStages,
}

impl MessageKind {
    /// Kinds that flag the pipeline name field in the top panel.
    pub fn is_name_error(self) -> bool {
        matches!(self, MessageKind::MissingName | MessageKind::InvalidName)
    }

    pub fn is_error(self) -> bool {
        !matches!(self, MessageKind::Success | MessageKind::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
}

impl ConsoleMessage {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRef {
    pub name: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub plugin: PluginRef,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineGraph {
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
}

/// Editor-only canvas layout. Never part of an exported pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasLayout {
    #[serde(default)]
    pub positions: BTreeMap<String, NodePosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub artifact: ArtifactRef,
    #[serde(rename = "config", default)]
    pub graph: PipelineGraph,
    #[serde(rename = "__ui__", default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<CanvasLayout>,
}

impl PipelineConfig {
    pub fn empty(artifact: ArtifactRef) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            artifact,
            graph: PipelineGraph::default(),
            ui: Some(CanvasLayout::default()),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StudioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, StudioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy without the editor layout, as written to export files.
    pub fn without_layout(&self) -> Self {
        Self {
            ui: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_error_kinds_use_wire_names() {
        let raw = r#"[{"type":"MISSING-NAME","content":"a"},{"type":"INVALID-NAME","content":"b"},{"type":"success","content":"c"}]"#;
        let messages: Vec<ConsoleMessage> = serde_json::from_str(raw).expect("messages");
        let name_errors: Vec<_> = messages
            .iter()
            .filter(|message| message.kind.is_name_error())
            .collect();
        assert_eq!(name_errors.len(), 2);
        assert!(!messages[2].kind.is_error());
    }

    #[test]
    fn export_copy_drops_ui_layout_key() {
        let mut config = PipelineConfig::empty(ArtifactRef::default());
        config.name = "orders".into();
        let json = config.without_layout().to_json_pretty().expect("json");
        assert!(!json.contains("__ui__"));
        assert!(config.to_json_pretty().expect("json").contains("__ui__"));
    }

    #[test]
    fn parses_exported_document_without_layout() {
        let raw = r#"{
            "name": "orders",
            "description": "daily load",
            "artifact": {"name": "cdap-data-pipeline", "version": "4.0.0", "scope": "SYSTEM"},
            "config": {
                "stages": [{"id": 1, "name": "source", "plugin": {"name": "File", "type": "batchsource"}}],
                "connections": []
            }
        }"#;
        let config = PipelineConfig::from_json_str(raw).expect("parse");
        assert_eq!(config.name, "orders");
        assert_eq!(config.graph.stages.len(), 1);
        assert!(config.ui.is_none());
    }
}
