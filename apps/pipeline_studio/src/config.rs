use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::{
    domain::{ArtifactRef, ArtifactScope},
    error::StudioError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct StudioSettings {
    pub log_filter: String,
    pub default_artifact: ArtifactRef,
    pub window_title: String,
    pub event_queue_capacity: usize,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            default_artifact: ArtifactRef::default(),
            window_title: "Pipeline Studio".into(),
            event_queue_capacity: 256,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    log_filter: Option<String>,
    window_title: Option<String>,
    event_queue_capacity: Option<usize>,
    artifact: Option<ArtifactSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactSection {
    name: Option<String>,
    version: Option<String>,
    scope: Option<ArtifactScope>,
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pipeline-studio").join("studio.toml"))
}

/// Defaults, then the settings file, then `STUDIO__*` environment variables.
/// A missing file is only an error when its path was given explicitly.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<StudioSettings> {
    let mut settings = StudioSettings::default();
    let explicit = path.is_some();

    if let Some(path) = path.map(Path::to_path_buf).or_else(default_settings_path) {
        match fs::read_to_string(&path) {
            Ok(raw) => apply_file(&mut settings, &raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings file '{}'", path.display()))
            }
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut StudioSettings, raw: &str) -> Result<(), StudioError> {
    let file: SettingsFile =
        toml::from_str(raw).map_err(|err| StudioError::settings(err.to_string()))?;

    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file.window_title {
        settings.window_title = v;
    }
    if let Some(v) = file.event_queue_capacity {
        if v == 0 {
            return Err(StudioError::settings(
                "event_queue_capacity must be greater than zero",
            ));
        }
        settings.event_queue_capacity = v;
    }
    if let Some(artifact) = file.artifact {
        if let Some(v) = artifact.name {
            settings.default_artifact.name = v;
        }
        if let Some(v) = artifact.version {
            settings.default_artifact.version = v;
        }
        if let Some(v) = artifact.scope {
            settings.default_artifact.scope = v;
        }
    }

    Ok(())
}

fn apply_env_overrides(settings: &mut StudioSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STUDIO__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("STUDIO__ARTIFACT_NAME") {
        settings.default_artifact.name = v;
    }
    if let Some(v) = var("STUDIO__ARTIFACT_VERSION") {
        settings.default_artifact.version = v;
    }
    if let Some(v) = var("STUDIO__ARTIFACT_SCOPE") {
        if v.eq_ignore_ascii_case("user") {
            settings.default_artifact.scope = ArtifactScope::User;
        } else if v.eq_ignore_ascii_case("system") {
            settings.default_artifact.scope = ArtifactScope::System;
        }
    }
    if let Some(v) = var("STUDIO__EVENT_QUEUE_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            if parsed > 0 {
                settings.event_queue_capacity = parsed;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
