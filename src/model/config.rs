use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("error reading configuration file: {0}")]
    Parse(String),
    #[error("configuration file is empty")]
    Empty,
    #[error("malformed entry in section {section}: {reason}")]
    Malformed { section: String, reason: String },
}

/// The nodes/models document: an ordered list of named sections, each
/// holding node entries in document order.
#[derive(Debug)]
pub struct NodesConfig {
    sections: Vec<Section>,
}

#[derive(Debug)]
pub struct Section {
    pub name: String,
    pub entries: Vec<NodeEntry>,
}

/// One configured extension: a repository to install, optionally pinned to a
/// revision, optionally carrying bundled model descriptors.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub install_path: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl NodeEntry {
    /// Pinned revision, if one is configured and non-empty.
    pub fn pinned_revision(&self) -> Option<&str> {
        self.version.as_deref().filter(|rev| !rev.is_empty())
    }
}

/// One configured model asset. An empty url or path is legal and means the
/// descriptor is skipped at run time, not rejected at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub path: String,
}

impl ModelDescriptor {
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.path.is_empty()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

impl NodesConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_yaml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let mapping = match value {
            Value::Null => return Err(ConfigError::Empty),
            Value::Mapping(mapping) if mapping.is_empty() => return Err(ConfigError::Empty),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ConfigError::Parse(
                    "top-level document is not a mapping".to_string(),
                ));
            }
        };

        let mut sections = Vec::new();
        for (key, value) in mapping {
            let name = key
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ConfigError::Parse("section name is not a string".to_string()))?;

            // Scalar sections carry no entries.
            let Value::Sequence(items) = value else {
                continue;
            };

            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                if !item.is_mapping() {
                    return Err(ConfigError::Malformed {
                        section: name.clone(),
                        reason: "entry is not a mapping".to_string(),
                    });
                }

                let entry: NodeEntry =
                    serde_yaml::from_value(item).map_err(|err| ConfigError::Malformed {
                        section: name.clone(),
                        reason: err.to_string(),
                    })?;
                entries.push(entry);
            }

            sections.push(Section { name, entries });
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn descriptor_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|section| &section.entries)
            .map(|entry| entry.models.len())
            .sum()
    }
}
