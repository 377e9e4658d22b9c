use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ErrorCode;

/// One source → target link-type translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMapping {
    pub source: String,
    pub target: String,
}

/// Static link-type translation table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMap {
    #[serde(default, alias = "link")]
    pub links: Vec<LinkMapping>,
}

impl LinkMap {
    /// Target link type for `source`; the first matching mapping wins.
    #[must_use]
    pub fn resolve(&self, source: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|mapping| mapping.source == source)
            .map(|mapping| mapping.target.as_str())
    }
}

impl FromIterator<(String, String)> for LinkMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            links: iter
                .into_iter()
                .map(|(source, target)| LinkMapping { source, target })
                .collect(),
        }
    }
}

/// Which reconciliation applies to a relationship field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMapper {
    /// Retract the previous value, then add the current one.
    #[default]
    AddRemove,
    /// Add only; the field never changes once set.
    Add,
    /// Add only, guarded so a parent/child pair is recorded once.
    EpicChild,
}

/// A relationship field and how to reconcile it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRule {
    pub field: String,
    pub link_type: String,
    #[serde(default)]
    pub mapper: LinkMapper,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default, alias = "link-map")]
    pub link_map: LinkMap,
    #[serde(default, alias = "link-rules")]
    pub link_rules: Vec<LinkRule>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("link rule #{rule} has a blank field name")]
    BlankField { rule: usize },

    #[error("link rule #{rule} ({field}) has a blank link type")]
    BlankLinkType { rule: usize, field: String },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::BlankField { .. } => ErrorCode::BlankLinkField,
            Self::BlankLinkType { .. } => ErrorCode::BlankLinkType,
            Self::Toml(_) | Self::Json(_) => ErrorCode::ConfigParseError,
        }
    }
}

impl MigrationConfig {
    /// Parse a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Parse a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reject rules that could never reconcile anything.
    ///
    /// # Errors
    ///
    /// Returns the first blank field name or link type found, by rule
    /// position.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (rule, link_rule) in self.link_rules.iter().enumerate() {
            if link_rule.field.trim().is_empty() {
                return Err(ConfigError::BlankField { rule });
            }
            if link_rule.link_type.trim().is_empty() {
                return Err(ConfigError::BlankLinkType {
                    rule,
                    field: link_rule.field.clone(),
                });
            }
            if link_rule.mapper != LinkMapper::AddRemove
                && self.link_map.resolve(&link_rule.link_type).is_none()
            {
                tracing::warn!(
                    field = %link_rule.field,
                    link_type = %link_rule.link_type,
                    "link rule has no link-map entry; its links will be skipped"
                );
            }
        }
        Ok(())
    }
}

/// Load and validate a migration config. `.json` files are parsed as JSON,
/// everything else as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// [`MigrationConfig::validate`].
pub fn load_config(path: &Path) -> Result<MigrationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        MigrationConfig::from_json(&content)
    } else {
        MigrationConfig::from_toml(&content)
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
[link_map]
links = [
  { source = "Epic", target = "System.LinkTypes.Hierarchy-Reverse" },
  { source = "Parent", target = "System.LinkTypes.Hierarchy-Reverse" },
  { source = "Epic", target = "shadowed" },
]

[[link_rules]]
field = "parent"
link_type = "Parent"

[[link_rules]]
field = "customfield_10014"
link_type = "Epic"
mapper = "epic-child"
"#;

    #[test]
    fn parses_toml_rules_and_defaults_mapper() {
        let cfg = MigrationConfig::from_toml(TOML).expect("parse");
        assert_eq!(cfg.link_rules.len(), 2);
        assert_eq!(cfg.link_rules[0].mapper, LinkMapper::AddRemove);
        assert_eq!(cfg.link_rules[1].mapper, LinkMapper::EpicChild);
        cfg.validate().expect("valid");
    }

    #[test]
    fn resolve_takes_first_match() {
        let cfg = MigrationConfig::from_toml(TOML).expect("parse");
        assert_eq!(
            cfg.link_map.resolve("Epic"),
            Some("System.LinkTypes.Hierarchy-Reverse")
        );
        assert_eq!(cfg.link_map.resolve("Child"), None);
    }

    #[test]
    fn parses_migrator_style_json() {
        let cfg = MigrationConfig::from_json(
            r#"{
                "link-map": { "link": [ { "source": "Parent", "target": "Hierarchy" } ] },
                "link-rules": [ { "field": "parent", "link_type": "Parent", "mapper": "add" } ]
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.link_map.resolve("Parent"), Some("Hierarchy"));
        assert_eq!(cfg.link_rules[0].mapper, LinkMapper::Add);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let cfg = MigrationConfig::from_toml("").expect("parse");
        assert_eq!(cfg, MigrationConfig::default());
    }

    #[test]
    fn validate_rejects_blank_rule_parts() {
        let mut cfg = MigrationConfig::from_toml(TOML).expect("parse");
        cfg.link_rules[1].link_type = "  ".into();
        let err = cfg.validate().expect_err("blank type");
        assert_eq!(err.code(), ErrorCode::BlankLinkType);

        cfg.link_rules[0].field = String::new();
        let err = cfg.validate().expect_err("blank field");
        assert_eq!(err.code(), ErrorCode::BlankLinkField);
    }

    #[test]
    fn load_config_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");

        let toml_path = dir.path().join("migration.toml");
        std::fs::write(&toml_path, TOML).expect("write toml");
        assert_eq!(load_config(&toml_path).expect("load toml").link_rules.len(), 2);

        let json_path = dir.path().join("migration.JSON");
        std::fs::write(&json_path, r#"{"link_rules": []}"#).expect("write json");
        assert!(load_config(&json_path).expect("load json").link_rules.is_empty());
    }

    #[test]
    fn load_config_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "link_rules = 3").expect("write");
        let err = load_config(&path).expect_err("broken");
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
