use anyhow::{Context, Result};
use gitflow_core::FlowConfig;
use graph::GridMetrics;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Driver configuration: branch naming and colors plus board cell size.
///
/// ```toml
/// [names]
/// feature = "feat-"
///
/// [colors]
/// hotfix = "#d50000"
///
/// [grid]
/// column_width = 120
/// row_height = 40
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub flow: FlowConfig,
    pub grid: GridMetrics,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("while loading {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitflow_core::{BranchKind, NamingPolicy};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_means_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn loads_all_sections() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[names]\nfeature = \"feat-\"\n\n[colors]\nhotfix = \"#d50000\"\n\n[grid]\ncolumn_width = 120"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.flow.branch_name(BranchKind::Feature, 3), "feat-3");
        assert_eq!(config.flow.color_for(BranchKind::Hotfix), "#d50000");
        assert_eq!(config.flow.color_for(BranchKind::Develop), "#FF8A65");
        assert_eq!(config.grid.column_width, 120);
        assert_eq!(config.grid.row_height, 45);
    }

    #[test]
    fn rejects_malformed_grid() {
        let err = AppConfig::from_toml_str("[grid]\ncolumn_width = \"wide\"").unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn unreadable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
