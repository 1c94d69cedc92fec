use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::BranchKind;

/// Display naming of branches.
///
/// Names are purely cosmetic; the engine never looks a branch up by name.
pub trait NamingPolicy {
    /// Name for a branch of `kind`; `seq` is the 1-based count among
    /// branches of the same kind.
    fn branch_name(&self, kind: BranchKind, seq: usize) -> String;

    /// Display color for a new branch of `kind`
    fn branch_color(&self, _kind: BranchKind) -> String {
        String::new()
    }
}

/// Labels used for the two permanent branches and prefixes for spawned ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchNames {
    pub release: String,
    pub develop: String,
    pub feature: String,
    pub bugfix: String,
    pub hotfix: String,
    pub release_candidate: String,
    pub qa_fix: String,
}

impl Default for BranchNames {
    fn default() -> Self {
        Self {
            release: "release".to_string(),
            develop: "develop".to_string(),
            feature: "feature/".to_string(),
            bugfix: "bugfix/".to_string(),
            hotfix: "hotfix/".to_string(),
            release_candidate: "rc/".to_string(),
            qa_fix: "qa-fix/".to_string(),
        }
    }
}

/// Display color per branch kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchColors {
    pub release: String,
    pub develop: String,
    pub feature: String,
    pub bugfix: String,
    pub hotfix: String,
    pub release_candidate: String,
    pub qa_fix: String,
}

impl Default for BranchColors {
    fn default() -> Self {
        Self {
            release: "#E040FB".to_string(),
            develop: "#FF8A65".to_string(),
            feature: "#64B5F6".to_string(),
            bugfix: "#FFD54F".to_string(),
            hotfix: "#ff1744".to_string(),
            release_candidate: "#B2FF59".to_string(),
            qa_fix: "#64B5F6".to_string(),
        }
    }
}

/// Cosmetic settings of the flow: branch names and colors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub names: BranchNames,
    pub colors: BranchColors,
}

impl FlowConfig {
    /// Parse a TOML document; missing tables and keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid flow configuration")
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn color_for(&self, kind: BranchKind) -> &str {
        let colors = &self.colors;
        match kind {
            BranchKind::Release => &colors.release,
            BranchKind::Develop => &colors.develop,
            BranchKind::Feature => &colors.feature,
            BranchKind::Hotfix => &colors.hotfix,
            BranchKind::ReleaseCandidate => &colors.release_candidate,
            BranchKind::QaFix => &colors.qa_fix,
            BranchKind::Bugfix => &colors.bugfix,
        }
    }
}

impl NamingPolicy for FlowConfig {
    fn branch_name(&self, kind: BranchKind, seq: usize) -> String {
        let names = &self.names;
        let prefix = match kind {
            BranchKind::Release => return names.release.clone(),
            BranchKind::Develop => return names.develop.clone(),
            BranchKind::Feature => &names.feature,
            BranchKind::Hotfix => &names.hotfix,
            BranchKind::ReleaseCandidate => &names.release_candidate,
            BranchKind::QaFix => &names.qa_fix,
            BranchKind::Bugfix => &names.bugfix,
        };
        format!("{}{}", prefix, seq)
    }

    fn branch_color(&self, kind: BranchKind) -> String {
        self.color_for(kind).to_string()
    }
}
