use gitflow_core::{BranchKind, Commit, CommitId, Project};
use std::collections::HashMap;

/// How one commit marker is painted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Version label, release commits only
    pub tag: Option<String>,
    pub color: String,
    /// Markers of merged branches are drawn faded
    pub merged: bool,
    pub is_tip: bool,
}

/// Version tags for release commits: `v0` for the root, then one per merge
pub fn release_tags(project: &Project) -> HashMap<CommitId, String> {
    let Some(release) = project.release() else {
        return HashMap::new();
    };
    project
        .commits_on(release.id.as_str())
        .enumerate()
        .map(|(idx, commit)| (commit.id.clone(), format!("v{}", idx)))
        .collect()
}

pub struct CommitDecorator<'a> {
    project: &'a Project,
    tags: HashMap<CommitId, String>,
    tips: HashMap<&'a str, &'a str>,
}

impl<'a> CommitDecorator<'a> {
    pub fn new(project: &'a Project) -> Self {
        let mut tips = HashMap::new();
        for commit in &project.commits {
            // later commits overwrite earlier ones
            tips.insert(commit.branch_id.as_str(), commit.id.as_str());
        }
        Self {
            project,
            tags: release_tags(project),
            tips,
        }
    }

    pub fn decorate(&self, commit: &Commit) -> Decoration {
        let branch = self.project.branch(commit.branch_id.as_str());
        Decoration {
            tag: self.tags.get(&commit.id).cloned(),
            color: branch.map(|b| b.color.clone()).unwrap_or_default(),
            merged: branch.map_or(false, |b| b.merged && b.kind != BranchKind::Release),
            is_tip: self.tips.get(commit.branch_id.as_str()) == Some(&commit.id.as_str()),
        }
    }
}
