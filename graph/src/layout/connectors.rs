use gitflow_core::{Commit, CommitId};
use serde::Serialize;
use tracing::debug;

use super::anchors::{Anchor, AnchorTable};
use crate::core::EdgeType;

/// One drawable parent -> child edge between two measured anchors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connector {
    pub source_commit_id: CommitId,
    pub target_commit_id: CommitId,
    pub source_anchor: Anchor,
    pub target_anchor: Anchor,
    pub edge_type: EdgeType,
}

impl Connector {
    /// Whether the edge leaves its column, i.e. a branch-off or a merge
    pub fn crosses_columns(&self) -> bool {
        self.source_anchor.left != self.target_anchor.left
    }
}

/// Connectors for every parent-child edge whose two anchors are known.
///
/// Order follows `commits`, then each commit's parent order; renderers draw
/// in this order, so later connectors sit on top. Edges touching a commit
/// that has not been measured yet are skipped, the caller is expected to run
/// this again once more anchors come in.
pub fn compute_connectors(commits: &[Commit], anchors: &AnchorTable) -> Vec<Connector> {
    let mut connectors = Vec::new();
    let mut skipped = 0usize;

    for commit in commits {
        if commit.parents.is_empty() {
            continue;
        }
        let Some(target_anchor) = anchors.get(commit.id.as_str()) else {
            skipped += commit.parents.len();
            continue;
        };
        let edge_type = EdgeType::for_parent_count(commit.parents.len());

        for parent in &commit.parents {
            match anchors.get(parent.as_str()) {
                Some(source_anchor) => connectors.push(Connector {
                    source_commit_id: parent.clone(),
                    target_commit_id: commit.id.clone(),
                    source_anchor,
                    target_anchor,
                    edge_type,
                }),
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, drawn = connectors.len(), "connectors waiting for anchors");
    }
    connectors
}
