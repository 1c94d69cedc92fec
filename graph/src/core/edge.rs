use gitflow_core::CommitId;
use serde::Serialize;

/// An edge connecting two commits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    /// Parent commit ID (drawn from)
    pub parent: CommitId,
    /// Child commit ID (drawn to)
    pub child: CommitId,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Regular parent-child relationship
    Regular,
    /// One of the two parents of a merge commit
    Merge,
}

impl EdgeType {
    /// Edge type for any edge ending in a commit with `parent_count` parents
    pub fn for_parent_count(parent_count: usize) -> Self {
        if parent_count > 1 {
            EdgeType::Merge
        } else {
            EdgeType::Regular
        }
    }
}

impl Edge {
    pub fn new(parent: CommitId, child: CommitId) -> Self {
        Self {
            parent,
            child,
            edge_type: EdgeType::Regular,
        }
    }

    pub fn merge(parent: CommitId, child: CommitId) -> Self {
        Self {
            parent,
            child,
            edge_type: EdgeType::Merge,
        }
    }
}
