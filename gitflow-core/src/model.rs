use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Opaque branch identifier
    BranchId
);
string_id!(
    /// Opaque commit identifier
    CommitId
);

/// Parent list of a commit: empty for roots, one entry for plain commits,
/// two for merge commits.
pub type Parents = SmallVec<[CommitId; 2]>;

/// Role a branch plays in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Release,
    Develop,
    Feature,
    Hotfix,
    ReleaseCandidate,
    QaFix,
    Bugfix,
}

impl BranchKind {
    pub const ALL: [BranchKind; 7] = [
        BranchKind::Release,
        BranchKind::Develop,
        BranchKind::Feature,
        BranchKind::Hotfix,
        BranchKind::ReleaseCandidate,
        BranchKind::QaFix,
        BranchKind::Bugfix,
    ];

    /// Release and develop exist exactly once and are never spawned or deleted
    pub fn is_permanent(self) -> bool {
        matches!(self, BranchKind::Release | BranchKind::Develop)
    }

    /// Only the release branch refuses direct commits
    pub fn can_commit(self) -> bool {
        self != BranchKind::Release
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BranchKind::Release => "release",
            BranchKind::Develop => "develop",
            BranchKind::Feature => "feature",
            BranchKind::Hotfix => "hotfix",
            BranchKind::ReleaseCandidate => "release candidate",
            BranchKind::QaFix => "qa fix",
            BranchKind::Bugfix => "bugfix",
        };
        f.pad(label)
    }
}

/// A branch column in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub kind: BranchKind,
    pub can_commit: bool,
    /// Set once the terminal merge commit(s) exist; never cleared
    pub merged: bool,
    pub color: String,
}

impl Branch {
    pub fn new(id: BranchId, name: String, kind: BranchKind, color: String) -> Self {
        Self {
            id,
            name,
            kind,
            can_commit: kind.can_commit(),
            merged: false,
            color,
        }
    }
}

/// A commit marker on one branch's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitId,
    pub branch_id: BranchId,
    /// 1-based row along the owning branch
    pub grid_index: u32,
    pub parents: Parents,
}

impl Commit {
    pub fn new(id: CommitId, branch_id: BranchId, grid_index: u32, parents: Parents) -> Self {
        Self {
            id,
            branch_id,
            grid_index,
            parents,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (two parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
