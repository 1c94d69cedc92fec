use gitflow_core::{CommitId, Project};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::columns::column_order;

/// On-screen reference point of one commit marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal offset from the left edge of the board
    pub left: i32,
    /// Vertical offset from the top of the commit area
    pub top: i32,
}

impl Anchor {
    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Size of one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    pub column_width: i32,
    pub row_height: i32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            column_width: 90,
            row_height: 45,
        }
    }
}

impl GridMetrics {
    /// Anchor of a commit at `grid_index` (1-based) in column `column`.
    ///
    /// `None` when the offset does not fit the board's coordinate range.
    pub fn anchor(&self, column: usize, grid_index: u32) -> Option<Anchor> {
        let column = i32::try_from(column).ok()?;
        let row = i32::try_from(grid_index.saturating_sub(1)).ok()?;
        Some(Anchor::new(
            column.checked_mul(self.column_width)?,
            row.checked_mul(self.row_height)?,
        ))
    }
}

/// Commit id -> measured anchor.
///
/// Owned by whoever renders the board; the layout code only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorTable {
    anchors: HashMap<CommitId, Anchor>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors for every commit of `project` following the row placement
    /// rule: branch column times column width, `grid_index - 1` rows down.
    /// Commits whose offset overflows stay unplaced.
    pub fn place(project: &Project, metrics: GridMetrics) -> Self {
        let columns: HashMap<&str, usize> = column_order(project)
            .into_iter()
            .enumerate()
            .map(|(column, branch)| (branch.id.as_str(), column))
            .collect();

        let anchors: HashMap<CommitId, Anchor> = project
            .commits
            .iter()
            .filter_map(|commit| {
                let column = *columns.get(commit.branch_id.as_str())?;
                Some((commit.id.clone(), metrics.anchor(column, commit.grid_index)?))
            })
            .collect();
        let unplaced = project.commits.len() - anchors.len();
        if unplaced > 0 {
            debug!(unplaced, "commits outside the board");
        }
        Self { anchors }
    }

    /// Report the measured position of a commit marker
    pub fn record(&mut self, commit_id: CommitId, anchor: Anchor) {
        self.anchors.insert(commit_id, anchor);
    }

    pub fn get(&self, commit_id: &str) -> Option<Anchor> {
        self.anchors.get(commit_id).copied()
    }

    pub fn remove(&mut self, commit_id: &str) -> Option<Anchor> {
        self.anchors.remove(commit_id)
    }

    /// Forget anchors of commits that are no longer in `project`
    pub fn retain_project(&mut self, project: &Project) {
        let live: HashSet<&str> =
            project.commits.iter().map(|c| c.id.as_str()).collect();
        self.anchors.retain(|id, _| live.contains(id.as_str()));
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
