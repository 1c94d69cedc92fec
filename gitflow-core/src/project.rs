use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::NamingPolicy;
use crate::error::{FlowError, FlowResult};
use crate::ids::IdSource;
use crate::model::{Branch, BranchId, BranchKind, Commit, CommitId, Parents};

/// Immutable snapshot of the whole flow: every branch and every commit.
///
/// Operations never edit a published snapshot. They borrow it, build a new
/// one and hand it back, so a failed operation leaves the caller's value
/// untouched. Both vectors are kept in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub branches: Vec<Branch>,
    pub commits: Vec<Commit>,
}

impl Project {
    /// Seed project: release and develop, one root commit each at row 1
    pub fn seed(ids: &mut dyn IdSource, naming: &dyn NamingPolicy) -> Self {
        let mut branches = Vec::with_capacity(2);
        let mut commits = Vec::with_capacity(2);

        for kind in [BranchKind::Release, BranchKind::Develop] {
            let branch = Branch::new(
                BranchId::new(ids.next_id()),
                naming.branch_name(kind, 1),
                kind,
                naming.branch_color(kind),
            );
            commits.push(Commit::new(
                CommitId::new(ids.next_id()),
                branch.id.clone(),
                1,
                Parents::new(),
            ));
            branches.push(branch);
        }

        Self { branches, commits }
    }

    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id.as_str() == id)
    }

    pub fn find_commit(&self, id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id.as_str() == id)
    }

    pub fn branches_of_kind(&self, kind: BranchKind) -> impl Iterator<Item = &Branch> + '_ {
        self.branches.iter().filter(move |b| b.kind == kind)
    }

    pub fn release(&self) -> Option<&Branch> {
        self.branches_of_kind(BranchKind::Release).next()
    }

    pub fn develop(&self) -> Option<&Branch> {
        self.branches_of_kind(BranchKind::Develop).next()
    }

    /// The most recently created release candidate that is not merged yet
    pub fn active_release_candidate(&self) -> Option<&Branch> {
        self.branches_of_kind(BranchKind::ReleaseCandidate)
            .filter(|b| !b.merged)
            .last()
    }

    /// Commits recorded on a branch, in creation order
    pub fn commits_on<'a>(&'a self, branch_id: &'a str) -> impl Iterator<Item = &'a Commit> + 'a {
        self.commits
            .iter()
            .filter(move |c| c.branch_id.as_str() == branch_id)
    }

    /// Latest commit on a branch
    pub fn tip(&self, branch_id: &str) -> Option<&Commit> {
        self.commits
            .iter()
            .rev()
            .find(|c| c.branch_id.as_str() == branch_id)
    }

    pub(crate) fn require_branch(&self, id: &str) -> FlowResult<&Branch> {
        self.branch(id)
            .ok_or_else(|| FlowError::InvalidReference(id.to_string()))
    }

    pub(crate) fn require_kind(&self, kind: BranchKind) -> FlowResult<&Branch> {
        self.branches_of_kind(kind)
            .next()
            .ok_or_else(|| FlowError::InvalidReference(kind.to_string()))
    }

    /// Branch and tip together; errors if either is missing
    pub(crate) fn require_tip(&self, branch_id: &str) -> FlowResult<&Commit> {
        self.require_branch(branch_id)?;
        self.tip(branch_id)
            .ok_or_else(|| FlowError::EmptyBranch(branch_id.to_string()))
    }

    /// Row `gap + 1` below `row`, or an error once rows run out
    pub(crate) fn row_below(row: u32, gap: u32) -> FlowResult<u32> {
        row.checked_add(gap)
            .and_then(|r| r.checked_add(1))
            .ok_or_else(|| FlowError::PreconditionViolated(format!("no row left below {} (+{})", row, gap)))
    }

    pub(crate) fn branch_mut(&mut self, id: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.id.as_str() == id)
    }

    /// Check every structural invariant, reporting the first violation
    pub fn validate(&self) -> FlowResult<()> {
        let corrupt = |msg: String| Err(FlowError::Corrupt(msg));

        let mut branch_ids = HashSet::new();
        for branch in &self.branches {
            if !branch_ids.insert(branch.id.as_str()) {
                return corrupt(format!("duplicate branch id {}", branch.id));
            }
        }
        for kind in [BranchKind::Release, BranchKind::Develop] {
            let count = self.branches_of_kind(kind).count();
            if count != 1 {
                return corrupt(format!("expected one {} branch, found {}", kind, count));
            }
        }
        let active_rcs = self
            .branches_of_kind(BranchKind::ReleaseCandidate)
            .filter(|b| !b.merged)
            .count();
        if active_rcs > 1 {
            return corrupt(format!("{} unmerged release candidates", active_rcs));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut last_row: HashMap<&str, u32> = HashMap::new();
        for commit in &self.commits {
            if !branch_ids.contains(commit.branch_id.as_str()) {
                return corrupt(format!(
                    "commit {} is on unknown branch {}",
                    commit.id, commit.branch_id
                ));
            }
            if commit.parents.len() > 2 {
                return corrupt(format!("commit {} has {} parents", commit.id, commit.parents.len()));
            }
            for parent in &commit.parents {
                if !seen.contains(parent.as_str()) {
                    return corrupt(format!(
                        "commit {} references {} which is not an earlier commit",
                        commit.id, parent
                    ));
                }
            }
            if let Some(&prev) = last_row.get(commit.branch_id.as_str()) {
                if commit.grid_index <= prev {
                    return corrupt(format!(
                        "commit {} at row {} does not follow row {} on {}",
                        commit.id, commit.grid_index, prev, commit.branch_id
                    ));
                }
            }
            if !seen.insert(commit.id.as_str()) {
                return corrupt(format!("duplicate commit id {}", commit.id));
            }
            last_row.insert(commit.branch_id.as_str(), commit.grid_index);
        }

        Ok(())
    }
}
