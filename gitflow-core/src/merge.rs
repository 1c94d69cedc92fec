use smallvec::smallvec;
use tracing::debug;

use crate::error::{FlowError, FlowResult};
use crate::ids::IdSource;
use crate::model::{Branch, BranchId, BranchKind, Commit, CommitId};
use crate::project::Project;

/// Parent order of a merge commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentOrder {
    /// `[source_tip, target_tip]`, used by the single-target merge
    SourceFirst,
    /// `[target_tip, source_tip]`, used by the release merges
    TargetFirst,
}

impl Project {
    /// Merge a feature or bugfix branch into `target` (develop when `None`).
    ///
    /// Produces one merge commit on the target whose parents are
    /// `[source_tip, target_tip]`, then marks the source merged.
    pub fn merge(&self, ids: &mut dyn IdSource, source_id: &str, target_id: Option<&str>) -> FlowResult<Project> {
        let target = match target_id {
            Some(id) => self.require_branch(id)?.id.clone(),
            None => self.require_kind(BranchKind::Develop)?.id.clone(),
        };
        let source = self.check_source(source_id)?;
        if source.kind.is_permanent() {
            return Err(FlowError::PreconditionViolated(format!(
                "permanent branch `{}` cannot be merged away",
                source.name
            )));
        }
        if source_id == target.as_str() {
            return Err(FlowError::PreconditionViolated(format!(
                "cannot merge `{}` into itself",
                source_id
            )));
        }

        let merge = self.merge_commit(ids, source_id, &target, ParentOrder::SourceFirst)?;
        let mut next = self.clone();
        next.commits.push(merge);
        next.mark_merged(source_id);
        Ok(next)
    }

    /// Finish a hotfix or release candidate: one merge commit on release and
    /// one on develop, both with parents `[target_tip, source_tip]`.
    pub fn merge_to_release_and_develop(&self, ids: &mut dyn IdSource, source_id: &str) -> FlowResult<Project> {
        let release = self.require_kind(BranchKind::Release)?.id.clone();
        let develop = self.require_kind(BranchKind::Develop)?.id.clone();
        self.merge_twice(ids, source_id, &release, &develop)
    }

    /// Finish a QA fix: one merge commit on release and one on the open
    /// release candidate, both with parents `[target_tip, source_tip]`.
    pub fn merge_to_release_and_candidate(&self, ids: &mut dyn IdSource, source_id: &str) -> FlowResult<Project> {
        let release = self.require_kind(BranchKind::Release)?.id.clone();
        let candidate = self
            .active_release_candidate()
            .ok_or_else(|| FlowError::PreconditionViolated("no open release candidate".to_string()))?
            .id
            .clone();
        self.merge_twice(ids, source_id, &release, &candidate)
    }

    fn merge_twice(
        &self,
        ids: &mut dyn IdSource,
        source_id: &str,
        first: &BranchId,
        second: &BranchId,
    ) -> FlowResult<Project> {
        let source = self.check_source(source_id)?;
        if source.kind.is_permanent() || source.id == *second {
            return Err(FlowError::PreconditionViolated(format!(
                "branch `{}` cannot be merged into release",
                source.name
            )));
        }

        // Both commits are computed against the prior snapshot's tips
        let into_first = self.merge_commit(ids, source_id, first, ParentOrder::TargetFirst)?;
        let into_second = self.merge_commit(ids, source_id, second, ParentOrder::TargetFirst)?;

        let mut next = self.clone();
        next.commits.push(into_first);
        next.commits.push(into_second);
        next.mark_merged(source_id);
        Ok(next)
    }

    /// Source must exist and not be merged already
    fn check_source(&self, source_id: &str) -> FlowResult<&Branch> {
        let source = self.require_branch(source_id)?;
        if source.merged {
            return Err(FlowError::PreconditionViolated(format!(
                "branch `{}` is already merged",
                source.name
            )));
        }
        Ok(source)
    }

    fn merge_commit(
        &self,
        ids: &mut dyn IdSource,
        source_id: &str,
        target: &BranchId,
        order: ParentOrder,
    ) -> FlowResult<Commit> {
        let source_tip = self.require_tip(source_id)?;
        let target_tip = self.require_tip(target.as_str())?;

        let parents = match order {
            ParentOrder::SourceFirst => smallvec![source_tip.id.clone(), target_tip.id.clone()],
            ParentOrder::TargetFirst => smallvec![target_tip.id.clone(), source_tip.id.clone()],
        };
        let commit = Commit::new(
            CommitId::new(ids.next_id()),
            target.clone(),
            Project::row_below(source_tip.grid_index.max(target_tip.grid_index), 0)?,
            parents,
        );
        debug!(source = source_id, target = %target, commit = %commit.id, row = commit.grid_index, "merge");
        Ok(commit)
    }

    fn mark_merged(&mut self, branch_id: &str) {
        if let Some(branch) = self.branch_mut(branch_id) {
            branch.merged = true;
        }
    }
}
