use smallvec::smallvec;
use tracing::debug;

use crate::error::{FlowError, FlowResult};
use crate::ids::IdSource;
use crate::model::{Commit, CommitId};
use crate::project::Project;

impl Project {
    /// Append a commit to a branch.
    ///
    /// The new commit sits `merge_offset + 1` rows below the current tip and
    /// has the tip as its only parent. A non-zero offset reserves rows for a
    /// merge that will land beside it; ordinary commits pass 0. An offset
    /// that would run past the last representable row is rejected.
    pub fn commit(&self, ids: &mut dyn IdSource, branch_id: &str, merge_offset: u32) -> FlowResult<Project> {
        let branch = self.require_branch(branch_id)?;
        if !branch.can_commit {
            return Err(FlowError::PreconditionViolated(format!(
                "branch `{}` does not accept direct commits",
                branch.name
            )));
        }
        let tip = self.require_tip(branch_id)?;

        let commit = Commit::new(
            CommitId::new(ids.next_id()),
            branch.id.clone(),
            Project::row_below(tip.grid_index, merge_offset)?,
            smallvec![tip.id.clone()],
        );
        debug!(branch = %branch.name, commit = %commit.id, row = commit.grid_index, "commit");

        let mut next = self.clone();
        next.commits.push(commit);
        Ok(next)
    }
}
