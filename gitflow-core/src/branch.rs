use smallvec::smallvec;
use std::collections::HashSet;
use tracing::debug;

use crate::config::NamingPolicy;
use crate::error::{FlowError, FlowResult};
use crate::ids::IdSource;
use crate::model::{Branch, BranchId, BranchKind, Commit, CommitId};
use crate::project::Project;

impl Project {
    /// Start a feature branch from the develop tip
    pub fn new_feature_branch(&self, ids: &mut dyn IdSource, naming: &dyn NamingPolicy) -> FlowResult<Project> {
        let develop = self.require_kind(BranchKind::Develop)?.id.clone();
        self.spawn_branch(ids, naming, BranchKind::Feature, &develop)
    }

    /// Start a bugfix branch from the develop tip
    pub fn new_bugfix_branch(&self, ids: &mut dyn IdSource, naming: &dyn NamingPolicy) -> FlowResult<Project> {
        let develop = self.require_kind(BranchKind::Develop)?.id.clone();
        self.spawn_branch(ids, naming, BranchKind::Bugfix, &develop)
    }

    /// Start a hotfix branch from the release tip
    pub fn new_hotfix_branch(&self, ids: &mut dyn IdSource, naming: &dyn NamingPolicy) -> FlowResult<Project> {
        let release = self.require_kind(BranchKind::Release)?.id.clone();
        self.spawn_branch(ids, naming, BranchKind::Hotfix, &release)
    }

    /// Cut a release candidate from the develop tip.
    ///
    /// Only one release candidate may be open at a time.
    pub fn new_release_candidate_branch(
        &self,
        ids: &mut dyn IdSource,
        naming: &dyn NamingPolicy,
    ) -> FlowResult<Project> {
        if let Some(active) = self.active_release_candidate() {
            return Err(FlowError::PreconditionViolated(format!(
                "release candidate `{}` is still open",
                active.name
            )));
        }
        let develop = self.require_kind(BranchKind::Develop)?.id.clone();
        self.spawn_branch(ids, naming, BranchKind::ReleaseCandidate, &develop)
    }

    /// Start a QA fix branch from the open release candidate's tip
    pub fn new_qa_fix_branch(&self, ids: &mut dyn IdSource, naming: &dyn NamingPolicy) -> FlowResult<Project> {
        let candidate = self
            .active_release_candidate()
            .ok_or_else(|| FlowError::PreconditionViolated("no open release candidate".to_string()))?
            .id
            .clone();
        self.spawn_branch(ids, naming, BranchKind::QaFix, &candidate)
    }

    /// Create a branch of `kind` with one commit on top of `source`'s tip
    fn spawn_branch(
        &self,
        ids: &mut dyn IdSource,
        naming: &dyn NamingPolicy,
        kind: BranchKind,
        source: &BranchId,
    ) -> FlowResult<Project> {
        let source_tip = self.require_tip(source.as_str())?;
        let seq = self.branches_of_kind(kind).count() + 1;

        let branch = Branch::new(
            BranchId::new(ids.next_id()),
            naming.branch_name(kind, seq),
            kind,
            naming.branch_color(kind),
        );
        let commit = Commit::new(
            CommitId::new(ids.next_id()),
            branch.id.clone(),
            Project::row_below(source_tip.grid_index, 0)?,
            smallvec![source_tip.id.clone()],
        );
        debug!(branch = %branch.name, %kind, from = %source_tip.id, row = commit.grid_index, "new branch");

        let mut next = self.clone();
        next.branches.push(branch);
        next.commits.push(commit);
        Ok(next)
    }

    /// Remove a branch with all its commits.
    ///
    /// Surviving commits lose any parent reference to a removed commit but
    /// are kept themselves, so a merge commit stays on its target branch with
    /// one parent fewer.
    pub fn delete_branch(&self, branch_id: &str) -> FlowResult<Project> {
        let branch = self.require_branch(branch_id)?;
        if branch.kind.is_permanent() {
            return Err(FlowError::PreconditionViolated(format!(
                "branch `{}` cannot be deleted",
                branch.name
            )));
        }

        let removed: HashSet<&CommitId> = self
            .commits_on(branch_id)
            .map(|c| &c.id)
            .collect();

        let branches = self
            .branches
            .iter()
            .filter(|b| b.id.as_str() != branch_id)
            .cloned()
            .collect();
        let mut pruned = 0usize;
        let commits = self
            .commits
            .iter()
            .filter(|c| c.branch_id.as_str() != branch_id)
            .map(|c| {
                let mut commit = c.clone();
                let before = commit.parents.len();
                commit.parents.retain(|p| !removed.contains(p));
                pruned += before - commit.parents.len();
                commit
            })
            .collect();
        debug!(branch = %branch.name, removed = removed.len(), pruned, "delete branch");

        Ok(Project { branches, commits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;

    struct Fixture {
        ids: SequentialIds,
        config: FlowConfig,
        project: Project,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ids = SequentialIds::new("n");
            let config = FlowConfig::default();
            let project = Project::seed(&mut ids, &config);
            Self { ids, config, project }
        }

        fn newest_branch(&self) -> &Branch {
            self.project.branches.last().unwrap()
        }
    }

    #[test]
    fn feature_branch_starts_below_develop_tip() {
        let mut fx = Fixture::new();
        let develop_tip = fx.project.tip(fx.project.develop().unwrap().id.as_str()).unwrap().clone();

        fx.project = fx.project.new_feature_branch(&mut fx.ids, &fx.config).unwrap();
        let feature = fx.newest_branch().clone();
        assert_eq!(feature.kind, BranchKind::Feature);
        assert_eq!(feature.name, "feature/1");
        assert!(feature.can_commit);
        assert!(!feature.merged);

        let commits: Vec<_> = fx.project.commits_on(feature.id.as_str()).collect();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].grid_index, develop_tip.grid_index + 1);
        assert_eq!(commits[0].parents.as_slice(), &[develop_tip.id]);
        fx.project.validate().unwrap();
    }

    #[test]
    fn sequence_numbers_count_same_kind_only() {
        let mut fx = Fixture::new();
        fx.project = fx.project.new_feature_branch(&mut fx.ids, &fx.config).unwrap();
        fx.project = fx.project.new_bugfix_branch(&mut fx.ids, &fx.config).unwrap();
        fx.project = fx.project.new_feature_branch(&mut fx.ids, &fx.config).unwrap();

        let names: Vec<_> = fx.project.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["release", "develop", "feature/1", "bugfix/1", "feature/2"]);
    }

    #[test]
    fn hotfix_branch_starts_from_release() {
        let mut fx = Fixture::new();
        let release_tip = fx.project.tip(fx.project.release().unwrap().id.as_str()).unwrap().id.clone();

        fx.project = fx.project.new_hotfix_branch(&mut fx.ids, &fx.config).unwrap();
        let hotfix = fx.newest_branch();
        assert_eq!(hotfix.kind, BranchKind::Hotfix);
        let tip = fx.project.tip(hotfix.id.as_str()).unwrap();
        assert_eq!(tip.grid_index, 2);
        assert_eq!(tip.parents.as_slice(), &[release_tip]);
    }

    #[test]
    fn only_one_open_release_candidate() {
        let mut fx = Fixture::new();
        fx.project = fx.project.new_release_candidate_branch(&mut fx.ids, &fx.config).unwrap();
        let rc = fx.newest_branch().clone();
        assert_eq!(fx.project.active_release_candidate(), Some(&rc));

        let before = fx.project.clone();
        let err = fx.project.new_release_candidate_branch(&mut fx.ids, &fx.config);
        assert!(matches!(err, Err(FlowError::PreconditionViolated(_))));
        assert_eq!(fx.project, before);
    }

    #[test]
    fn qa_fix_requires_open_candidate() {
        let mut fx = Fixture::new();
        assert!(matches!(
            fx.project.new_qa_fix_branch(&mut fx.ids, &fx.config),
            Err(FlowError::PreconditionViolated(_))
        ));

        fx.project = fx.project.new_release_candidate_branch(&mut fx.ids, &fx.config).unwrap();
        let rc_tip = fx.project.tip(fx.newest_branch().id.as_str()).unwrap().clone();

        fx.project = fx.project.new_qa_fix_branch(&mut fx.ids, &fx.config).unwrap();
        let qa = fx.newest_branch();
        assert_eq!(qa.kind, BranchKind::QaFix);
        assert_eq!(qa.name, "qa-fix/1");
        let tip = fx.project.tip(qa.id.as_str()).unwrap();
        assert_eq!(tip.grid_index, rc_tip.grid_index + 1);
        assert_eq!(tip.parents.as_slice(), &[rc_tip.id]);
    }

    #[test]
    fn delete_removes_branch_and_commits() {
        let mut fx = Fixture::new();
        fx.project = fx.project.new_feature_branch(&mut fx.ids, &fx.config).unwrap();
        let feature = fx.newest_branch().id.clone();
        fx.project = fx.project.commit(&mut fx.ids, feature.as_str(), 0).unwrap();

        let next = fx.project.delete_branch(feature.as_str()).unwrap();
        assert!(next.branch(feature.as_str()).is_none());
        assert_eq!(next.commits_on(feature.as_str()).count(), 0);
        assert_eq!(next.commits.len(), 2);
        next.validate().unwrap();
    }

    #[test]
    fn delete_prunes_every_reference_to_removed_commits() {
        let mut fx = Fixture::new();
        fx.project = fx.project.new_release_candidate_branch(&mut fx.ids, &fx.config).unwrap();
        let rc = fx.newest_branch().id.clone();
        let rc_first = fx.project.tip(rc.as_str()).unwrap().id.clone();
        fx.project = fx.project.new_qa_fix_branch(&mut fx.ids, &fx.config).unwrap();
        let qa = fx.newest_branch().id.clone();
        fx.project = fx.project.merge_to_release_and_candidate(&mut fx.ids, qa.as_str()).unwrap();

        // The qa fix's first commit hangs off an rc commit that is no longer its tip
        let next = fx.project.delete_branch(rc.as_str()).unwrap();
        let removed: HashSet<_> = fx.project.commits_on(rc.as_str()).map(|c| c.id.clone()).collect();
        assert!(removed.contains(&rc_first));
        for commit in &next.commits {
            assert!(commit.parents.iter().all(|p| !removed.contains(p)));
        }
        let qa_root = next.commits_on(qa.as_str()).next().unwrap();
        assert!(qa_root.parents.is_empty());
        next.validate().unwrap();
    }

    #[test]
    fn delete_keeps_merge_commit_with_remaining_parent() {
        let mut fx = Fixture::new();
        let develop = fx.project.develop().unwrap().id.clone();
        fx.project = fx.project.new_feature_branch(&mut fx.ids, &fx.config).unwrap();
        let feature = fx.newest_branch().id.clone();
        fx.project = fx.project.merge(&mut fx.ids, feature.as_str(), None).unwrap();
        let merge_commit = fx.project.tip(develop.as_str()).unwrap().clone();
        assert!(merge_commit.is_merge());

        let next = fx.project.delete_branch(feature.as_str()).unwrap();
        let survivor = next.find_commit(merge_commit.id.as_str()).unwrap();
        assert_eq!(survivor.parents.as_slice(), &[merge_commit.parents[1].clone()]);
        assert_eq!(survivor.grid_index, merge_commit.grid_index);
    }

    #[test]
    fn permanent_branches_cannot_be_deleted() {
        let fx = Fixture::new();
        for branch in [fx.project.release().unwrap(), fx.project.develop().unwrap()] {
            assert!(matches!(
                fx.project.delete_branch(branch.id.as_str()),
                Err(FlowError::PreconditionViolated(_))
            ));
        }
        assert_eq!(
            fx.project.delete_branch("ghost"),
            Err(FlowError::InvalidReference("ghost".to_string()))
        );
    }
}
