use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::NamingPolicy;
use crate::error::FlowResult;
use crate::ids::IdSource;
use crate::model::{Branch, BranchId, BranchKind};
use crate::project::Project;

/// Operations that can be performed on the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    // Commit operations
    Commit { branch: BranchId, merge_offset: u32 },

    // Branch operations
    NewFeature,
    NewBugfix,
    NewHotfix,
    NewReleaseCandidate,
    NewQaFix,
    Delete(BranchId),

    // Merge operations
    Merge { source: BranchId, target: Option<BranchId> },
    MergeToReleaseAndDevelop(BranchId),
    MergeToReleaseAndCandidate(BranchId),
}

impl Operation {
    /// Plain commit with no reserved rows
    pub fn commit(branch: BranchId) -> Self {
        Operation::Commit { branch, merge_offset: 0 }
    }

    /// Run the operation against `project`, producing the next snapshot
    pub fn apply(
        &self,
        project: &Project,
        ids: &mut dyn IdSource,
        naming: &dyn NamingPolicy,
    ) -> FlowResult<Project> {
        match self {
            Operation::Commit { branch, merge_offset } => project.commit(ids, branch.as_str(), *merge_offset),
            Operation::NewFeature => project.new_feature_branch(ids, naming),
            Operation::NewBugfix => project.new_bugfix_branch(ids, naming),
            Operation::NewHotfix => project.new_hotfix_branch(ids, naming),
            Operation::NewReleaseCandidate => project.new_release_candidate_branch(ids, naming),
            Operation::NewQaFix => project.new_qa_fix_branch(ids, naming),
            Operation::Delete(branch) => project.delete_branch(branch.as_str()),
            Operation::Merge { source, target } => {
                project.merge(ids, source.as_str(), target.as_ref().map(BranchId::as_str))
            }
            Operation::MergeToReleaseAndDevelop(source) => project.merge_to_release_and_develop(ids, source.as_str()),
            Operation::MergeToReleaseAndCandidate(source) => {
                project.merge_to_release_and_candidate(ids, source.as_str())
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Commit { branch, merge_offset: 0 } => write!(f, "commit on {}", branch),
            Operation::Commit { branch, merge_offset } => write!(f, "commit on {} (+{})", branch, merge_offset),
            Operation::NewFeature => f.write_str("new feature branch"),
            Operation::NewBugfix => f.write_str("new bugfix branch"),
            Operation::NewHotfix => f.write_str("new hotfix branch"),
            Operation::NewReleaseCandidate => f.write_str("new release candidate"),
            Operation::NewQaFix => f.write_str("new qa fix branch"),
            Operation::Delete(branch) => write!(f, "delete {}", branch),
            Operation::Merge { source, target: Some(target) } => write!(f, "merge {} into {}", source, target),
            Operation::Merge { source, target: None } => write!(f, "merge {} into develop", source),
            Operation::MergeToReleaseAndDevelop(source) => write!(f, "merge {} into release and develop", source),
            Operation::MergeToReleaseAndCandidate(source) => {
                write!(f, "merge {} into release and candidate", source)
            }
        }
    }
}

impl Branch {
    /// Operations the diagram offers on this branch's header.
    ///
    /// A merged branch can only be deleted.
    pub fn available_operations(&self) -> Vec<Operation> {
        if self.merged {
            return vec![Operation::Delete(self.id.clone())];
        }
        let id = self.id.clone();
        match self.kind {
            BranchKind::Release => vec![Operation::NewHotfix],
            BranchKind::Develop => vec![
                Operation::NewReleaseCandidate,
                Operation::NewBugfix,
                Operation::NewFeature,
            ],
            BranchKind::Feature | BranchKind::Bugfix => vec![
                Operation::Merge { source: id.clone(), target: None },
                Operation::commit(id),
            ],
            BranchKind::Hotfix => vec![
                Operation::MergeToReleaseAndDevelop(id.clone()),
                Operation::commit(id),
            ],
            BranchKind::ReleaseCandidate => vec![
                Operation::NewQaFix,
                Operation::MergeToReleaseAndDevelop(id),
            ],
            BranchKind::QaFix => vec![
                Operation::MergeToReleaseAndCandidate(id.clone()),
                Operation::commit(id),
            ],
        }
    }
}

/// Owner of the current snapshot.
///
/// Each successful operation publishes a fresh `Arc<Project>`; readers that
/// still hold an older one keep seeing that older state.
pub struct FlowEngine {
    snapshot: Arc<Project>,
    ids: Box<dyn IdSource>,
    naming: Box<dyn NamingPolicy>,
}

impl FlowEngine {
    /// Create an engine holding the seed project
    pub fn new(mut ids: Box<dyn IdSource>, naming: Box<dyn NamingPolicy>) -> Self {
        let snapshot = Arc::new(Project::seed(ids.as_mut(), naming.as_ref()));
        Self { snapshot, ids, naming }
    }

    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.snapshot)
    }

    /// Apply an operation; on failure the current snapshot stays published
    pub fn apply(&mut self, op: &Operation) -> FlowResult<Arc<Project>> {
        match op.apply(&self.snapshot, self.ids.as_mut(), self.naming.as_ref()) {
            Ok(next) => {
                info!(
                    op = %op,
                    branches = next.branches.len(),
                    commits = next.commits.len(),
                    "applied"
                );
                self.snapshot = Arc::new(next);
                Ok(self.snapshot())
            }
            Err(err) => {
                warn!(op = %op, error = %err, "rejected");
                Err(err)
            }
        }
    }

    /// Apply operations in order, stopping at the first failure
    pub fn apply_all<'a, I>(&mut self, ops: I) -> FlowResult<Arc<Project>>
    where
        I: IntoIterator<Item = &'a Operation>,
    {
        for op in ops {
            self.apply(op)?;
        }
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;
    use crate::error::FlowError;
    use crate::ids::SequentialIds;
    use crate::model::CommitId;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use proptest::sample::Index;
    use std::collections::HashMap;

    fn engine() -> FlowEngine {
        FlowEngine::new(Box::new(SequentialIds::new("n")), Box::new(FlowConfig::default()))
    }

    fn newest(engine: &FlowEngine) -> BranchId {
        engine.snapshot().branches.last().unwrap().id.clone()
    }

    #[test]
    fn engine_publishes_new_snapshots() {
        let mut engine = engine();
        let seed = engine.snapshot();

        let next = engine.apply(&Operation::NewFeature).unwrap();
        assert_eq!(seed.branches.len(), 2);
        assert_eq!(next.branches.len(), 3);
        assert!(!Arc::ptr_eq(&seed, &next));
    }

    #[test]
    fn failed_operation_keeps_current_snapshot() {
        let mut engine = engine();
        let before = engine.snapshot();

        let err = engine.apply(&Operation::NewQaFix).unwrap_err();
        assert!(matches!(err, FlowError::PreconditionViolated(_)));
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
    }

    #[test]
    fn branch_headers_offer_flow_actions() {
        let mut engine = engine();
        let project = engine.snapshot();
        let release = project.release().unwrap();
        let develop = project.develop().unwrap();
        assert_eq!(release.available_operations(), vec![Operation::NewHotfix]);
        assert_eq!(
            develop.available_operations(),
            vec![Operation::NewReleaseCandidate, Operation::NewBugfix, Operation::NewFeature]
        );

        engine.apply(&Operation::NewReleaseCandidate).unwrap();
        let rc = newest(&engine);
        let project = engine.snapshot();
        assert_eq!(
            project.branch(rc.as_str()).unwrap().available_operations(),
            vec![Operation::NewQaFix, Operation::MergeToReleaseAndDevelop(rc.clone())]
        );

        engine.apply(&Operation::MergeToReleaseAndDevelop(rc.clone())).unwrap();
        let project = engine.snapshot();
        assert_eq!(
            project.branch(rc.as_str()).unwrap().available_operations(),
            vec![Operation::Delete(rc)]
        );
    }

    #[test]
    fn offered_operations_always_apply() {
        let mut engine = engine();
        let script = [
            Operation::NewFeature,
            Operation::NewHotfix,
            Operation::NewReleaseCandidate,
            Operation::NewQaFix,
            Operation::NewBugfix,
        ];
        engine.apply_all(script.iter()).unwrap();

        let project = engine.snapshot();
        for branch in &project.branches {
            for op in branch.available_operations() {
                // Branch-creation ops depend on global state, not on the branch
                if let Operation::NewReleaseCandidate = op {
                    continue;
                }
                op.apply(&project, &mut SequentialIds::new("t"), &FlowConfig::default())
                    .unwrap_or_else(|e| panic!("{} on {} failed: {}", op, branch.name, e));
            }
        }
    }

    /// One step of a generated session; branch picks resolve against the
    /// snapshot current at that step
    #[derive(Debug, Clone)]
    enum Step {
        Offered(Index, Index),
        Commit(Index, u32),
        Spawn(usize),
        Delete(Index),
        Merge(Index, Option<Index>),
        ToReleaseAndDevelop(Index),
        ToReleaseAndCandidate(Index),
    }

    impl Step {
        fn operation(&self, project: &Project) -> Operation {
            let pick = |idx: &Index| project.branches[idx.index(project.branches.len())].clone();
            match self {
                Step::Offered(branch, op) => {
                    let ops = pick(branch).available_operations();
                    ops[op.index(ops.len())].clone()
                }
                Step::Commit(branch, merge_offset) => Operation::Commit {
                    branch: pick(branch).id,
                    merge_offset: *merge_offset,
                },
                Step::Spawn(kind) => [
                    Operation::NewFeature,
                    Operation::NewBugfix,
                    Operation::NewHotfix,
                    Operation::NewReleaseCandidate,
                    Operation::NewQaFix,
                ][*kind]
                    .clone(),
                Step::Delete(branch) => Operation::Delete(pick(branch).id),
                Step::Merge(source, target) => Operation::Merge {
                    source: pick(source).id,
                    target: target.as_ref().map(|t| pick(t).id),
                },
                Step::ToReleaseAndDevelop(source) => Operation::MergeToReleaseAndDevelop(pick(source).id),
                Step::ToReleaseAndCandidate(source) => Operation::MergeToReleaseAndCandidate(pick(source).id),
            }
        }
    }

    fn step() -> impl Strategy<Value = Step> {
        let offset = prop_oneof![6 => 0u32..4, 1 => any::<u32>()];
        prop_oneof![
            4 => (any::<Index>(), any::<Index>()).prop_map(|(b, op)| Step::Offered(b, op)),
            3 => (any::<Index>(), offset).prop_map(|(b, o)| Step::Commit(b, o)),
            3 => (0usize..5).prop_map(Step::Spawn),
            1 => any::<Index>().prop_map(Step::Delete),
            2 => (any::<Index>(), proptest::option::of(any::<Index>()))
                .prop_map(|(source, target)| Step::Merge(source, target)),
            1 => any::<Index>().prop_map(Step::ToReleaseAndDevelop),
            1 => any::<Index>().prop_map(Step::ToReleaseAndCandidate),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn operation_sequences_keep_the_graph_valid(steps in prop::collection::vec(step(), 1..80)) {
            let mut engine = engine();
            let mut created: HashMap<CommitId, usize> = engine
                .snapshot()
                .commits
                .iter()
                .map(|c| (c.id.clone(), 0))
                .collect();

            for (idx, step) in steps.iter().enumerate() {
                let at = idx + 1;
                let before = engine.snapshot();
                let op = step.operation(&before);

                match engine.apply(&op) {
                    // rejections leave the published snapshot in place
                    Err(_) => {
                        prop_assert!(Arc::ptr_eq(&before, &engine.snapshot()));
                    }
                    Ok(next) => {
                        prop_assert_eq!(next.validate(), Ok(()), "after {}", op);
                        for commit in &next.commits {
                            let born = *created.entry(commit.id.clone()).or_insert(at);
                            for parent in &commit.parents {
                                prop_assert!(
                                    created[parent] < born,
                                    "{} has parent {} from a later step",
                                    commit.id,
                                    parent
                                );
                            }
                        }
                        for branch in before.branches.iter().filter(|b| b.merged) {
                            if let Some(now) = next.branch(branch.id.as_str()) {
                                prop_assert!(now.merged, "{} was unmerged by {}", branch.name, op);
                            }
                        }
                        prop_assert!(next.release().is_some() && next.develop().is_some());
                    }
                }
            }
        }
    }
}
