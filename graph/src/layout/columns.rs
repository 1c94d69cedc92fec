use gitflow_core::{Branch, BranchKind, Project};

/// Left-to-right group of a branch kind on the board
fn column_rank(kind: BranchKind) -> u8 {
    match kind {
        BranchKind::Release => 0,
        BranchKind::Hotfix => 1,
        BranchKind::QaFix => 2,
        BranchKind::ReleaseCandidate => 3,
        BranchKind::Develop => 4,
        BranchKind::Feature => 5,
        BranchKind::Bugfix => 6,
    }
}

/// Branches in board order: release, hotfixes, QA fixes, release
/// candidates, develop, features, bugfixes. Creation order is kept
/// within each group.
pub fn column_order(project: &Project) -> Vec<&Branch> {
    let mut branches: Vec<&Branch> = project.branches.iter().collect();
    // stable: ties keep creation order
    branches.sort_by_key(|b| column_rank(b.kind));
    branches
}

/// Column of one branch, if it exists
pub fn column_index(project: &Project, branch_id: &str) -> Option<usize> {
    column_order(project)
        .iter()
        .position(|b| b.id.as_str() == branch_id)
}
