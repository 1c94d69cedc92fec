use gitflow_core::{BranchId, Operation, Project};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: `{command}` needs a branch name")]
    MissingArgument { line: usize, command: String },

    #[error("line {line}: `{value}` is not a row offset")]
    BadOffset { line: usize, value: String },

    #[error("line {line}: unexpected argument `{value}`")]
    TrailingArgument { line: usize, value: String },

    #[error("no branch named `{0}`")]
    UnknownBranch(String),
}

/// One scripted action, branches referenced by display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Commit { branch: String, offset: u32 },
    Feature,
    Bugfix,
    Hotfix,
    ReleaseCandidate,
    QaFix,
    Merge { source: String, target: Option<String> },
    Release(String),
    QaMerge(String),
    Delete(String),
}

/// Parse a script: one step per line, `#` starts a comment
pub fn parse_script(text: &str) -> Result<Vec<(usize, Step)>, ScriptError> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        steps.push((line, parse_line(line, content)?));
    }
    Ok(steps)
}

fn parse_line(line: usize, content: &str) -> Result<Step, ScriptError> {
    let mut words = content.split_whitespace();
    let command = words.next().unwrap_or_default();
    let take_branch = |words: &mut std::str::SplitWhitespace<'_>| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| ScriptError::MissingArgument { line, command: command.to_string() })
    };

    let step = match command {
        "feature" => Step::Feature,
        "bugfix" => Step::Bugfix,
        "hotfix" => Step::Hotfix,
        "rc" => Step::ReleaseCandidate,
        "qa-fix" => Step::QaFix,
        "commit" => {
            let branch = take_branch(&mut words)?;
            let offset = match words.next() {
                Some(value) => value
                    .parse()
                    .map_err(|_| ScriptError::BadOffset { line, value: value.to_string() })?,
                None => 0,
            };
            Step::Commit { branch, offset }
        }
        "merge" => {
            let source = take_branch(&mut words)?;
            Step::Merge { source, target: words.next().map(str::to_string) }
        }
        "release" => Step::Release(take_branch(&mut words)?),
        "qa-merge" => Step::QaMerge(take_branch(&mut words)?),
        "delete" => Step::Delete(take_branch(&mut words)?),
        other => {
            return Err(ScriptError::UnknownCommand { line, command: other.to_string() });
        }
    };

    if let Some(extra) = words.next() {
        return Err(ScriptError::TrailingArgument { line, value: extra.to_string() });
    }
    Ok(step)
}

impl Step {
    /// Turn names into ids against the current snapshot
    pub fn resolve(&self, project: &Project) -> Result<Operation, ScriptError> {
        let op = match self {
            Step::Commit { branch, offset } => Operation::Commit {
                branch: branch_id(project, branch)?,
                merge_offset: *offset,
            },
            Step::Feature => Operation::NewFeature,
            Step::Bugfix => Operation::NewBugfix,
            Step::Hotfix => Operation::NewHotfix,
            Step::ReleaseCandidate => Operation::NewReleaseCandidate,
            Step::QaFix => Operation::NewQaFix,
            Step::Merge { source, target } => Operation::Merge {
                source: branch_id(project, source)?,
                target: target.as_deref().map(|t| branch_id(project, t)).transpose()?,
            },
            Step::Release(source) => Operation::MergeToReleaseAndDevelop(branch_id(project, source)?),
            Step::QaMerge(source) => Operation::MergeToReleaseAndCandidate(branch_id(project, source)?),
            Step::Delete(branch) => Operation::Delete(branch_id(project, branch)?),
        };
        Ok(op)
    }
}

/// Names can repeat after a delete; the newest branch wins
fn branch_id(project: &Project, name: &str) -> Result<BranchId, ScriptError> {
    project
        .branches
        .iter()
        .rev()
        .find(|b| b.name == name)
        .map(|b| b.id.clone())
        .ok_or_else(|| ScriptError::UnknownBranch(name.to_string()))
}
