use gitflow_core::{Commit, Project};
use graph::{column_order, CommitDecorator, Connector, Dag, EdgeType};
use std::collections::HashMap;
use std::fmt::{self, Write};
use unicode_width::UnicodeWidthStr;

const MIN_CELL: usize = 8;

/// Plain-text board: one column per branch, one line per grid row
pub fn render(project: &Project, connectors: &[Connector]) -> Result<String, fmt::Error> {
    let columns = column_order(project);
    let cell = columns
        .iter()
        .map(|b| b.name.width())
        .max()
        .unwrap_or(0)
        .max(MIN_CELL)
        + 2;
    let decorator = CommitDecorator::new(project);

    let mut cells: HashMap<(usize, u32), &Commit> = HashMap::new();
    let mut spans: Vec<Option<(u32, u32)>> = vec![None; columns.len()];
    for (col, branch) in columns.iter().enumerate() {
        for commit in project.commits_on(branch.id.as_str()) {
            cells.insert((col, commit.grid_index), commit);
            spans[col] = Some(match spans[col] {
                Some((first, _)) => (first, commit.grid_index),
                None => (commit.grid_index, commit.grid_index),
            });
        }
    }

    let mut out = String::new();
    let header: String = columns.iter().map(|b| pad(&b.name, cell)).collect();
    writeln!(out, "{}", header.trim_end())?;

    let last_row = project.commits.iter().map(|c| c.grid_index).max().unwrap_or(0);
    for row in 1..=last_row {
        let mut line = String::new();
        for (col, branch) in columns.iter().enumerate() {
            let text = match cells.get(&(col, row)) {
                Some(commit) => {
                    let deco = decorator.decorate(commit);
                    let mut marker = String::from(if commit.is_merge() { "M" } else { "o" });
                    if deco.merged {
                        marker = marker.to_lowercase();
                    }
                    if let Some(tag) = deco.tag {
                        marker.push(' ');
                        marker.push_str(&tag);
                    }
                    if deco.is_tip && !branch.merged {
                        marker.push('*');
                    }
                    marker
                }
                None => match spans[col] {
                    Some((first, last)) if first < row && row < last => "|".to_string(),
                    _ => String::new(),
                },
            };
            line.push_str(&pad(&text, cell));
        }
        writeln!(out, "{:>3} {}", row, line.trim_end())?;
    }

    if !connectors.is_empty() {
        writeln!(out)?;
        writeln!(out, "connectors:")?;
        for connector in connectors {
            write!(
                out,
                "  {} -> {}  ({},{}) -> ({},{})",
                connector.source_commit_id,
                connector.target_commit_id,
                connector.source_anchor.left,
                connector.source_anchor.top,
                connector.target_anchor.left,
                connector.target_anchor.top
            )?;
            if connector.edge_type == EdgeType::Merge {
                out.push_str(" merge");
            }
            out.push('\n');
        }
    }

    let stats = Dag::from_project(project).stats();
    writeln!(out)?;
    writeln!(
        out,
        "{} branches, {} commits, {} edges, {} merges",
        project.branches.len(),
        stats.total_commits,
        stats.total_edges,
        stats.merge_commits
    )?;
    Ok(out)
}

/// Left-align to display width; text wider than the cell is left as is
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}
