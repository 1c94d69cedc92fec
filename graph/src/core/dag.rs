use super::edge::Edge;
use gitflow_core::{Commit, Project};
use std::collections::HashMap;

/// Read-only index over a snapshot's commit graph
#[derive(Debug, Clone)]
pub struct Dag<'a> {
    /// All nodes indexed by commit ID
    pub nodes: HashMap<&'a str, &'a Commit>,
    /// Commit IDs in creation order
    pub order: Vec<&'a str>,
    /// All edges in the graph, parent to child
    pub edges: Vec<Edge>,
    /// Quick lookup: commit ID -> children IDs
    pub children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Dag<'a> {
    pub fn from_project(project: &'a Project) -> Self {
        Self::from_commits(&project.commits)
    }

    pub fn from_commits(commits: &'a [Commit]) -> Self {
        let mut dag = Self {
            nodes: HashMap::with_capacity(commits.len()),
            order: Vec::with_capacity(commits.len()),
            edges: Vec::new(),
            children: HashMap::new(),
        };
        for commit in commits {
            dag.add_node(commit);
        }
        dag
    }

    fn add_node(&mut self, node: &'a Commit) {
        let id = node.id.as_str();

        // Add edges for each parent
        for parent in &node.parents {
            let edge = if node.is_merge() {
                Edge::merge(parent.clone(), node.id.clone())
            } else {
                Edge::new(parent.clone(), node.id.clone())
            };
            self.edges.push(edge);

            // Update children map
            self.children.entry(parent.as_str()).or_default().push(id);
        }

        self.nodes.insert(id, node);
        self.order.push(id);
    }

    /// Commits without parents, in creation order
    pub fn roots(&self) -> Vec<&'a Commit> {
        self.ordered().filter(|node| node.is_root()).collect()
    }

    /// Commits nothing builds on, in creation order
    pub fn leaves(&self) -> Vec<&'a Commit> {
        self.ordered()
            .filter(|node| !self.children.contains_key(node.id.as_str()))
            .collect()
    }

    /// Get statistics about the DAG
    pub fn stats(&self) -> DagStats {
        DagStats {
            total_commits: self.nodes.len(),
            total_edges: self.edges.len(),
            merge_commits: self.nodes.values().filter(|n| n.is_merge()).count(),
            root_commits: self.roots().len(),
            leaf_commits: self.leaves().len(),
        }
    }

    fn ordered(&self) -> impl Iterator<Item = &'a Commit> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id).copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagStats {
    pub total_commits: usize,
    pub total_edges: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub leaf_commits: usize,
}
