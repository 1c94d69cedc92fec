pub mod core;
pub mod layout;
pub mod decor;

pub use core::{Dag, DagStats, Edge, EdgeType};
pub use layout::{column_index, column_order, compute_connectors, Anchor, AnchorTable, Connector, GridMetrics};
pub use decor::{release_tags, CommitDecorator, Decoration};
