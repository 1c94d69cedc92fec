pub mod anchors;
pub mod columns;
pub mod connectors;

pub use anchors::{Anchor, AnchorTable, GridMetrics};
pub use columns::{column_index, column_order};
pub use connectors::{compute_connectors, Connector};
