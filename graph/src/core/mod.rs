pub mod edge;
pub mod dag;

pub use edge::{Edge, EdgeType};
pub use dag::{Dag, DagStats};
