pub mod error;
pub mod ids;
pub mod config;
pub mod model;
pub mod project;
pub mod commit;
pub mod branch;
pub mod merge;
pub mod operations;

pub use error::{FlowError, FlowResult};
pub use ids::{IdSource, SequentialIds, UuidIds};
pub use config::{BranchColors, BranchNames, FlowConfig, NamingPolicy};
pub use model::{Branch, BranchId, BranchKind, Commit, CommitId, Parents};
pub use project::Project;
pub use operations::{FlowEngine, Operation};
