pub mod refs;

pub use refs::{release_tags, CommitDecorator, Decoration};
