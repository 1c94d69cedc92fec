use uuid::Uuid;

/// Source of unique identifiers for branches and commits.
///
/// Implementations must never hand out the same id twice for the lifetime
/// of a project.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs, shortened to the first 12 hex digits for display.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(12);
        id
    }
}

/// Deterministic ids (`prefix1`, `prefix2`, ...), used by tests and scripted runs.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("n")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
