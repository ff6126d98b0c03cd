use thiserror::Error;

/// Core error type shared across mockweave crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The schema violates structural invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// The relationship graph contains a cycle; `path` starts and ends on the same entity.
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
    /// The resolver produced an incomplete order for a graph it considered acyclic.
    #[error("internal ordering error: {0}")]
    InternalOrdering(String),
}

/// Convenience alias for results returned by mockweave crates.
pub type Result<T> = std::result::Result<T, Error>;
