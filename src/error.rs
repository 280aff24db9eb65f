use thiserror::Error;

/// Errors raised while turning a query result into a graph.
///
/// Only contract violations between the descriptor table and the rows end up
/// here. Sparse data (missing ids, empty columns) is skipped silently.
#[derive(Debug, Error)]
pub enum Error {
    #[error("row references unknown printout `{0}`")]
    UnknownPrintout(String),

    #[error("printout `{hash}` points at unknown parent `{parent}`")]
    UnresolvedParent { hash: String, parent: String },

    #[error("expected exactly one main column, found {0}")]
    MainColumn(usize),

    #[error("malformed attribute list: {0}")]
    AttributeSyntax(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
