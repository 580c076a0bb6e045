use thiserror::Error;

use crate::catalog::NodeKind;
use crate::handlers::HandlerKind;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("tree description is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate node slug: {0}")]
    DuplicateSlug(String),

    #[error("unknown node type {kind:?} on node {slug}")]
    UnknownNodeType { slug: String, kind: String },

    #[error("malformed tree at node {slug}: {reason}")]
    MalformedTree { slug: String, reason: String },

    #[error("no node with slug {0}")]
    UnknownSlug(String),

    #[error("{kind} handler not registered: {key:?}")]
    HandlerNotFound { kind: HandlerKind, key: String },

    #[error("selector {slug} chose {chosen:?}, which is not one of its children")]
    InvalidSelection { slug: String, chosen: String },

    #[error("probability selector {slug} has non-positive total weight {total}")]
    InvalidWeights { slug: String, total: f64 },

    #[error("node {slug} of type {kind} has no evaluation behavior")]
    Unsupported { slug: String, kind: NodeKind },
}

impl TreeError {
    pub(crate) fn malformed(slug: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            slug: slug.to_string(),
            reason: reason.into(),
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
