//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::grid::GridPos;
use crate::groups::GroupId;

/// Broken partition of the grid into groups. Generation never produces these;
/// they exist so tests and debug builds can assert against them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("group {0:?} has no member cells")]
    EmptyGroup(GroupId),
    #[error("cell {pos:?} is claimed by groups {first:?} and {second:?}")]
    CellClaimedTwice { pos: GridPos, first: GroupId, second: GroupId },
    #[error("cell {0:?} does not belong to any group")]
    CellUngrouped(GridPos),
    #[error("owner index says {pos:?} belongs to {indexed:?} but group {actual:?} holds it")]
    OwnerMismatch { pos: GridPos, indexed: Option<GroupId>, actual: GroupId },
    #[error("group at position {index} carries id {id:?}")]
    IdMismatch { index: usize, id: GroupId },
}

/// Failure to load or validate a generator configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure to write a rendered map or group summary.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
