use std::path::PathBuf;

use thiserror::Error;

use crate::demand::DemandID;
use crate::graph_util::{EdgeID, NodeID};

pub type RoutingResult<T> = Result<T, RoutingError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoutingError {
    #[error("node {0:?} already exists")]
    DuplicateId(NodeID),
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeID),
    #[error("edge between {0:?} and {1:?} already exists")]
    DuplicateEdge(NodeID, NodeID),
    #[error("self loop on node {0:?} is not allowed")]
    SelfLoop(NodeID),
    #[error("device {device:?} may only attach to a router, not {other:?}")]
    DeviceLink { device: NodeID, other: NodeID },
    #[error("edge {0:?} does not exist")]
    UnknownEdge(EdgeID),
    #[error("traffic demand {0:?} does not exist")]
    UnknownDemand(DemandID),
    #[error("invalid selection: {0}")]
    InvalidSelection(&'static str),
    #[error("cannot start run: {0}")]
    DegenerateRun(&'static str),
    #[error("parameter `{name}` out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] RoutingError),
}
