use crate::cluster::WorkerTarget;
use crate::core::NodeAddress;
use thiserror::Error;

/// Why a single call through a [`Transport`](crate::core::Transport) did not produce replies.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallError {
  #[error("timed out")]
  TimedOut,
  #[error("{0}")]
  Failed(String),
}

/// Errors raised by cluster coordination.
///
/// `EmptyTopology`, `BadEventName` and `InvalidRingId` are fatal to the request that raised them.
/// Every other kind describes one node or one worker, and is collected next to the results of the
/// others instead of aborting the operation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ClusterError {
  #[error("the routing table is empty")]
  EmptyTopology,
  #[error("bad event name {name:?}, expected <app>@<event>")]
  BadEventName { name: String },
  #[error("invalid ring id {input:?}")]
  InvalidRingId { input: String },
  #[error("capacity query to {node} failed: {cause}")]
  CapacityQueryFailed { node: NodeAddress, cause: CallError },
  #[error("malformed capacity reply from {node}")]
  MalformedCapacityReply { node: NodeAddress },
  #[error("{target}: {cause}")]
  TransportError { target: WorkerTarget, cause: CallError },
  #[error("{target}: empty reply")]
  EmptyReply { target: WorkerTarget },
  #[error("{target}: payload is not a document")]
  ParseError { target: WorkerTarget },
}
impl ClusterError {
  /// Whether this error ends the whole request rather than describing one participant.
  pub fn is_fatal(&self) -> bool {
    matches!(
      self,
      ClusterError::EmptyTopology
        | ClusterError::BadEventName { .. }
        | ClusterError::InvalidRingId { .. }
    )
  }
}
