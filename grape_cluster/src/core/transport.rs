use crate::core::{CallError, NodeAddress, RingId};
use async_trait::async_trait;
use smallvec::SmallVec;

/// One frame of a reply to an executed event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
  /// The node the frame came from, if the client reports it.
  pub address: Option<NodeAddress>,
  pub data: Vec<u8>,
}
impl Reply {
  pub fn new(data: Vec<u8>) -> Reply {
    Reply {
      address: None,
      data: data,
    }
  }
}

/// Almost every event is answered with a single frame.
pub type Replies = SmallVec<[Reply; 1]>;

/// A single event execution request.
#[derive(Clone, Copy, Debug)]
pub struct Call<'a> {
  /// Routes the call to the node owning this id.
  pub selector: &'a RingId,
  /// In `app@event` form.
  pub event: &'a str,
  pub payload: &'a [u8],
  /// Picks one worker of the application on the selected node. `None` lets the node choose.
  pub worker: Option<u32>,
}

/// The cluster client this crate coordinates through.
///
/// Implementors own discovery, connections, serialization and retries. An implementation must fail
/// a call to an unreachable node within a bounded time rather than hang.
#[async_trait]
pub trait Transport: Send + Sync {
  /// A snapshot of the routing table as the client sees it: unsorted, possibly with duplicates.
  fn routes(&self) -> Vec<(RingId, NodeAddress)>;

  /// Executes an event on one node, or one worker of one node.
  async fn execute(&self, call: Call<'_>) -> Result<Replies, CallError>;
}
