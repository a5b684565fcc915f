use crate::cluster::utils::guarded;
use crate::cluster::{ClusterConfig, RoutingTable, WorkerTarget, LOG_LEVEL};
use crate::core::{Call, ClusterError, NodeAddress, RingId, Transport};
use crate::stats::MetricDocument;
use crate::testkit::Logger;
use crate::{debug, warn};
use futures::future::join_all;
use std::convert::TryFrom;

/// The worker targets of one application, and the nodes that could not be asked for theirs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Enumeration {
  pub targets: Vec<WorkerTarget>,
  pub failures: Vec<ClusterError>,
}

/// Expands the nodes of a [`RoutingTable`] into one [`WorkerTarget`] per application worker.
pub struct WorkerEnumerator<'a, T: Transport> {
  transport: &'a T,
  config: &'a ClusterConfig,
  logger: &'a Logger,
}
impl<'a, T: Transport> WorkerEnumerator<'a, T> {
  pub fn new(transport: &'a T, config: &'a ClusterConfig, logger: &'a Logger) -> Self {
    WorkerEnumerator {
      transport: transport,
      config: config,
      logger: logger,
    }
  }

  /// Asks one node how many workers `app` runs there.
  pub async fn worker_capacity(
    &self,
    node: &NodeAddress,
    id: &RingId,
    app: &str,
  ) -> Result<u32, ClusterError> {
    let event = format!("{}@{}", app, self.config.info_event);
    let call = Call {
      selector: id,
      event: &event,
      payload: &[],
      worker: None,
    };
    let replies = guarded(self.transport, self.config, call)
      .await
      .map_err(|cause| ClusterError::CapacityQueryFailed {
        node: node.clone(),
        cause: cause,
      })?;
    let malformed = || ClusterError::MalformedCapacityReply { node: node.clone() };
    let reply = replies.into_iter().next().ok_or_else(malformed)?;
    let doc = MetricDocument::parse(&reply.data).map_err(|_| malformed())?;
    doc
      .get_u64(&self.config.capacity_path)
      .and_then(|c| u32::try_from(c).ok())
      .ok_or_else(malformed)
  }

  /// Every worker of `app` on every node of `table`. Nodes are asked concurrently. A node that
  /// cannot be asked contributes no target and one failure.
  pub async fn enumerate(&self, table: &RoutingTable, app: &str) -> Enumeration {
    let nodes = table.nodes();
    let capacities = join_all(
      nodes
        .iter()
        .map(|(address, id)| self.worker_capacity(address, id, app)),
    )
    .await;
    let mut res = Enumeration::default();
    for ((address, id), capacity) in nodes.into_iter().zip(capacities) {
      match capacity {
        Ok(n) => {
          debug!(
            LOG_LEVEL,
            self.logger,
            format!("{} runs {} workers of {}", address, n, app)
          );
          res
            .targets
            .extend((0..n).map(|w| WorkerTarget::new(address.clone(), id.clone(), w)));
        }
        Err(e) => {
          warn!(LOG_LEVEL, self.logger, e.to_string());
          res.failures.push(e);
        }
      }
    }
    res
  }
}
