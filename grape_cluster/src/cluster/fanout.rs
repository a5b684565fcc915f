use crate::cluster::utils::guarded;
use crate::cluster::{ClusterConfig, EventName, FanoutResult, Outcome, WorkerTarget, LOG_LEVEL};
use crate::core::{Call, ClusterError, Transport};
use crate::testkit::Logger;
use crate::{error, trace};
use futures::stream::{FuturesUnordered, StreamExt};

/// Runs one event on many workers at once.
pub struct FanoutExecutor<'a, T: Transport> {
  transport: &'a T,
  config: &'a ClusterConfig,
  logger: &'a Logger,
}
impl<'a, T: Transport> FanoutExecutor<'a, T> {
  pub fn new(transport: &'a T, config: &'a ClusterConfig, logger: &'a Logger) -> Self {
    FanoutExecutor {
      transport: transport,
      config: config,
      logger: logger,
    }
  }

  /// Sends `event` to every target and waits for all of them.
  ///
  /// Every call is issued before any is awaited, and a failing call never holds up or cancels the
  /// others. The result has exactly one outcome per target. If `ordered`, outcomes are sorted by
  /// node address, then worker index. Otherwise they come in the order the calls finished.
  ///
  /// Addresses compare by host, then port. Every DNS host sorts before every IP host, and IP hosts
  /// compare numerically rather than as text.
  pub async fn dispatch(
    &self,
    mut targets: Vec<WorkerTarget>,
    event: &EventName,
    payload: &[u8],
    ordered: bool,
  ) -> FanoutResult {
    if ordered {
      targets.sort_by(|a, b| (&a.address, a.worker).cmp(&(&b.address, b.worker)));
    }
    let event = event.to_string();
    let event = event.as_str();
    let n = targets.len();

    let mut pending = targets
      .into_iter()
      .enumerate()
      .map(move |(i, target)| async move {
        let result = self.call(&target, event, payload).await;
        (i, Outcome { target, result })
      })
      .collect::<FuturesUnordered<_>>();

    // Outcomes land in the slot of their target, regardless of when they finish.
    let mut slots: Vec<Option<Outcome>> = Vec::new();
    if ordered {
      slots.resize_with(n, || None);
    }
    let mut outcomes = Vec::with_capacity(n);
    while let Some((i, outcome)) = pending.next().await {
      if let Err(e) = &outcome.result {
        error!(LOG_LEVEL, self.logger, e.to_string());
      }
      if ordered {
        slots[i] = Some(outcome);
      } else {
        outcomes.push(outcome);
      }
    }
    if ordered {
      outcomes.extend(slots.into_iter().flatten());
    }
    trace!(
      LOG_LEVEL,
      self.logger,
      format!("{}: {} outcomes from {} targets", event, outcomes.len(), n)
    );
    FanoutResult { outcomes: outcomes }
  }

  async fn call(
    &self,
    target: &WorkerTarget,
    event: &str,
    payload: &[u8],
  ) -> Result<Vec<u8>, ClusterError> {
    let call = Call {
      selector: &target.id,
      event: event,
      payload: payload,
      worker: Some(target.worker),
    };
    let replies = guarded(self.transport, self.config, call)
      .await
      .map_err(|cause| ClusterError::TransportError {
        target: target.clone(),
        cause: cause,
      })?;
    replies
      .into_iter()
      .next()
      .map(|r| r.data)
      .ok_or_else(|| ClusterError::EmptyReply { target: target.clone() })
  }
}
