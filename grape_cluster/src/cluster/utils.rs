use crate::core::{Call, CallError, ClusterError, NodeAddress, Replies, RingId, Transport};
use crate::testkit::LogLevel;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::env::var;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;

static CALL_TIMEOUT: Lazy<Option<Duration>> = Lazy::new(|| {
  var("GRAPE_CALL_TIMEOUT_MS")
    .ok()
    .and_then(|x| x.parse().ok())
    .map(Duration::from_millis)
});

static STATS_EVENT: Lazy<Option<String>> =
  Lazy::new(|| var("GRAPE_STATS_EVENT").ok().filter(|x| EventName::from_str(x).is_ok()));

static LOG_LEVEL_OVERRIDE: Lazy<Option<LogLevel>> = Lazy::new(|| {
  var("GRAPE_LOG_LEVEL")
    .ok()
    .and_then(|x| x.parse::<u8>().ok())
    .and_then(|x| LogLevel::try_from(x).ok())
});

/// Configures how a [`Session`](crate::core::Session) talks to the cluster.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
  /// An upper bound on every single call, enforced on top of whatever timeout the transport
  /// applies. A call exceeding it is reported as timed out.
  ///
  /// default: `None`
  pub call_timeout: Option<Duration>,
  /// The event, within the target application, answering with the node's worker pool state.
  ///
  /// default: `"info"`
  pub info_event: String,
  /// The dot-separated path of the worker count inside the info reply.
  ///
  /// default: `"slaves.capacity"`
  pub capacity_path: String,
  /// The event every worker answers with its statistics document.
  ///
  /// default: `"queue@stats"`
  pub stats_event: String,
  /// The threshold of the session logger.
  ///
  /// default: `LogLevel::Warn`
  pub log_level: LogLevel,
  #[serde(skip)]
  x: PhantomData<()>,
}
impl Default for ClusterConfig {
  #[inline]
  fn default() -> Self {
    ClusterConfig {
      call_timeout: None,
      info_event: "info".to_string(),
      capacity_path: "slaves.capacity".to_string(),
      stats_event: "queue@stats".to_string(),
      log_level: LogLevel::Warn,
      x: PhantomData,
    }
  }
}
impl ClusterConfig {
  /// The defaults, overridden by `GRAPE_CALL_TIMEOUT_MS`, `GRAPE_STATS_EVENT` and
  /// `GRAPE_LOG_LEVEL` (a number, 0 for trace up to 6 for off) where they are set and valid.
  pub fn from_env() -> Self {
    let mut cfg = Self::default();
    if let Some(t) = *CALL_TIMEOUT {
      cfg.call_timeout = Some(t);
    }
    if let Some(e) = &*STATS_EVENT {
      cfg.stats_event = e.clone();
    }
    if let Some(l) = *LOG_LEVEL_OVERRIDE {
      cfg.log_level = l;
    }
    cfg
  }
}

/// Executes `call`, bounded by `config.call_timeout` when one is set.
pub(crate) async fn guarded<T: Transport>(
  transport: &T,
  config: &ClusterConfig,
  call: Call<'_>,
) -> Result<Replies, CallError> {
  match config.call_timeout {
    Some(limit) => timeout(limit, transport.execute(call))
      .await
      .unwrap_or(Err(CallError::TimedOut)),
    None => transport.execute(call).await,
  }
}

/// An event name in `app@event` form, split on the first `@`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct EventName {
  pub app: String,
  pub event: String,
}
impl EventName {
  pub fn new(app: &str, event: &str) -> EventName {
    EventName {
      app: app.to_string(),
      event: event.to_string(),
    }
  }
}
impl FromStr for EventName {
  type Err = ClusterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split_once('@') {
      Some((app, event)) if !app.is_empty() && !event.is_empty() => Ok(EventName::new(app, event)),
      _ => Err(ClusterError::BadEventName { name: s.to_string() }),
    }
  }
}
impl fmt::Display for EventName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.app, self.event)
  }
}

/// One worker of an application on one node.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct WorkerTarget {
  pub address: NodeAddress,
  /// An id owned by the node, used to route calls to it.
  pub id: RingId,
  pub worker: u32,
}
impl WorkerTarget {
  pub fn new(address: NodeAddress, id: RingId, worker: u32) -> WorkerTarget {
    WorkerTarget {
      address: address,
      id: id,
      worker: worker,
    }
  }
}
impl fmt::Display for WorkerTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}, worker {}", self.address, self.worker)
  }
}

/// What became of the call to one target.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
  pub target: WorkerTarget,
  pub result: Result<Vec<u8>, ClusterError>,
}

/// A target whose call did not produce a payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
  pub target: WorkerTarget,
  pub error: ClusterError,
}
impl Failure {
  pub fn message(&self) -> String {
    self.error.to_string()
  }
}

/// Every outcome of one fan-out, one per dispatched target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FanoutResult {
  pub outcomes: Vec<Outcome>,
}
impl FanoutResult {
  pub fn len(&self) -> usize {
    self.outcomes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outcomes.is_empty()
  }

  pub fn successes(&self) -> impl Iterator<Item = (&WorkerTarget, &[u8])> {
    self
      .outcomes
      .iter()
      .filter_map(|o| o.result.as_ref().ok().map(|d| (&o.target, d.as_slice())))
  }

  pub fn failures(&self) -> impl Iterator<Item = (&WorkerTarget, &ClusterError)> {
    self
      .outcomes
      .iter()
      .filter_map(|o| o.result.as_ref().err().map(|e| (&o.target, e)))
  }

  /// Splits into the successful payloads and the failure report, both in outcome order.
  pub fn into_parts(self) -> (Vec<(WorkerTarget, Vec<u8>)>, Vec<Failure>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for Outcome { target, result } in self.outcomes {
      match result {
        Ok(data) => ok.push((target, data)),
        Err(error) => failed.push(Failure {
          target: target,
          error: error,
        }),
      }
    }
    (ok, failed)
  }
}

/// The result of running an event on every worker of the cluster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterRun {
  pub result: FanoutResult,
  /// Nodes that could not be enumerated and so received no call.
  pub diagnostics: Vec<ClusterError>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_names() {
    assert_eq!("queue@stats".parse::<EventName>().unwrap(), EventName::new("queue", "stats"));
    assert_eq!(
      "queue@ping@pong".parse::<EventName>().unwrap(),
      EventName::new("queue", "ping@pong")
    );
    assert_eq!(EventName::new("queue", "clear").to_string(), "queue@clear");
    for bad in &["queue", "@stats", "queue@", ""] {
      assert_eq!(
        bad.parse::<EventName>(),
        Err(ClusterError::BadEventName { name: bad.to_string() })
      );
    }
  }

  #[test]
  fn config_serde() {
    let cfg = ClusterConfig {
      call_timeout: Some(Duration::from_millis(250)),
      ..ClusterConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: ClusterConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, back);
    assert_eq!(back.capacity_path, "slaves.capacity");
  }

  #[test]
  fn guard_only_when_configured() {
    use crate::testkit::{FailureConfig, SimulatedCluster};
    let a = NodeAddress::new("a", 1);
    let sim = SimulatedCluster::new()
      .node(a.clone(), &[RingId::from(vec![1])], 1)
      .failures(a, FailureConfig::delayed(Duration::from_millis(200)));
    let id = RingId::from(vec![1]);
    let call = Call {
      selector: &id,
      event: "queue@stats",
      payload: &[],
      worker: Some(0),
    };
    let mut cfg = ClusterConfig::default();
    assert!(tokio_test::block_on(guarded(&sim, &cfg, call)).is_ok());
    cfg.call_timeout = Some(Duration::from_millis(20));
    assert_eq!(tokio_test::block_on(guarded(&sim, &cfg, call)), Err(CallError::TimedOut));
  }

  #[test]
  fn into_parts_keeps_order() {
    let t = |w| WorkerTarget::new(NodeAddress::new("a", 1), RingId::from(vec![1]), w);
    let res = FanoutResult {
      outcomes: vec![
        Outcome { target: t(0), result: Ok(b"x".to_vec()) },
        Outcome { target: t(1), result: Err(ClusterError::EmptyReply { target: t(1) }) },
        Outcome { target: t(2), result: Ok(b"y".to_vec()) },
      ],
    };
    assert_eq!(res.successes().count(), 2);
    assert_eq!(res.failures().count(), 1);
    let (ok, failed) = res.into_parts();
    assert_eq!(ok, vec![(t(0), b"x".to_vec()), (t(2), b"y".to_vec())]);
    assert_eq!(failed[0].message(), "a:1, worker 1: empty reply");
  }
}
