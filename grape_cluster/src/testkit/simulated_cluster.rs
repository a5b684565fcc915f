use crate::cluster::RoutingTable;
use crate::core::{Call, CallError, NodeAddress, Replies, Reply, RingId, Transport};
use crate::testkit::{FailureConfig, FailureConfigMap};
use async_trait::async_trait;
use crossbeam::channel::{unbounded, Receiver, Sender};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::smallvec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// How a simulated node answers the worker pool query.
#[derive(Clone, Debug)]
pub enum InfoBehavior {
  Capacity(u32),
  /// Answers with these bytes verbatim.
  Raw(Vec<u8>),
  Empty,
  Fail(String),
}

/// How one simulated worker answers an event.
#[derive(Clone, Debug)]
pub enum WorkerBehavior {
  Reply(Vec<u8>),
  Empty,
  Fail(String),
}

/// A call received by a [`SimulatedCluster`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
  pub address: NodeAddress,
  pub event: String,
  pub payload: Vec<u8>,
  pub worker: Option<u32>,
}

struct SimNode {
  info: InfoBehavior,
  workers: HashMap<u32, WorkerBehavior>,
}

/// An in-memory [`Transport`] standing in for a real cluster.
///
/// Calls are routed through the simulated ring exactly as a client would route them. Unless told
/// otherwise, a worker answers with `<address>#<worker>`.
pub struct SimulatedCluster {
  routes: Vec<(RingId, NodeAddress)>,
  nodes: HashMap<NodeAddress, SimNode>,
  fail_map: FailureConfigMap,
  calls_tx: Sender<CallRecord>,
  calls_rx: Receiver<CallRecord>,
  in_flight: AtomicUsize,
  max_in_flight: AtomicUsize,
}
impl SimulatedCluster {
  pub fn new() -> Self {
    let (tx, rx) = unbounded();
    SimulatedCluster {
      routes: Vec::new(),
      nodes: HashMap::new(),
      fail_map: FailureConfigMap {
        cluster_wide: FailureConfig::from_env(),
        ..FailureConfigMap::default()
      },
      calls_tx: tx,
      calls_rx: rx,
      in_flight: AtomicUsize::new(0),
      max_in_flight: AtomicUsize::new(0),
    }
  }

  /// Adds a node owning `ids`, with `capacity` workers.
  pub fn node(self, address: NodeAddress, ids: &[RingId], capacity: u32) -> Self {
    self.place(address, ids, InfoBehavior::Capacity(capacity))
  }

  /// Adds a node whose worker pool query is answered by `info`.
  pub fn place(mut self, address: NodeAddress, ids: &[RingId], info: InfoBehavior) -> Self {
    for id in ids {
      self.routes.push((id.clone(), address.clone()));
    }
    self.nodes.insert(
      address,
      SimNode {
        info: info,
        workers: HashMap::new(),
      },
    );
    self
  }

  /// Lists a route to a node that does not exist. Calls routed to it fail.
  pub fn phantom_route(mut self, id: RingId, address: NodeAddress) -> Self {
    self.routes.push((id, address));
    self
  }

  pub fn worker(mut self, address: &NodeAddress, worker: u32, behavior: WorkerBehavior) -> Self {
    if let Some(node) = self.nodes.get_mut(address) {
      node.workers.insert(worker, behavior);
    }
    self
  }

  pub fn failures(mut self, address: NodeAddress, cfg: FailureConfig) -> Self {
    self.fail_map.node_wide.insert(address, cfg);
    self
  }

  pub fn cluster_failures(mut self, cfg: FailureConfig) -> Self {
    self.fail_map.cluster_wide = cfg;
    self
  }

  /// The calls received since the last time this was asked.
  pub fn calls(&self) -> Vec<CallRecord> {
    self.calls_rx.try_iter().collect()
  }

  /// The most calls that were ever in progress at once.
  pub fn max_in_flight(&self) -> usize {
    self.max_in_flight.load(Ordering::SeqCst)
  }

  fn answer(&self, address: &NodeAddress, call: &Call<'_>) -> Result<Replies, CallError> {
    let node = self
      .nodes
      .get(address)
      .ok_or_else(|| CallError::Failed(format!("{} is unreachable", address)))?;
    let frame = |data: Vec<u8>| {
      let mut reply = Reply::new(data);
      reply.address = Some(address.clone());
      reply
    };
    match call.worker {
      None => match &node.info {
        InfoBehavior::Capacity(n) => {
          let doc = format!("{{\"slaves\":{{\"capacity\":{}}}}}", n);
          Ok(smallvec![frame(doc.into_bytes())])
        }
        InfoBehavior::Raw(data) => Ok(smallvec![frame(data.clone())]),
        InfoBehavior::Empty => Ok(Replies::new()),
        InfoBehavior::Fail(msg) => Err(CallError::Failed(msg.clone())),
      },
      Some(w) => match node.workers.get(&w) {
        Some(WorkerBehavior::Reply(data)) => Ok(smallvec![frame(data.clone())]),
        Some(WorkerBehavior::Empty) => Ok(Replies::new()),
        Some(WorkerBehavior::Fail(msg)) => Err(CallError::Failed(msg.clone())),
        None => Ok(smallvec![frame(format!("{}#{}", address, w).into_bytes())]),
      },
    }
  }
}
impl Default for SimulatedCluster {
  fn default() -> Self {
    Self::new()
  }
}

struct InFlight<'a>(&'a AtomicUsize);
impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl Transport for SimulatedCluster {
  fn routes(&self) -> Vec<(RingId, NodeAddress)> {
    self.routes.clone()
  }

  async fn execute(&self, call: Call<'_>) -> Result<Replies, CallError> {
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    let _guard = InFlight(&self.in_flight);

    let address = RoutingTable::new(self.routes.clone())
      .resolve(call.selector)
      .map(|e| e.address.clone())
      .map_err(|e| CallError::Failed(e.to_string()))?;
    let _ = self.calls_tx.send(CallRecord {
      address: address.clone(),
      event: call.event.to_string(),
      payload: call.payload.to_vec(),
      worker: call.worker,
    });

    let fail_cfg = *self.fail_map.get(&address);
    let dur = fail_cfg.delay.map(|(min, max)| {
      let range = min.as_millis()..=max.as_millis();
      Duration::from_millis(SmallRng::from_entropy().gen_range(range) as u64)
    });
    // Decide before sleeping, the thread rng cannot be held across an await.
    let dropped = rand::random::<f64>() < fail_cfg.drop_prob;
    if let Some(dur) = dur {
      sleep(dur).await;
    }
    if dropped {
      return Err(CallError::Failed(format!("call to {} was dropped", address)));
    }
    self.answer(&address, &call)
  }
}
