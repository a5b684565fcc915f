use crate::cluster::{
  ClusterConfig, ClusterRun, EventName, FanoutExecutor, RoutingTable, WorkerEnumerator,
  WorkerTarget,
};
use crate::core::{ClusterError, NodeAddress, RingId, Transport, LOG_LEVEL};
use crate::stats::{aggregate, AggregateRow, MetricDocument, Policy};
use crate::testkit::Logger;
use crate::{info, warn};

/// Owns the client of one cluster, and the configuration every session on it shares.
pub struct Connection<T: Transport> {
  transport: T,
  config: ClusterConfig,
  logger: Logger,
}
impl<T: Transport> Connection<T> {
  pub fn new(transport: T, config: ClusterConfig) -> Self {
    let logger = Logger::new(config.log_level);
    Connection {
      transport: transport,
      config: config,
      logger: logger,
    }
  }

  /// Replaces the logger built from `config.log_level`, e.g. with a capturing one.
  pub fn with_logger(mut self, logger: Logger) -> Self {
    self.logger = logger;
    self
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn config(&self) -> &ClusterConfig {
    &self.config
  }

  pub fn logger(&self) -> &Logger {
    &self.logger
  }

  /// Starts a session. It borrows the connection, so it cannot outlive it.
  pub fn session(&self) -> Session<'_, T> {
    Session { conn: self }
  }
}

/// The statistics of every worker that answered, and what went wrong with the rest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
  pub documents: Vec<MetricDocument>,
  /// The worker behind each document, index for index.
  pub sources: Vec<WorkerTarget>,
  pub diagnostics: Vec<ClusterError>,
}
impl Stats {
  pub fn aggregate<S: AsRef<str>>(&self, plan: &[(S, Policy)]) -> Vec<AggregateRow> {
    aggregate(plan, &self.documents)
  }
}

/// Requests against the cluster behind one [`Connection`].
pub struct Session<'c, T: Transport> {
  conn: &'c Connection<T>,
}
impl<'c, T: Transport> Session<'c, T> {
  /// A fresh snapshot of the ring as the client currently sees it.
  pub fn routing_table(&self) -> RoutingTable {
    RoutingTable::new(self.conn.transport.routes())
  }

  /// The node owning `id`, and the ring id it owns it through.
  pub fn resolve(
    &self,
    table: &RoutingTable,
    id: &RingId,
  ) -> Result<(NodeAddress, RingId), ClusterError> {
    let entry = table.resolve(id)?;
    Ok((entry.address.clone(), entry.id.clone()))
  }

  /// Like [`resolve`](Session::resolve), with the id given in hex.
  pub fn resolve_hex(
    &self,
    table: &RoutingTable,
    id: &str,
  ) -> Result<(NodeAddress, RingId), ClusterError> {
    self.resolve(table, &RingId::from_hex(id)?)
  }

  /// Runs `event`, in `app@event` form, on every worker of `app` across the cluster.
  ///
  /// A malformed event name or an empty table fails the whole request before any call is made.
  /// Anything else that goes wrong is confined to the node or worker it happened to: nodes that
  /// could not be enumerated end up in the diagnostics, failed workers in the outcomes.
  pub async fn exec_on_all_workers(
    &self,
    table: &RoutingTable,
    event: &str,
    payload: Option<&[u8]>,
    ordered: bool,
  ) -> Result<ClusterRun, ClusterError> {
    let event = event.parse::<EventName>()?;
    if table.is_empty() {
      return Err(ClusterError::EmptyTopology);
    }
    let conn = self.conn;
    let found = WorkerEnumerator::new(&conn.transport, &conn.config, &conn.logger)
      .enumerate(table, &event.app)
      .await;
    info!(
      LOG_LEVEL,
      conn.logger,
      format!(
        "{}: {} targets on {} nodes",
        event,
        found.targets.len(),
        table.addresses().len()
      )
    );
    let result = FanoutExecutor::new(&conn.transport, &conn.config, &conn.logger)
      .dispatch(found.targets, &event, payload.unwrap_or(&[]), ordered)
      .await;
    Ok(ClusterRun {
      result: result,
      diagnostics: found.failures,
    })
  }

  /// Collects the statistics document of every worker, in address then worker order.
  ///
  /// Payloads that are not documents are logged and skipped. They show up in the diagnostics
  /// along with failed calls and nodes that could not be enumerated.
  pub async fn get_stats(&self, table: &RoutingTable) -> Result<Stats, ClusterError> {
    let run = self
      .exec_on_all_workers(table, &self.conn.config.stats_event, None, true)
      .await?;
    let (ok, failed) = run.result.into_parts();
    let mut stats = Stats {
      diagnostics: run.diagnostics,
      ..Stats::default()
    };
    stats.diagnostics.extend(failed.into_iter().map(|f| f.error));
    for (target, data) in ok {
      match MetricDocument::parse(&data) {
        Ok(doc) => {
          stats.documents.push(doc);
          stats.sources.push(target);
        }
        Err(e) => {
          let err = ClusterError::ParseError { target: target };
          warn!(LOG_LEVEL, self.conn.logger, format!("{} ({})", err, e));
          stats.diagnostics.push(err);
        }
      }
    }
    Ok(stats)
  }
}
