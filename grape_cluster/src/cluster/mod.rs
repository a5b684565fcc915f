//! Locate the nodes of a cluster and reach every worker they run.
//!
//! The cluster is a ring of ids. Each node owns one or more points of the ring, and is responsible
//! for the span from each of its points up to the next point owned by anyone. The span below the
//! smallest point belongs to the owner of the largest one. A [`RoutingTable`] is an immutable
//! snapshot of that ring: it answers which node owns an id, and lists the nodes it knows.
//!
//! ### Reaching every worker
//! An application on a node runs a pool of workers, and a call can be aimed at one of them by
//! index. Running an event cluster-wide happens in two steps:
//!
//! 1. A [`WorkerEnumerator`] asks every node in the table how many workers the application has
//!    there, and expands the answers into [`WorkerTarget`]s. A node that cannot answer is left out
//!    and reported.
//! 2. A [`FanoutExecutor`] issues one call per target, all at once, then gathers the replies. Each
//!    target yields exactly one [`Outcome`]. A failed call is recorded and logged, never retried,
//!    and does not disturb the other calls.
//!
//! With ordering requested, outcomes are sorted by node address, then worker index, so the same
//! topology always produces the same sequence. Otherwise they arrive in completion order.
//!
//! ```ignore
//! let table = RoutingTable::new(transport.routes());
//! let cfg = ClusterConfig::default();
//! let logger = Logger::default();
//! let found = WorkerEnumerator::new(&transport, &cfg, &logger).enumerate(&table, "queue").await;
//! let event = "queue@stats".parse()?;
//! let res = FanoutExecutor::new(&transport, &cfg, &logger)
//!   .dispatch(found.targets, &event, b"", true)
//!   .await;
//! ```

use crate::testkit::LogLevel;
mod enumerator;
mod fanout;
mod routing_table;
mod utils;

pub const LOG_LEVEL: LogLevel = LogLevel::Debug;

#[rustfmt::skip]
pub use {
  enumerator::Enumeration,
  enumerator::WorkerEnumerator,
  fanout::FanoutExecutor,
  routing_table::RouteEntry,
  routing_table::RoutingTable,
  utils::ClusterConfig,
  utils::ClusterRun,
  utils::EventName,
  utils::Failure,
  utils::FanoutResult,
  utils::Outcome,
  utils::WorkerTarget,
};
