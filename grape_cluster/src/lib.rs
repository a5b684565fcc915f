//! Coordination for a cluster of nodes arranged on a ring of ids.
//!
//! Given a client able to route a call to the node owning an id, this crate resolves ids against a
//! snapshot of the ring, runs one event on every worker of an application across the cluster, and
//! reduces the statistics documents the workers report into a single table.
//!
//! - [`core`]: addresses, ids, errors, the [`Transport`](core::Transport) seam, and sessions.
//! - [`cluster`]: the routing table, worker enumeration and fan-out.
//! - [`stats`]: statistics documents, aggregation policies and rendering.
//! - [`testkit`]: logging, failure injection and an in-memory cluster.

pub mod cluster;
pub mod core;
pub mod stats;
pub mod testkit;
