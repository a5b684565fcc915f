//! The vocabulary shared by everything else: node addresses, ring ids, errors, and the
//! [`Transport`] the cluster is reached through.
//!
//! A [`Connection`] owns a transport and hands out [`Session`]s, which run the cluster-wide
//! requests: resolving an id, executing an event on every worker, and gathering statistics.

use crate::testkit::LogLevel;
mod connection;
mod errors;
mod remoting;
mod ring_id;
mod transport;

pub const LOG_LEVEL: LogLevel = LogLevel::Debug;

#[rustfmt::skip]
pub use {
  connection::Connection,
  connection::Session,
  connection::Stats,
  errors::CallError,
  errors::ClusterError,
  remoting::Host,
  remoting::NodeAddress,
  ring_id::RingId,
  ring_id::RING_ID_SIZE,
  transport::Call,
  transport::Replies,
  transport::Reply,
  transport::Transport,
};
