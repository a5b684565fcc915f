//! Tools for exercising coordination code without a cluster: the logger every component reports
//! through, failure injection, and an in-memory [`Transport`](crate::core::Transport).

mod failure_config;
mod logging;
mod simulated_cluster;

#[rustfmt::skip]
pub use {
  failure_config::FailureConfig,
  failure_config::FailureConfigMap,
  failure_config::DELAY,
  failure_config::PACKET_DROP,
  logging::Logger,
  logging::LogLevel,
  simulated_cluster::CallRecord,
  simulated_cluster::InfoBehavior,
  simulated_cluster::SimulatedCluster,
  simulated_cluster::WorkerBehavior,
};
