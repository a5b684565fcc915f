use crossbeam::channel::{unbounded, Receiver, Sender};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(
  Clone, Copy, Debug, Deserialize, Eq, PartialEq, PartialOrd, Ord, Serialize, TryFromPrimitive,
)]
#[repr(u8)]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
  Fatal,
  Off,
}
impl LogLevel {
  pub const MIN: LogLevel = LogLevel::Trace;
}

/// Emits log records as `tracing` events, dropping those below its threshold.
///
/// A capturing logger also hands every record it emits to a channel, which is how tests observe
/// what the coordination code reported.
pub struct Logger {
  level: AtomicU8,
  capture: Option<Sender<(LogLevel, String)>>,
}
impl Logger {
  pub fn new(level: LogLevel) -> Self {
    Logger {
      level: AtomicU8::new(level as u8),
      capture: None,
    }
  }

  pub fn capturing(level: LogLevel) -> (Self, Receiver<(LogLevel, String)>) {
    let (tx, rx) = unbounded();
    let logger = Logger {
      level: AtomicU8::new(level as u8),
      capture: Some(tx),
    };
    (logger, rx)
  }

  pub fn level(&self) -> LogLevel {
    LogLevel::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Off)
  }

  pub fn set_level(&self, level: LogLevel) {
    self.level.store(level as u8, Ordering::Relaxed);
  }

  pub fn log(&self, level: LogLevel, msg: &dyn Display) {
    if level == LogLevel::Off || level < self.level() {
      return;
    }
    match level {
      LogLevel::Trace => tracing::trace!("{}", msg),
      LogLevel::Debug => tracing::debug!("{}", msg),
      LogLevel::Info => tracing::info!("{}", msg),
      LogLevel::Warn => tracing::warn!("{}", msg),
      LogLevel::Error | LogLevel::Fatal => tracing::error!("{}", msg),
      LogLevel::Off => {}
    }
    if let Some(tx) = &self.capture {
      // The receiving test may already be gone.
      let _ = tx.send((level, msg.to_string()));
    }
  }
}
impl Default for Logger {
  fn default() -> Self {
    Logger::new(LogLevel::Warn)
  }
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
  ($at:expr, $level:expr, $logger:expr, $msg:expr) => {
    if $at >= $level {
      ($logger).log($at, &$msg)
    }
  };
}

#[macro_export]
macro_rules! trace {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Trace, $level, $logger, $msg)
  };
}

#[macro_export]
macro_rules! debug {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Debug, $level, $logger, $msg)
  };
}

#[macro_export]
macro_rules! info {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Info, $level, $logger, $msg)
  };
}

#[macro_export]
macro_rules! warn {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Warn, $level, $logger, $msg)
  };
}

#[macro_export]
macro_rules! error {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Error, $level, $logger, $msg)
  };
}

#[macro_export]
macro_rules! fatal {
  ($level:expr, $logger:expr, $msg:expr) => {
    $crate::log_at!($crate::testkit::LogLevel::Fatal, $level, $logger, $msg)
  };
}
