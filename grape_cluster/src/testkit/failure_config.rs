use crate::core::NodeAddress;
use im::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env::var;
use std::time::Duration;

pub static PACKET_DROP: Lazy<f64> = Lazy::new(|| {
  var("GRAPE_PACKET_DROP")
    .map(|x| x.parse().ok())
    .ok()
    .flatten()
    .unwrap_or(0.0)
});

pub static DELAY: Lazy<Option<(Duration, Duration)>> = Lazy::new(|| {
  var("GRAPE_MIN_DELAY")
    .map(|x| x.parse().ok().map(Duration::from_millis))
    .ok()
    .flatten()
    .zip(
      var("GRAPE_MAX_DELAY")
        .map(|x| x.parse().ok().map(Duration::from_millis))
        .ok()
        .flatten(),
    )
    .filter(|(x, y)| x <= y)
});

/// How unreliable calls to a simulated node are.
#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FailureConfig {
  /// Probability in `[0, 1]` that a call is lost.
  pub drop_prob: f64,
  /// A call is delayed by a uniformly chosen duration in this range before it is answered.
  pub delay: Option<(Duration, Duration)>,
}
impl FailureConfig {
  /// Reads `GRAPE_PACKET_DROP`, `GRAPE_MIN_DELAY` and `GRAPE_MAX_DELAY` (milliseconds).
  pub fn from_env() -> Self {
    FailureConfig {
      drop_prob: *PACKET_DROP,
      delay: *DELAY,
    }
  }

  /// Delays every call by exactly `dur`.
  pub fn delayed(dur: Duration) -> Self {
    FailureConfig {
      drop_prob: 0.0,
      delay: Some((dur, dur)),
    }
  }

  pub fn dropping(prob: f64) -> Self {
    FailureConfig {
      drop_prob: prob,
      delay: None,
    }
  }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct FailureConfigMap {
  pub cluster_wide: FailureConfig,
  pub node_wide: HashMap<NodeAddress, FailureConfig>,
}
impl FailureConfigMap {
  pub fn get(&self, node: &NodeAddress) -> &FailureConfig {
    self.node_wide.get(node).unwrap_or(&self.cluster_wide)
  }
}

#[test]
fn node_wide_overrides_cluster_wide() {
  let mut map = FailureConfigMap::default();
  map.cluster_wide = FailureConfig::dropping(0.5);
  map
    .node_wide
    .insert(NodeAddress::new("a", 1), FailureConfig::delayed(Duration::from_millis(7)));
  assert_eq!(map.get(&NodeAddress::new("b", 1)).drop_prob, 0.5);
  assert_eq!(
    map.get(&NodeAddress::new("a", 1)).delay,
    Some((Duration::from_millis(7), Duration::from_millis(7)))
  );
}
