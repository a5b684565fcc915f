use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The DNS name or IP address of the machine hosting a cluster node.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub enum Host {
  DNS(String),
  IP(IpAddr),
}
impl From<String> for Host {
  fn from(s: String) -> Self {
    match IpAddr::from_str(s.as_str()) {
      Ok(ip) => Host::IP(ip),
      Err(_) => Host::DNS(s),
    }
  }
}
impl From<&str> for Host {
  fn from(s: &str) -> Self {
    Host::from(s.to_string())
  }
}
impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Host::DNS(s) => write!(f, "{}", s),
      Host::IP(ip) => write!(f, "{}", ip),
    }
  }
}

/// The address a cluster node serves requests on. Two addresses are the same node exactly when
/// host and port agree.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, Ord, PartialOrd)]
pub struct NodeAddress {
  /// The DNS name or IP address of the machine hosting the node.
  pub host: Host,
  /// The port the node receives on.
  pub port: u16,
}
impl NodeAddress {
  /// Creates a new [`NodeAddress`]
  pub fn new<H: Into<Host>>(host: H, port: u16) -> NodeAddress {
    NodeAddress {
      host: host.into(),
      port: port,
    }
  }
}
impl fmt::Display for NodeAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.host, self.port)
  }
}
impl FromStr for NodeAddress {
  type Err = String;

  /// Parses `host:port`. The port is taken after the last colon.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (host, port) = s
      .rsplit_once(':')
      .ok_or_else(|| format!("missing port in address {:?}", s))?;
    if host.is_empty() {
      return Err(format!("missing host in address {:?}", s));
    }
    let port = port
      .parse::<u16>()
      .map_err(|e| format!("bad port in address {:?}: {}", s, e))?;
    Ok(NodeAddress::new(host, port))
  }
}
