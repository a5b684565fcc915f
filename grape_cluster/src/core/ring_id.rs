use crate::core::ClusterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of bytes in a full ring identifier.
pub const RING_ID_SIZE: usize = 64;

/// A point on the cluster ring.
///
/// Identifiers compare byte by byte, big-endian, which is the order of the ring. A shorter
/// identifier compares as a prefix, so a truncated id can be used as a lookup key and lands on the
/// same owner as any full id starting with those bytes, barring an exact boundary match.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub struct RingId(Vec<u8>);
impl RingId {
  pub fn new(bytes: Vec<u8>) -> RingId {
    RingId(bytes)
  }

  /// Parses a hexadecimal id or a prefix of one. An odd number of digits is completed with a
  /// trailing `0`, as hex text must describe whole bytes.
  pub fn from_hex(s: &str) -> Result<RingId, ClusterError> {
    let s = s.trim();
    let padded = if s.len() % 2 != 0 {
      format!("{}0", s)
    } else {
      s.to_string()
    };
    if padded.is_empty() || padded.len() > RING_ID_SIZE * 2 {
      return Err(ClusterError::InvalidRingId { input: s.to_string() });
    }
    hex::decode(&padded)
      .map(RingId)
      .map_err(|_| ClusterError::InvalidRingId { input: s.to_string() })
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}
impl From<Vec<u8>> for RingId {
  fn from(bytes: Vec<u8>) -> Self {
    RingId(bytes)
  }
}
impl From<&[u8]> for RingId {
  fn from(bytes: &[u8]) -> Self {
    RingId(bytes.to_vec())
  }
}
impl FromStr for RingId {
  type Err = ClusterError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    RingId::from_hex(s)
  }
}
impl fmt::Display for RingId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", hex::encode(&self.0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_round_trip_lowercase() {
    let id = RingId::from_hex("00FFa0").unwrap();
    assert_eq!(id.as_bytes(), &[0x00, 0xff, 0xa0]);
    assert_eq!(id.to_string(), "00ffa0");
  }

  #[test]
  fn odd_length_is_padded() {
    assert_eq!(RingId::from_hex("abc").unwrap().as_bytes(), &[0xab, 0xc0]);
    assert_eq!(RingId::from_hex("5").unwrap().as_bytes(), &[0x50]);
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(
      RingId::from_hex("zz"),
      Err(ClusterError::InvalidRingId { .. })
    ));
    assert!(RingId::from_hex("").is_err());
    assert!(RingId::from_hex(&"0".repeat(RING_ID_SIZE * 2 + 2)).is_err());
  }

  #[test]
  fn big_endian_order_with_prefixes() {
    let a = RingId::from(vec![0x10, 0xff]);
    let b = RingId::from(vec![0x11]);
    let c = RingId::from(vec![0x11, 0x00]);
    assert!(a < b);
    assert!(b < c);
  }
}
