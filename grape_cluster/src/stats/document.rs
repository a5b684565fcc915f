use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::iter::FromIterator;

/// A statistics document as reported by one worker: labels mapped to values, in the order the
/// worker wrote them.
///
/// Nothing about the contents is assumed up front. Accessors return `None` when a field is missing
/// or has the wrong shape, and the caller decides what that means.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricDocument(LinkedHashMap<String, Value>);
impl MetricDocument {
  /// Parses a JSON object.
  pub fn parse(data: &[u8]) -> serde_json::Result<MetricDocument> {
    serde_json::from_slice(data)
  }

  pub fn get(&self, label: &str) -> Option<&Value> {
    self.0.get(label)
  }

  /// Follows a dot-separated path through nested objects, e.g. `slaves.capacity`.
  pub fn get_path(&self, path: &str) -> Option<&Value> {
    let mut parts = path.split('.');
    let first = self.0.get(parts.next()?)?;
    parts.try_fold(first, |node, part| node.as_object()?.get(part))
  }

  pub fn get_u64(&self, path: &str) -> Option<u64> {
    self.get_path(path)?.as_u64()
  }

  pub fn get_f64(&self, path: &str) -> Option<f64> {
    self.get_path(path)?.as_f64()
  }

  pub fn get_str(&self, path: &str) -> Option<&str> {
    self.get_path(path)?.as_str()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}
impl FromIterator<(String, Value)> for MetricDocument {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    MetricDocument(iter.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn keeps_key_order() {
    let doc = MetricDocument::parse(br#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
    let keys = doc.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
  }

  #[test]
  fn typed_paths() {
    let doc =
      MetricDocument::parse(br#"{"slaves": {"capacity": 4, "name": "q"}, "push.count": 7}"#)
        .unwrap();
    assert_eq!(doc.get_u64("slaves.capacity"), Some(4));
    assert_eq!(doc.get_str("slaves.name"), Some("q"));
    assert_eq!(doc.get("push.count"), Some(&json!(7)));
    assert_eq!(doc.get_u64("slaves.missing"), None);
    assert_eq!(doc.get_u64("slaves.name"), None);
    assert_eq!(doc.get_u64("push.count.deeper"), None);
    assert_eq!(doc.get_f64("slaves.capacity"), Some(4.0));
  }

  #[test]
  fn rejects_non_objects() {
    assert!(MetricDocument::parse(b"[1, 2]").is_err());
    assert!(MetricDocument::parse(b"not json").is_err());
    assert!(MetricDocument::parse(b"").is_err());
  }
}
