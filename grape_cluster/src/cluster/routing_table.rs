use crate::core::{ClusterError, NodeAddress, RingId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The node owning one point of the ring.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RouteEntry {
  pub id: RingId,
  pub address: NodeAddress,
}

/// An immutable view of the cluster ring.
///
/// Entries are sorted by id, with one entry per id. The ring is circular: each entry owns the span
/// from its own id up to the next one, and the entry with the largest id also owns everything
/// below the smallest id. A refreshed topology is a new table, never a mutation of an existing
/// one, so targets computed from one table stay consistent for the length of an operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingTable {
  entries: Vec<RouteEntry>,
}
impl RoutingTable {
  /// Builds the table from a raw snapshot. When several pairs share an id, the first one listed
  /// wins.
  pub fn new<I>(routes: I) -> RoutingTable
  where
    I: IntoIterator<Item = (RingId, NodeAddress)>,
  {
    let entries = routes
      .into_iter()
      .map(|(id, address)| RouteEntry {
        id: id,
        address: address,
      })
      // sorted_by is stable, so the first duplicate stays in front of the others
      .sorted_by(|a, b| a.id.cmp(&b.id))
      .dedup_by(|a, b| a.id == b.id)
      .collect();
    RoutingTable { entries: entries }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Finds the entry responsible for `id`: the rightmost entry whose id is less than or equal to
  /// it, wrapping to the last entry when `id` is below every entry.
  pub fn resolve(&self, id: &RingId) -> Result<&RouteEntry, ClusterError> {
    let i = self.entries.partition_point(|e| &e.id <= id);
    match i {
      0 => self.entries.last().ok_or(ClusterError::EmptyTopology),
      i => Ok(&self.entries[i - 1]),
    }
  }

  pub fn entries(&self) -> &[RouteEntry] {
    &self.entries
  }

  pub fn addresses(&self) -> im::OrdSet<NodeAddress> {
    self.entries.iter().map(|e| e.address.clone()).collect()
  }

  pub fn ids(&self) -> im::OrdSet<RingId> {
    self.entries.iter().map(|e| e.id.clone()).collect()
  }

  pub fn pairs_sorted_by_id(&self) -> Vec<(NodeAddress, RingId)> {
    self
      .entries
      .iter()
      .map(|e| (e.address.clone(), e.id.clone()))
      .collect()
  }

  /// One entry per distinct node, with the smallest id the node owns, sorted by that id. Calls
  /// addressed with that id land on that node.
  ///
  /// Any owned id would reach the node. The smallest is used, not the last one listed for the
  /// address, so the choice does not depend on the order the client reported its routes in.
  pub fn nodes(&self) -> Vec<(NodeAddress, RingId)> {
    let mut seen = HashSet::with_capacity(self.entries.len());
    self
      .entries
      .iter()
      .filter(|e| seen.insert(&e.address))
      .map(|e| (e.address.clone(), e.id.clone()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn id(b: u8) -> RingId {
    RingId::from(vec![b])
  }

  fn table() -> RoutingTable {
    RoutingTable::new(vec![
      (id(0xF0), NodeAddress::new("c", 1025)),
      (id(0x10), NodeAddress::new("a", 1025)),
      (id(0x50), NodeAddress::new("b", 1025)),
    ])
  }

  #[test]
  fn resolves_predecessor_and_wraps() {
    let t = table();
    assert_eq!(t.resolve(&id(0x30)).unwrap().address, NodeAddress::new("b", 1025));
    assert_eq!(t.resolve(&id(0x05)).unwrap().address, NodeAddress::new("c", 1025));
    assert_eq!(t.resolve(&id(0x10)).unwrap().address, NodeAddress::new("a", 1025));
    assert_eq!(t.resolve(&id(0xFF)).unwrap().address, NodeAddress::new("c", 1025));
    assert_eq!(t.resolve(&id(0x4F)).unwrap().id, id(0x10));
  }

  #[test]
  fn resolve_is_idempotent() {
    let t = table();
    for b in 0..=255u8 {
      assert_eq!(t.resolve(&id(b)).unwrap(), t.resolve(&id(b)).unwrap());
    }
  }

  #[test]
  fn resolve_matches_linear_scan() {
    let t = table();
    for b in 0..=255u8 {
      let q = id(b);
      let expected = t
        .entries()
        .iter()
        .filter(|e| e.id <= q)
        .last()
        .or_else(|| t.entries().last())
        .unwrap();
      assert_eq!(t.resolve(&q).unwrap(), expected);
    }
  }

  #[test]
  fn empty_table() {
    let t = RoutingTable::new(vec![]);
    assert!(t.is_empty());
    assert_eq!(t.resolve(&id(0)), Err(ClusterError::EmptyTopology));
  }

  #[test]
  fn duplicates_keep_first_occurrence() {
    let t = RoutingTable::new(vec![
      (id(0x20), NodeAddress::new("x", 1)),
      (id(0x10), NodeAddress::new("y", 1)),
      (id(0x20), NodeAddress::new("z", 1)),
      (id(0x10), NodeAddress::new("w", 1)),
    ]);
    assert_eq!(t.len(), 2);
    assert_eq!(t.ids().into_iter().collect::<Vec<_>>(), vec![id(0x10), id(0x20)]);
    assert_eq!(
      t.pairs_sorted_by_id(),
      vec![
        (NodeAddress::new("y", 1), id(0x10)),
        (NodeAddress::new("x", 1), id(0x20))
      ]
    );
  }

  #[test]
  fn nodes_are_distinct_with_smallest_id() {
    let t = RoutingTable::new(vec![
      (id(0x90), NodeAddress::new("a", 1)),
      (id(0x30), NodeAddress::new("b", 1)),
      (id(0x20), NodeAddress::new("a", 1)),
      (id(0x60), NodeAddress::new("b", 1)),
    ]);
    assert_eq!(
      t.nodes(),
      vec![(NodeAddress::new("a", 1), id(0x20)), (NodeAddress::new("b", 1), id(0x30))]
    );
    assert_eq!(t.addresses().len(), 2);
  }
}
