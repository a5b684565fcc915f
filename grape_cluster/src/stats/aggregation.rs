use crate::stats::MetricDocument;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::convert::TryFrom;
use std::hash::Hash;

/// One output line of an aggregation: a label, its combined value if the policy computes one, and
/// the value from each document.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateRow {
  pub label: String,
  pub aggregate: Option<Value>,
  pub raw: Vec<Value>,
}

/// How the values of one label are combined across documents.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Policy {
  Sum,
  Mean,
  /// Keeps the values apart, for labels such as ids that must not be combined.
  Identity,
}
impl Policy {
  pub fn apply(self, label: String, raw: Vec<Value>) -> AggregateRow {
    let aggregate = match self {
      Policy::Sum => sum_policy(&raw),
      Policy::Mean => mean_policy(&raw),
      Policy::Identity => identity_policy(&raw),
    };
    AggregateRow {
      label: label,
      aggregate: aggregate,
      raw: raw,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Num {
  Int(i128),
  Float(f64),
}
impl Num {
  fn into_value(self) -> Option<Value> {
    match self {
      Num::Int(i) => i64::try_from(i)
        .map(Value::from)
        .or_else(|_| u64::try_from(i).map(Value::from))
        .ok()
        .or_else(|| Num::Float(i as f64).into_value()),
      Num::Float(f) => Number::from_f64(f).map(Value::Number),
    }
  }
}

fn numeric(v: &Value) -> Option<Num> {
  match v.as_i64() {
    Some(i) => Some(Num::Int(i as i128)),
    None => match v.as_u64() {
      Some(u) => Some(Num::Int(u as i128)),
      None => v.as_f64().map(Num::Float),
    },
  }
}

// Integers stay integers unless a float joins in.
fn total(raw: &[Value]) -> Option<Num> {
  raw.iter().try_fold(Num::Int(0), |acc, v| {
    Some(match (acc, numeric(v)?) {
      (Num::Int(a), Num::Int(b)) => Num::Int(a + b),
      (Num::Int(a), Num::Float(b)) => Num::Float(a as f64 + b),
      (Num::Float(a), Num::Int(b)) => Num::Float(a + b as f64),
      (Num::Float(a), Num::Float(b)) => Num::Float(a + b),
    })
  })
}

/// The sum of the values. `None` if any value is not a number.
pub fn sum_policy(raw: &[Value]) -> Option<Value> {
  total(raw)?.into_value()
}

/// The mean of the values. Integer values use floor division, as counters and timings are
/// reported in whole units. `None` if any value is not a number, or there are no values.
pub fn mean_policy(raw: &[Value]) -> Option<Value> {
  if raw.is_empty() {
    return None;
  }
  let n = raw.len();
  match total(raw)? {
    Num::Int(s) => Num::Int(s.div_euclid(n as i128)),
    Num::Float(s) => Num::Float(s / n as f64),
  }
  .into_value()
}

pub fn identity_policy(_raw: &[Value]) -> Option<Value> {
  None
}

/// Filters each document down to `labels`, keeping the document's own order. Labels a document
/// lacks are skipped.
pub fn select<'d, S>(docs: &'d [MetricDocument], labels: &HashSet<S>) -> Vec<Vec<(&'d str, &'d Value)>>
where
  S: Borrow<str> + Hash + Eq,
{
  docs
    .iter()
    .map(|doc| {
      doc
        .iter()
        .filter(|(k, _)| labels.contains(k.as_str()))
        .map(|(k, v)| (k.as_str(), v))
        .collect()
    })
    .collect()
}

/// Zips selections by position: row `i` combines the `i`th selected pair of every document and
/// takes its label from the first document. Stops at the shortest selection, so no selection at
/// all yields no rows.
pub fn zip_rows(selected: &[Vec<(&str, &Value)>], policy: Policy) -> Vec<AggregateRow> {
  let rows = selected.iter().map(|s| s.len()).min().unwrap_or(0);
  (0..rows)
    .map(|i| {
      let label = selected[0][i].0.to_string();
      let raw = selected.iter().map(|s| s[i].1.clone()).collect();
      policy.apply(label, raw)
    })
    .collect()
}

/// Combines `label` across `docs`. There is no row when `docs` is empty or any document lacks the
/// label.
pub fn reduce(label: &str, policy: Policy, docs: &[MetricDocument]) -> Option<AggregateRow> {
  let labels = std::iter::once(label).collect::<HashSet<_>>();
  zip_rows(&select(docs, &labels), policy).into_iter().next()
}

/// Applies each `(label, policy)` in turn. Rows come out in the order of `plan`.
pub fn aggregate<S: AsRef<str>>(plan: &[(S, Policy)], docs: &[MetricDocument]) -> Vec<AggregateRow> {
  plan
    .iter()
    .filter_map(|(label, policy)| reduce(label.as_ref(), *policy, docs))
    .collect()
}

/// What the queue application reports, and how each figure combines across workers.
pub fn queue_stats_plan() -> Vec<(&'static str, Policy)> {
  vec![
    ("queue_id", Policy::Identity),
    ("high-id", Policy::Identity),
    ("low-id", Policy::Identity),
    ("push.count", Policy::Sum),
    ("pop.count", Policy::Sum),
    ("ack.count", Policy::Sum),
    ("timeout.count", Policy::Sum),
    ("push.rate", Policy::Sum),
    ("pop.rate", Policy::Sum),
    ("ack.rate", Policy::Sum),
    ("push.time", Policy::Mean),
    ("pop.time", Policy::Mean),
    ("ack.time", Policy::Mean),
  ]
}
