//! Statistics documents reported by workers, and how to combine them into one table.
//!
//! A worker answers the stats event with a flat JSON object. Each label is combined across the
//! documents of every worker under a [`Policy`], and [`render`] turns the resulting rows into
//! text.

mod aggregation;
mod document;
mod report;

#[rustfmt::skip]
pub use {
  aggregation::aggregate,
  aggregation::identity_policy,
  aggregation::mean_policy,
  aggregation::queue_stats_plan,
  aggregation::reduce,
  aggregation::select,
  aggregation::sum_policy,
  aggregation::zip_rows,
  aggregation::AggregateRow,
  aggregation::Policy,
  document::MetricDocument,
  report::render,
};
