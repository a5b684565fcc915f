use crate::stats::AggregateRow;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};

fn cell(v: Option<&Value>) -> String {
  match v {
    None | Some(Value::Null) => "None".to_string(),
    Some(Value::String(s)) => s.clone(),
    Some(v) => v.to_string(),
  }
}

/// Lays the rows out as a borderless table headed `Name`, `Aggregate`, then one `Sub` column per
/// document, sized from the first row. Names are left aligned, figures right aligned. No rows
/// render as nothing at all.
pub fn render(rows: &[AggregateRow]) -> String {
  let first = match rows.first() {
    Some(r) => r,
    None => return String::new(),
  };
  let width = rows.iter().map(|r| r.raw.len()).max().unwrap_or(0).max(first.raw.len()) + 2;
  let pad = |mut record: Vec<String>| {
    record.resize(width, String::new());
    record
  };

  let mut builder = Builder::default();
  let header = ["Name", "Aggregate"]
    .iter()
    .map(|s| s.to_string())
    .chain(first.raw.iter().map(|_| "Sub".to_string()))
    .collect();
  builder.push_record(pad(header));
  for row in rows {
    let record = std::iter::once(row.label.clone())
      .chain(std::iter::once(cell(row.aggregate.as_ref())))
      .chain(row.raw.iter().map(|v| cell(Some(v))))
      .collect();
    builder.push_record(pad(record));
  }
  let mut table = builder.build();
  table
    .with(Style::blank())
    .with(Modify::new(Columns::new(1..)).with(Alignment::right()));
  table.to_string()
}
