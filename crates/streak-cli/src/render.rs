//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use streak_core::{activity::ActivityRecord, user::HeatmapDay};

const FILLED: char = '■';
const EMPTY: char = '·';

/// Render heatmap cells as rows of seven, oldest first, followed by a legend.
pub fn heatmap(streak: u32, days: &[HeatmapDay]) -> String {
  let mut out = String::new();

  for week in days.chunks(7) {
    let first = week[0].date;
    let cells: String = week
      .iter()
      .map(|d| if d.logged_in { FILLED } else { EMPTY })
      .flat_map(|c| [c, ' '])
      .collect();
    let _ = writeln!(out, "{first}  {}", cells.trim_end());
  }

  let active = days.iter().filter(|d| d.logged_in).count();
  let _ = write!(
    out,
    "{active}/{} days active · current streak: {streak} {}",
    days.len(),
    if streak == 1 { "day" } else { "days" }
  );
  out
}

/// One line per activity record.
pub fn activity(record: &ActivityRecord) -> String {
  format!(
    "{}  {:<16} {}",
    record.created_at.format("%Y-%m-%d %H:%M"),
    record.kind.as_ref(),
    record.description
  )
}
