//! Rendering of the run result for humans and machines

use crate::core::error::BackupResult;
use crate::core::failures::FailureRecord;
use crate::core::pipeline::RunResult;

const HEADERS: [&str; 2] = ["Commit SHA", "File"];

/// Render failures as a grid table
///
/// ```text
/// +------------+--------+
/// | Commit SHA | File   |
/// +============+========+
/// | abc123     | a.txt  |
/// +------------+--------+
/// ```
pub fn failure_table(failures: &[FailureRecord]) -> String {
  let rows: Vec<[String; 2]> = failures
    .iter()
    .map(|f| [f.commit.clone(), f.target.to_string()])
    .collect();

  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let rule = |fill: char| {
    let mut line = String::from("+");
    for width in widths {
      line.extend(std::iter::repeat_n(fill, width + 2));
      line.push('+');
    }
    line.push('\n');
    line
  };
  let row_line = |cells: [&str; 2]| {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
      let pad = width - cell.chars().count();
      line.push(' ');
      line.push_str(cell);
      line.extend(std::iter::repeat_n(' ', pad + 1));
      line.push('|');
    }
    line.push('\n');
    line
  };

  let mut out = rule('-');
  out.push_str(&row_line(HEADERS));
  out.push_str(&rule('='));
  for [commit, file] in &rows {
    out.push_str(&row_line([commit.as_str(), file.as_str()]));
    out.push_str(&rule('-'));
  }
  out
}

/// Serialize the run result as pretty JSON
pub fn to_json(result: &RunResult) -> BackupResult<String> {
  Ok(serde_json::to_string_pretty(result)?)
}
