//! Column-aligned text tables for chat output.
//!
//! Cells are centered between pipe separators, with a dashed rule under the
//! header row. Column width follows the widest cell so IDs, names, and
//! amounts all stay readable in a monospace chat block.

/// Builder for one rendered table.
pub struct TextTable {
  headers: Vec<String>,
  rows:    Vec<Vec<String>>,
}

impl TextTable {
  pub fn new<I, T>(headers: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    Self {
      headers: headers.into_iter().map(Into::into).collect(),
      rows:    Vec::new(),
    }
  }

  /// Append one row. Short rows are padded with empty cells.
  pub fn row<I, T>(&mut self, cells: I)
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
    row.resize(self.headers.len(), String::new());
    self.rows.push(row);
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn render(&self) -> String {
    let widths: Vec<usize> = self
      .headers
      .iter()
      .enumerate()
      .map(|(i, h)| {
        self
          .rows
          .iter()
          .map(|r| r[i].chars().count())
          .chain([h.chars().count()])
          .max()
          .unwrap_or(0)
          + 2
      })
      .collect();

    let mut out = render_line(&self.headers, &widths);
    out.push_str(&"-".repeat(out.len() - 1));
    out.push('\n');
    for row in &self.rows {
      out.push_str(&render_line(row, &widths));
    }
    out
  }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
  let mut line = String::from("|");
  for (cell, width) in cells.iter().zip(widths) {
    line.push_str(&center(cell, *width));
    line.push('|');
  }
  line.push('\n');
  line
}

fn center(s: &str, width: usize) -> String {
  let len = s.chars().count();
  if len >= width {
    return s.to_string();
  }
  let left = (width - len) / 2;
  let right = width - len - left;
  format!("{}{s}{}", " ".repeat(left), " ".repeat(right))
}
