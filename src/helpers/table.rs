use std::fmt;

/// Plain-text table. An empty table still prints one row holding its
/// empty-state message.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    empty_message: String,
}

impl Table {
    pub fn new(headers: &[&str], empty_message: &str) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            empty_message: empty_message.to_string(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_line(f, &self.headers, &widths)?;
        let total = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3;
        writeln!(f, "{}", "-".repeat(total))?;

        if self.rows.is_empty() {
            return writeln!(f, "{}", self.empty_message);
        }
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}
