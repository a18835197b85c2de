//! Column tables for list output

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use td_client::Pagination;

/// Cells wider than this are cut with an ellipsis.
const MAX_CELL: usize = 48;

pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells.into_iter().map(|c| clip(&c)).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        write_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut out, &rule, &widths);
        for row in &self.rows {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn clip(cell: &str) -> String {
    let cell = cell.replace(['\n', '\r'], " ");
    if cell.chars().count() <= MAX_CELL {
        return cell;
    }
    let mut clipped: String = cell.chars().take(MAX_CELL - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Table followed by the pagination footer, or the empty-state line alone.
pub fn render_page(table: &Table, pagination: Option<Pagination>, empty: &str) -> String {
    if table.is_empty() {
        return format!("{}\n", empty);
    }
    let mut out = table.render();
    if let Some(pagination) = pagination {
        let _ = writeln!(out, "\n{}", pagination.summary());
    }
    out
}

pub fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
