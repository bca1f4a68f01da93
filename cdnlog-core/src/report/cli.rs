use crate::analysis::{AnalysisResults, Table};
use crate::conf::AppConfig;
use crate::report::Reporter;
use std::io::{self, Write};

const DEFAULT_MAX_ROWS: usize = 50;

/// Aligned plain-text tables on stdout.
pub struct CliReporter {
    max_rows: usize,
}

impl Default for CliReporter {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Reporter for CliReporter {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn generate(&self, results: &AnalysisResults, _cfg: &AppConfig) -> anyhow::Result<()> {
        let out = render_results(results, self.max_rows);
        let mut stdout = io::stdout().lock();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

pub fn render_results(results: &AnalysisResults, max_rows: usize) -> String {
    let mut out = String::new();

    for (analyzer, tables) in results {
        let title = format!("Analysis: {analyzer}");
        out.push_str(&format!("{title}\n{}\n\n", "=".repeat(title.chars().count())));

        if tables.is_empty() {
            out.push_str("  <no results>\n\n");
            continue;
        }

        for (name, table) in tables {
            out.push_str(&format!("{name} ({} rows)\n", table.len()));
            out.push_str(&render_table(table, max_rows));
            out.push('\n');
        }
    }

    out
}

fn render_table(table: &Table, max_rows: usize) -> String {
    if table.is_empty() {
        return "  <empty>\n".to_string();
    }

    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&table.columns, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_row(&rule, &widths));
    for row in &shown {
        out.push_str(&format_row(row, &widths));
    }

    if table.len() > shown.len() {
        out.push_str(&format!("  ... {} more rows\n", table.len() - shown.len()));
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    format!("  {}\n", line.join("  ").trim_end())
}
