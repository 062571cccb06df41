//! Result tables and the three ways of rendering them.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::ValueEnum;
use tracing::info;

use crate::constants::RESULTS_DIR;

/// Ordered header-plus-rows structure returned by an extraction routine.
/// Every data row has the header's arity.
#[derive(Debug)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        assert_eq!(
            row.len(),
            self.header.len(),
            "row arity must match the header"
        );
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Aligned column table on stdout.
    Pretty,
    /// CSV file under the results directory.
    File,
}

/// Render a routine's table. `None` prints plain space-separated lines.
pub fn render(table: &ResultTable, mode_name: &str, format: Option<OutputFormat>) -> anyhow::Result<()> {
    match format {
        None => print!("{}", format_plain(table)),
        Some(OutputFormat::Pretty) => print!("{}", format_aligned(table)),
        Some(OutputFormat::File) => {
            let path = write_csv(table, mode_name)?;
            info!("results saved to {}", path.display());
        }
    }
    Ok(())
}

fn format_plain(table: &ResultTable) -> String {
    let mut out = String::new();
    out.push_str(&table.header.join(" "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn format_aligned(table: &ResultTable) -> String {
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        row.iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<1$}", cell, widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = format_row(&table.header);
    out.push('\n');
    // Separator spans the columns plus the " | " gaps
    let total = widths.iter().sum::<usize>() + 3 * (widths.len().saturating_sub(1));
    out.push_str(&"-".repeat(total));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

fn write_csv(table: &ResultTable, mode_name: &str) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(RESULTS_DIR)
        .with_context(|| format!("failed to create results directory {RESULTS_DIR}"))?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = PathBuf::from(RESULTS_DIR).join(format!("{mode_name}_{timestamp}.csv"));
    fs::write(&path, to_csv_string(table))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn to_csv_string(table: &ResultTable) -> String {
    let mut out = csv_line(&table.header);
    for row in &table.rows {
        out.push_str(&csv_line(row));
    }
    out
}

fn csv_line(row: &[String]) -> String {
    let mut line = row
        .iter()
        .map(|cell| {
            if needs_quotes(cell) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}
