//! Table formatting for list and report commands
//!
//! One row type rendered as aligned text, CSV, markdown (via `tabled`) or
//! bare IDs, so every list command prints the same way.

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::shortid::ShortIdIndex;

/// A typed cell value
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Entity ID (truncated, cyan)
    Id(String),
    /// Plain text, truncated to the column
    Text(String),
    /// Category or kind
    Type(String),
    /// Count of units
    Number(u64),
    /// Amount of money; `None` when the caller may not see prices
    Money(Option<f64>),
    /// Float with precision, `None` shown as "-"
    Float(Option<f64>, usize),
    /// Stock that breaks its capacity is shown in red
    Stock { stock: u64, capacity: u64 },
}

impl CellValue {
    fn plain(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Money(Some(m)) => format!("{:.2}", m),
            CellValue::Money(None) => "-".to_string(),
            CellValue::Float(Some(f), prec) => format!("{:.prec$}", f, prec = prec),
            CellValue::Float(None, _) => "-".to_string(),
            CellValue::Stock { stock, .. } => stock.to_string(),
        }
    }

    /// Aligned and colored for terminals
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                let display = truncate_str(id, 16);
                format!("{:<width$}", style(display).cyan(), width = width)
            }
            CellValue::Text(s) | CellValue::Type(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(1)), width = width)
            }
            CellValue::Money(None) => format!("{:>width$}", style("-").dim(), width = width),
            CellValue::Stock { stock, capacity } if stock > capacity => {
                format!("{:>width$}", style(stock).red().bold(), width = width)
            }
            other => format!("{:>width$}", other.plain(), width = width),
        }
    }

    /// RFC 4180, no colors
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Money(None) => String::new(),
            other => escape_csv(&other.plain()),
        }
    }

    /// Display width for column sizing
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => id.len().min(16),
            other => other.plain().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values
pub struct TableRow {
    pub short_id: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(full_id: String, short_ids: &ShortIdIndex) -> Self {
        let short_id = short_ids.get_short_id(&full_id).unwrap_or_default();
        Self {
            short_id,
            full_id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Renders rows in any list format
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    entity_prefix: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str, entity_prefix: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            entity_prefix,
            show_summary: true,
        }
    }

    /// Drop the trailing "N found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows; columns whose key is not in `visible` are skipped
    pub fn output(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) {
        let columns: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|c| visible.contains(&c.key))
            .collect();

        match format {
            OutputFormat::Csv => self.output_csv(rows, &columns),
            OutputFormat::Md => self.output_md(rows, &columns),
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.full_id);
                }
            }
            _ => self.output_tsv(rows, &columns),
        }
    }

    fn widths(&self, rows: &[TableRow], columns: &[&ColumnDef]) -> Vec<usize> {
        let short = rows
            .iter()
            .map(|r| r.short_id.len())
            .max()
            .unwrap_or(0)
            .max("SHORT".len());

        let mut widths = vec![short];
        for col in columns {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content + 1).min(col.width));
        }
        widths
    }

    fn output_tsv(&self, rows: &[TableRow], columns: &[&ColumnDef]) {
        let widths = self.widths(rows, columns);

        let mut header = vec![format!("{:<w$}", style("SHORT").bold().dim(), w = widths[0])];
        for (col, w) in columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<w$}", style(col.header).bold(), w = *w));
        }
        println!("{}", header.join(" "));
        println!("{}", "-".repeat(widths.iter().sum::<usize>() + widths.len() - 1));

        for row in rows {
            let mut parts = vec![format!("{:<w$}", style(&row.short_id).cyan(), w = widths[0])];
            for (col, w) in columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*w)),
                    None => parts.push(format!("{:<w$}", "-", w = *w)),
                }
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} {}(s) found. Use {} to reference by short ID.",
                style(rows.len()).cyan(),
                self.entity_name,
                style(format!("{}@N", self.entity_prefix)).cyan()
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow], columns: &[&ColumnDef]) {
        let mut header = vec!["short_id".to_string(), "id".to_string()];
        header.extend(columns.iter().filter(|c| c.key != "id").map(|c| c.key.to_string()));
        println!("{}", header.join(","));

        for row in rows {
            let mut parts = vec![row.short_id.clone(), row.full_id.clone()];
            for col in columns.iter().filter(|c| c.key != "id") {
                parts.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            println!("{}", parts.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow], columns: &[&ColumnDef]) {
        let mut builder = Builder::default();

        let mut header = vec!["Short".to_string()];
        header.extend(columns.iter().map(|c| c.header.to_string()));
        builder.push_record(header);

        for row in rows {
            let mut record = vec![row.short_id.clone()];
            for col in columns {
                let value = match row.get(col.key) {
                    Some(CellValue::Id(id)) => id.clone(),
                    Some(v) => v.plain(),
                    None => "-".to_string(),
                };
                record.push(value.replace('|', "\\|"));
            }
            builder.push_record(record);
        }

        println!("{}", builder.build().with(Style::markdown()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_hidden_renders_dash() {
        assert_eq!(CellValue::Money(None).plain(), "-");
        assert_eq!(CellValue::Money(None).format_csv(), "");
        assert_eq!(CellValue::Money(Some(16.0)).format_csv(), "16.00");
    }

    #[test]
    fn test_row_lookup() {
        let index = ShortIdIndex::new();
        let row = TableRow::new("RAW-1".to_string(), &index)
            .cell("title", CellValue::Text("Pine, 240".to_string()))
            .cell("stock", CellValue::Number(40));

        assert_eq!(row.short_id, "");
        assert_eq!(row.get("title").unwrap().format_csv(), "\"Pine, 240\"");
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_widths_capped_by_column() {
        let index = ShortIdIndex::new();
        let cols = [ColumnDef::new("title", "TITLE", 10)];
        let rows = vec![TableRow::new("RAW-1".to_string(), &index)
            .cell("title", CellValue::Text("a very long raw material title".to_string()))];
        let fmt = TableFormatter::new(&cols, "raw material", "RAW");
        let refs: Vec<&ColumnDef> = cols.iter().collect();
        assert_eq!(fmt.widths(&rows, &refs), vec![5, 10]);
    }
}
