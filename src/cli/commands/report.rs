//! `pws report` command - Workshop reports

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::Session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::EntityPrefix;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Stock, capacity and headroom of every composite part
    Stock(StockArgs),
}

#[derive(clap::Args, Debug)]
pub struct StockArgs {
    /// Only parts whose stock exceeds what their parents can support
    #[arg(long)]
    pub over: bool,
}

const STOCK_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("title", "TITLE", 28),
    ColumnDef::new("category", "CATEGORY", 11),
    ColumnDef::new("stock", "STOCK", 8),
    ColumnDef::new("capacity", "CAPACITY", 9),
    ColumnDef::new("headroom", "HEADROOM", 9),
];

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Stock(args) => run_stock(args, global),
    }
}

fn run_stock(args: StockArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let workshop = session.workshop();

    let lines: Vec<_> = workshop
        .stock_report()
        .into_iter()
        .filter(|l| !args.over || u64::from(l.stock) > l.capacity)
        .collect();

    session.remember(EntityPrefix::Part, lines.iter().map(|l| l.id.clone()));

    let format = session.format(OutputFormat::Tsv);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return session.print_structured(&lines, format);
    }

    let rows: Vec<TableRow> = lines
        .iter()
        .map(|l| {
            TableRow::new(l.id.clone(), &session.short_ids)
                .cell("id", CellValue::Id(l.id.clone()))
                .cell("title", CellValue::Text(l.title.clone()))
                .cell("category", CellValue::Type(l.category.to_string()))
                .cell(
                    "stock",
                    CellValue::Stock {
                        stock: u64::from(l.stock),
                        capacity: l.capacity,
                    },
                )
                .cell("capacity", CellValue::Number(l.capacity))
                .cell("headroom", CellValue::Number(l.headroom))
        })
        .collect();

    let visible: Vec<&str> = STOCK_COLUMNS.iter().map(|c| c.key).collect();
    TableFormatter::new(STOCK_COLUMNS, "part", "PART")
        .quiet(session.quiet)
        .output(&rows, format, &visible);
    Ok(())
}
