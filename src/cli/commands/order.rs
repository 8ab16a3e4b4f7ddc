//! `pws order` command - Customer orders and their invoice totals

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{money, truncate_str, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::workshop::OrderTotalLine;
use crate::core::{EntityPrefix, Workshop, WorkshopError};
use crate::engine::bom::parse_quantity;
use crate::engine::ValidationError;
use crate::entities::{Order, OrderLine};

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List orders
    List(ListArgs),

    /// Register an order
    New(NewArgs),

    /// Show an order
    Show(ShowArgs),

    /// Invoice total, line by line
    Total(TotalArgs),

    /// Delete an order
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in customer name
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Customer name
    #[arg(long, short = 'c')]
    pub customer: String,

    /// Promised delivery date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Order line as PROT:QTY[:LOT[:TREATMENT]] (repeatable)
    #[arg(long = "line", value_name = "PROT:QTY")]
    pub lines: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct TotalArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order ID or short ID (ORD@N)
    pub id: String,
}

pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        OrderCommands::List(args) => run_list(args, session),
        OrderCommands::New(args) => run_new(args, &session),
        OrderCommands::Show(args) => run_show(args, &session),
        OrderCommands::Total(args) => run_total(args, &session),
        OrderCommands::Delete(args) => session.delete(EntityPrefix::Ord, &args.id),
    }
}

/// Parse `PROT:QTY[:LOT[:TREATMENT]]`; the prototype is left unresolved
fn parse_line(field: &str, spec: &str) -> Result<OrderLine, ValidationError> {
    let mut parts = spec.splitn(4, ':');
    let (Some(prototype), Some(qty)) = (parts.next(), parts.next()) else {
        return Err(ValidationError::field(
            field,
            format!("'{}' should look like PROT:QTY[:LOT[:TREATMENT]]", spec),
        ));
    };
    let nonempty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(OrderLine {
        prototype: prototype.trim().to_string(),
        quantity: parse_quantity(field, qty)?,
        lot_number: parts.next().and_then(nonempty),
        treatment_number: parts.next().and_then(nonempty),
    })
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("customer", "CUSTOMER", 28),
    ColumnDef::new("due", "DUE", 11),
    ColumnDef::new("units", "UNITS", 7),
    ColumnDef::new("total", "TOTAL", 12),
];

fn run_list(args: ListArgs, mut session: Session) -> Result<()> {
    let workshop = session.workshop();
    let needle = args.search.as_deref().map(str::to_lowercase);

    let orders: Vec<&Order> = workshop
        .orders
        .iter()
        .filter(|o| {
            needle
                .as_deref()
                .map_or(true, |n| o.customer.to_lowercase().contains(n))
        })
        .collect();

    session.remember(EntityPrefix::Ord, orders.iter().map(|o| o.id.to_string()));

    let format = session.format(OutputFormat::Tsv);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return session.print_structured(&orders, format);
    }

    let rows: Vec<TableRow> = orders
        .iter()
        .map(|o| {
            TableRow::new(o.id.to_string(), &session.short_ids)
                .cell("id", CellValue::Id(o.id.to_string()))
                .cell("customer", CellValue::Text(o.customer.clone()))
                .cell(
                    "due",
                    CellValue::Text(o.due_date.map_or_else(|| "-".to_string(), |d| d.to_string())),
                )
                .cell("units", CellValue::Number(o.total_units()))
                .cell("total", CellValue::Money(session.price(workshop.order_total(o))))
        })
        .collect();

    let visible: Vec<&str> = COLUMNS
        .iter()
        .map(|c| c.key)
        .filter(|k| *k != "total" || session.role.can_view_prices())
        .collect();

    TableFormatter::new(COLUMNS, "order", "ORD")
        .quiet(session.quiet)
        .output(&rows, format, &visible);
    Ok(())
}

fn build_order(session: &Session, workshop: &Workshop, args: NewArgs) -> Result<Order, WorkshopError> {
    let mut order = Order::new(args.customer, session.config.author());
    order.due_date = args.due;

    for (i, spec) in args.lines.iter().enumerate() {
        let mut line = parse_line(&format!("lines[{}]", i), spec)?;
        line.prototype = session.resolve(workshop, EntityPrefix::Prot, &line.prototype)?;
        order.lines.push(line);
    }
    Ok(order)
}

fn run_new(args: NewArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let order = build_order(session, &workshop, args)?;
    let (order, path) = session.store().create_order(order)?;

    session.done(format!("Created order {}", style(order.id.to_string()).cyan()));
    if !session.quiet {
        println!("   {}", style(path.display()).dim());
        println!(
            "   {} | {} line(s) | {} pallet(s)",
            style(&order.customer).yellow(),
            order.lines.len(),
            order.total_units()
        );
    }
    Ok(())
}

fn find<'a>(session: &Session, workshop: &'a Workshop, reference: &str) -> Result<&'a Order> {
    let id = session.resolve(workshop, EntityPrefix::Ord, reference)?;
    workshop
        .order(&id)
        .ok_or_else(|| miette::miette!("No order found matching '{}'", reference))
}

fn run_show(args: ShowArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let order = find(session, &workshop, &args.id)?;

    match session.format(OutputFormat::Auto) {
        OutputFormat::Id => println!("{}", order.id),
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(order, f)?,
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(order.id.to_string()).cyan());
            println!("{}: {}", style("Customer").bold(), style(&order.customer).yellow());
            if let Some(due) = order.due_date {
                println!("{}: {}", style("Due").bold(), due);
            }

            println!();
            println!("{}", style("Lines:").bold());
            for line in &order.lines {
                let title = workshop
                    .prototype(&line.prototype)
                    .map_or("(missing)", |p| p.title.as_str());
                let mut extra = Vec::new();
                if let Some(lot) = &line.lot_number {
                    extra.push(format!("lot {}", lot));
                }
                if let Some(treatment) = &line.treatment_number {
                    extra.push(format!("treatment {}", treatment));
                }
                println!(
                    "  {} {} x{}{}",
                    style(session.display_id(&line.prototype)).cyan(),
                    title,
                    line.quantity,
                    if extra.is_empty() {
                        String::new()
                    } else {
                        format!("  ({})", extra.join(", "))
                    }
                );
            }

            if session.role.can_view_prices() {
                println!();
                println!("{}: {}", style("Total").bold(), money(Some(workshop.order_total(order))));
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Author").dim(),
                order.author,
                style("Created").dim(),
                order.created.format("%Y-%m-%d %H:%M"),
                style("Revision").dim(),
                order.entity_revision
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Invoice<'a> {
    order: String,
    customer: &'a str,
    lines: Vec<OrderTotalLine>,
    units: u64,
    total: f64,
}

fn run_total(args: TotalArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let order = find(session, &workshop, &args.id)?;
    let invoice = Invoice {
        order: order.id.to_string(),
        customer: &order.customer,
        lines: workshop.order_lines(order),
        units: order.total_units(),
        total: workshop.order_total(order),
    };

    match session.format(OutputFormat::Tsv) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(&invoice, f)?,
        _ => {
            println!(
                "{} {}",
                style(session.display_id(&invoice.order)).cyan(),
                style(invoice.customer).yellow()
            );
            println!(
                "{:<16} {:<26} {:>6} {:>10} {:>12}",
                style("PROTOTYPE").bold(),
                style("TITLE").bold(),
                style("QTY").bold(),
                style("COST").bold(),
                style("SUBTOTAL").bold()
            );
            for line in &invoice.lines {
                println!(
                    "{:<16} {:<26} {:>6} {:>10} {:>12}",
                    session.display_id(&line.prototype),
                    truncate_str(&line.title, 25),
                    line.quantity,
                    money(session.price(line.prototype_cost)),
                    money(session.price(line.subtotal))
                );
            }
            println!();
            println!("{}: {}", style("Pallets").bold(), invoice.units);
            println!("{}: {}", style("Total").bold(), money(session.price(invoice.total)));
        }
    }
    Ok(())
}
