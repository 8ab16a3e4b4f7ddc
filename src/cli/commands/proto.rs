//! `pws proto` command - Pallet prototype (design and BOM) management

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{dimension, money, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::workshop::CostLine;
use crate::core::{EntityPrefix, Workshop, WorkshopError};
use crate::engine::bom::{check_nominal, parse_quantity, validate_prototype, BomLine, SkidRef};
use crate::engine::units::ItemKind;
use crate::engine::ValidationError;
use crate::entities::Prototype;

#[derive(Subcommand, Debug)]
pub enum ProtoCommands {
    /// List prototypes
    List(ListArgs),

    /// Create a prototype from BOM lines
    New(NewArgs),

    /// Show a prototype and its BOM
    Show(ShowArgs),

    /// Cost of one pallet, line by line
    Cost(CostArgs),

    /// Delete a prototype no order uses
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in title
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Design name (e.g., "Euro 120x80")
    #[arg(long, short = 't')]
    pub title: String,

    /// Nominal length in cm
    #[arg(long, short = 'l')]
    pub length: Option<f64>,

    /// Nominal width in cm
    #[arg(long, short = 'w')]
    pub width: Option<f64>,

    /// Nominal height in cm
    #[arg(long)]
    pub height: Option<f64>,

    /// BOM line as KIND:ID:QTY, kind one of board, block, nail, fiber (repeatable)
    #[arg(long = "line", value_name = "KIND:ID:QTY")]
    pub lines: Vec<String>,

    /// Skid as ID:QTY, used instead of board and block lines
    #[arg(long, value_name = "ID:QTY")]
    pub skid: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Prototype ID or short ID (PROT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Prototype ID or short ID (PROT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Prototype ID or short ID (PROT@N)
    pub id: String,
}

pub fn run(cmd: ProtoCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        ProtoCommands::List(args) => run_list(args, session),
        ProtoCommands::New(args) => run_new(args, &session),
        ProtoCommands::Show(args) => run_show(args, &session),
        ProtoCommands::Cost(args) => run_cost(args, &session),
        ProtoCommands::Delete(args) => session.delete(EntityPrefix::Prot, &args.id),
    }
}

/// Parse `KIND:ID:QTY`
fn parse_line(field: &str, spec: &str) -> Result<(ItemKind, String, u32), ValidationError> {
    let mut parts = spec.splitn(3, ':');
    let (Some(kind), Some(item), Some(qty)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::field(
            field,
            format!("'{}' should look like KIND:ID:QTY", spec),
        ));
    };
    let kind: ItemKind = kind.parse().map_err(|e: String| ValidationError::field(field, e))?;
    Ok((kind, item.trim().to_string(), parse_quantity(field, qty)?))
}

/// Parse `ID:QTY`
fn parse_skid(spec: &str) -> Result<(String, u32), ValidationError> {
    match spec.rsplit_once(':') {
        Some((item, qty)) => Ok((item.trim().to_string(), parse_quantity("skid.quantity", qty)?)),
        None => Err(ValidationError::field(
            "skid",
            format!("'{}' should look like ID:QTY", spec),
        )),
    }
}

fn item_prefix(kind: ItemKind) -> EntityPrefix {
    if kind.raw_category().is_some() {
        EntityPrefix::Raw
    } else {
        EntityPrefix::Part
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("title", "TITLE", 30),
    ColumnDef::new("size", "SIZE", 12),
    ColumnDef::new("lines", "LINES", 6),
    ColumnDef::new("cost", "COST", 10),
];

fn run_list(args: ListArgs, mut session: Session) -> Result<()> {
    let workshop = session.workshop();
    let needle = args.search.as_deref().map(str::to_lowercase);

    let protos: Vec<&Prototype> = workshop
        .prototypes
        .iter()
        .filter(|p| {
            needle
                .as_deref()
                .map_or(true, |n| p.title.to_lowercase().contains(n))
        })
        .collect();

    session.remember(EntityPrefix::Prot, protos.iter().map(|p| p.id.to_string()));

    let format = session.format(OutputFormat::Tsv);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return session.print_structured(&protos, format);
    }

    let rows: Vec<TableRow> = protos
        .iter()
        .map(|p| {
            let size = match (p.length, p.width) {
                (Some(l), Some(w)) => format!("{}x{}", l, w),
                _ => "-".to_string(),
            };
            let lines = p.lines.iter().filter(|l| l.is_filled()).count() + usize::from(p.skid.is_some());
            TableRow::new(p.id.to_string(), &session.short_ids)
                .cell("id", CellValue::Id(p.id.to_string()))
                .cell("title", CellValue::Text(p.title.clone()))
                .cell("size", CellValue::Text(size))
                .cell("lines", CellValue::Number(lines as u64))
                .cell("cost", CellValue::Money(session.price(workshop.prototype_cost(p))))
        })
        .collect();

    let visible: Vec<&str> = COLUMNS
        .iter()
        .map(|c| c.key)
        .filter(|k| *k != "cost" || session.role.can_view_prices())
        .collect();

    TableFormatter::new(COLUMNS, "prototype", "PROT")
        .quiet(session.quiet)
        .output(&rows, format, &visible);
    Ok(())
}

fn build_prototype(session: &Session, workshop: &Workshop, args: NewArgs) -> Result<Prototype, WorkshopError> {
    let mut proto = Prototype::new(args.title, 0.0, 0.0, session.config.author());
    proto.length = args.length;
    proto.width = args.width;
    proto.height = args.height;
    check_nominal(proto.nominal())?;

    let lines = args
        .lines
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let (kind, item, quantity) = parse_line(&format!("lines[{}]", i), spec)?;
            Ok(BomLine::new(kind, item, quantity))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;
    let skid = args
        .skid
        .as_deref()
        .map(parse_skid)
        .transpose()?
        .map(|(part, quantity)| SkidRef { part, quantity });

    // composition rules come before reference lookups
    validate_prototype(proto.nominal(), &lines, skid.as_ref())?;

    for line in lines {
        let item = session.resolve(workshop, item_prefix(line.kind), &line.item)?;
        proto.add_line(line.kind, item, line.quantity);
    }
    if let Some(skid) = skid {
        let item = session.resolve(workshop, EntityPrefix::Part, &skid.part)?;
        proto.set_skid(item, skid.quantity);
    }

    Ok(proto)
}

fn run_new(args: NewArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let proto = build_prototype(session, &workshop, args)?;
    let (proto, path) = session.store().create_prototype(proto)?;

    session.done(format!("Created prototype {}", style(proto.id.to_string()).cyan()));
    if !session.quiet {
        println!("   {}", style(path.display()).dim());
        println!(
            "   {} | {} line(s){}",
            style(&proto.title).yellow(),
            proto.lines.len(),
            if proto.skid.is_some() { " + skid" } else { "" }
        );
    }
    Ok(())
}

fn find<'a>(session: &Session, workshop: &'a Workshop, reference: &str) -> Result<&'a Prototype> {
    let id = session.resolve(workshop, EntityPrefix::Prot, reference)?;
    workshop
        .prototype(&id)
        .ok_or_else(|| miette::miette!("No prototype found matching '{}'", reference))
}

fn run_show(args: ShowArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let proto = find(session, &workshop, &args.id)?;

    match session.format(OutputFormat::Auto) {
        OutputFormat::Id => println!("{}", proto.id),
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(proto, f)?,
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(proto.id.to_string()).cyan());
            println!("{}: {}", style("Title").bold(), style(&proto.title).yellow());
            println!(
                "{}: {} x {} x {}",
                style("Size").bold(),
                dimension(proto.length),
                dimension(proto.width),
                dimension(proto.height)
            );

            println!();
            println!("{}", style("Bill of materials:").bold());
            if let Some(skid) = &proto.skid {
                println!(
                    "  {:<11} {:<16} x{}",
                    "skid",
                    style(session.display_id(&skid.part)).cyan(),
                    skid.quantity
                );
            }
            for line in proto.lines.iter().filter(|l| l.is_filled()) {
                println!(
                    "  {:<11} {:<16} x{}{}",
                    line.kind.to_string(),
                    style(session.display_id(&line.item)).cyan(),
                    line.quantity,
                    line.notes
                        .as_deref()
                        .map(|n| format!("  ({})", n))
                        .unwrap_or_default()
                );
            }

            if session.role.can_view_prices() {
                println!();
                println!(
                    "{}: {}",
                    style("Cost per pallet").bold(),
                    money(Some(workshop.prototype_cost(proto)))
                );
            }

            let orders = workshop.dependents_of(&proto.id.to_string());
            if !orders.is_empty() {
                println!();
                println!("{}", style("Ordered by:").bold());
                for dep in &orders {
                    println!(
                        "  {} {} ({})",
                        style(session.display_id(&dep.id)).cyan(),
                        dep.title,
                        dep.relationship
                    );
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Author").dim(),
                proto.author,
                style("Created").dim(),
                proto.created.format("%Y-%m-%d %H:%M"),
                style("Revision").dim(),
                proto.entity_revision
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CostReport<'a> {
    prototype: String,
    title: &'a str,
    lines: Vec<CostLine>,
    total: f64,
}

fn run_cost(args: CostArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let proto = find(session, &workshop, &args.id)?;
    let report = CostReport {
        prototype: proto.id.to_string(),
        title: &proto.title,
        lines: workshop.prototype_cost_lines(proto),
        total: workshop.prototype_cost(proto),
    };

    match session.format(OutputFormat::Tsv) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(&report, f)?,
        _ => {
            println!(
                "{} {}",
                style(session.display_id(&report.prototype)).cyan(),
                style(report.title).yellow()
            );
            println!(
                "{:<11} {:<16} {:<24} {:>6} {:>10} {:>10}",
                style("KIND").bold(),
                style("ITEM").bold(),
                style("TITLE").bold(),
                style("QTY").bold(),
                style("UNIT").bold(),
                style("SUBTOTAL").bold()
            );
            for line in &report.lines {
                println!(
                    "{:<11} {:<16} {:<24} {:>6} {:>10} {:>10}",
                    line.kind,
                    session.display_id(&line.item),
                    crate::cli::helpers::truncate_str(&line.title, 23),
                    line.quantity,
                    money(session.price(line.unit_price)),
                    money(session.price(line.subtotal))
                );
            }
            println!();
            println!("{}: {}", style("Total").bold(), money(session.price(report.total)));
        }
    }
    Ok(())
}
