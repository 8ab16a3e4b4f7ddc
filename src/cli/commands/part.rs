//! `pws part` command - Composite part management (board, block and skid types)

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{dimension, money, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{EntityPrefix, Workshop, WorkshopError};
use crate::engine::stock::validate_stock_request;
use crate::engine::units::{PartCategory, SKID_BLOCK_UNITS, SKID_BOARD_UNITS};
use crate::engine::ValidationError;
use crate::entities::CompositePart;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List composite parts with stock and capacity
    List(ListArgs),

    /// Create a part; its stock must fit what the parents can yield
    New(NewArgs),

    /// Show a part's details
    Show(ShowArgs),

    /// Compute yield, capacity and price without saving anything
    Preview(PreviewArgs),

    /// Change stock, re-checked against current parent stock
    SetStock(SetStockArgs),

    /// Set or clear an explicit unit price
    SetPrice(SetPriceArgs),

    /// Delete a part nothing uses
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only this category (board-type, block-type, skid-type)
    #[arg(long, short = 'c')]
    pub category: Option<PartCategory>,

    /// Search in title
    #[arg(long)]
    pub search: Option<String>,
}

/// What a part is made from
#[derive(clap::Args, Debug, Clone)]
pub struct PartSpec {
    /// Category (board-type, block-type, skid-type)
    #[arg(long, short = 'c')]
    pub category: PartCategory,

    /// Raw material a board or block type is cut from
    #[arg(long)]
    pub parent: Option<String>,

    /// Board type a skid is assembled from
    #[arg(long)]
    pub board: Option<String>,

    /// Board-type units per skid
    #[arg(long, default_value_t = SKID_BOARD_UNITS)]
    pub board_units: u32,

    /// Block type a skid is assembled from
    #[arg(long)]
    pub block: Option<String>,

    /// Block-type units per skid
    #[arg(long, default_value_t = SKID_BLOCK_UNITS)]
    pub block_units: u32,

    /// Cut length in cm
    #[arg(long, short = 'l')]
    pub length: Option<f64>,

    /// Saw kerf in cm (default from config)
    #[arg(long)]
    pub kerf: Option<f64>,

    /// Requested stock
    #[arg(long, short = 's', default_value_t = 0)]
    pub stock: u32,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title (e.g., "Deck board 120")
    #[arg(long, short = 't')]
    pub title: String,

    #[command(flatten)]
    pub spec: PartSpec,

    /// Width in cm
    #[arg(long)]
    pub width: Option<f64>,

    /// Thickness in cm
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Explicit unit price instead of the derived one
    #[arg(long, short = 'p')]
    pub price: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub spec: PartSpec,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part ID or short ID (PART@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStockArgs {
    /// Part ID or short ID (PART@N)
    pub id: String,

    /// New stock
    pub stock: u32,
}

#[derive(clap::Args, Debug)]
pub struct SetPriceArgs {
    /// Part ID or short ID (PART@N)
    pub id: String,

    /// New unit price
    #[arg(required_unless_present = "clear")]
    pub price: Option<f64>,

    /// Go back to the derived price
    #[arg(long, conflicts_with = "price")]
    pub clear: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Part ID or short ID (PART@N)
    pub id: String,
}

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        PartCommands::List(args) => run_list(args, session),
        PartCommands::New(args) => run_new(args, &session),
        PartCommands::Show(args) => run_show(args, &session),
        PartCommands::Preview(args) => run_preview(args, &session),
        PartCommands::SetStock(args) => run_set_stock(args, &session),
        PartCommands::SetPrice(args) => run_set_price(args, &session),
        PartCommands::Delete(args) => session.delete(EntityPrefix::Part, &args.id),
    }
}

/// Build an unsaved part from command-line references
fn build_part(
    session: &Session,
    workshop: &Workshop,
    title: String,
    spec: &PartSpec,
) -> Result<CompositePart, WorkshopError> {
    let part = if spec.category.is_cut() {
        let parent = spec.parent.as_deref().ok_or_else(|| {
            ValidationError::field("parent", format!("a {} needs --parent <RAW>", spec.category))
        })?;
        let parent = session.resolve(workshop, EntityPrefix::Raw, parent)?;
        let length = spec.length.ok_or_else(|| {
            ValidationError::field("length", format!("a {} needs --length", spec.category))
        })?;
        let kerf = spec.kerf.unwrap_or_else(|| session.config.kerf_margin());
        CompositePart::cut(title, spec.category, parent, length, kerf, session.config.author())
    } else {
        let (Some(board), Some(block)) = (spec.board.as_deref(), spec.block.as_deref()) else {
            return Err(ValidationError::field("parents", "a skid_type needs --board <PART> and --block <PART>").into());
        };
        let board = session.resolve(workshop, EntityPrefix::Part, board)?;
        let block = session.resolve(workshop, EntityPrefix::Part, block)?;
        let mut part = CompositePart::skid(
            title,
            (board, spec.board_units),
            (block, spec.block_units),
            session.config.author(),
        );
        part.length = spec.length;
        part
    };

    Ok(part.with_stock(spec.stock))
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("title", "TITLE", 28),
    ColumnDef::new("category", "CATEGORY", 11),
    ColumnDef::new("stock", "STOCK", 8),
    ColumnDef::new("capacity", "CAPACITY", 9),
    ColumnDef::new("price", "PRICE", 10),
];

fn run_list(args: ListArgs, mut session: Session) -> Result<()> {
    let workshop = session.workshop();
    let needle = args.search.as_deref().map(str::to_lowercase);

    let parts: Vec<&CompositePart> = workshop
        .parts
        .iter()
        .filter(|p| args.category.map_or(true, |c| p.category == c))
        .filter(|p| {
            needle
                .as_deref()
                .map_or(true, |n| p.title.to_lowercase().contains(n))
        })
        .collect();

    session.remember(EntityPrefix::Part, parts.iter().map(|p| p.id.to_string()));

    let format = session.format(OutputFormat::Tsv);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        let views: Vec<PartView> = parts.iter().map(|p| PartView::new(&workshop, p)).collect();
        return session.print_structured(&views, format);
    }

    let rows: Vec<TableRow> = parts
        .iter()
        .map(|p| {
            let capacity = workshop.capacity(p);
            TableRow::new(p.id.to_string(), &session.short_ids)
                .cell("id", CellValue::Id(p.id.to_string()))
                .cell("title", CellValue::Text(p.title.clone()))
                .cell("category", CellValue::Type(p.category.to_string()))
                .cell(
                    "stock",
                    CellValue::Stock {
                        stock: u64::from(p.stock),
                        capacity,
                    },
                )
                .cell("capacity", CellValue::Number(capacity))
                .cell("price", CellValue::Money(session.price(workshop.part_price(p))))
        })
        .collect();

    let visible: Vec<&str> = COLUMNS
        .iter()
        .map(|c| c.key)
        .filter(|k| *k != "price" || session.role.can_view_prices())
        .collect();

    TableFormatter::new(COLUMNS, "part", "PART")
        .quiet(session.quiet)
        .output(&rows, format, &visible);
    Ok(())
}

/// A part with its derived figures, for structured output
#[derive(Serialize)]
struct PartView<'a> {
    #[serde(flatten)]
    part: &'a CompositePart,
    pieces_per_parent: Option<u64>,
    capacity: u64,
    resolved_price: f64,
}

impl<'a> PartView<'a> {
    fn new(workshop: &Workshop, part: &'a CompositePart) -> Self {
        Self {
            part,
            pieces_per_parent: workshop.pieces_per_parent(part),
            capacity: workshop.capacity(part),
            resolved_price: workshop.part_price(part),
        }
    }
}

fn run_new(args: NewArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let mut part = build_part(session, &workshop, args.title, &args.spec)?;
    part.width = args.width;
    part.thickness = args.thickness;
    part.unit_price = args.price;

    let (part, capacity) = session.store().create_part(part)?;

    session.done(format!("Created part {}", style(part.id.to_string()).cyan()));
    if !session.quiet {
        println!(
            "   {} | {} | stock {} of {} possible",
            style(&part.title).yellow(),
            part.category,
            part.stock,
            capacity
        );
    }
    Ok(())
}

/// Result of a capacity preview
#[derive(Serialize)]
struct Preview {
    category: PartCategory,
    pieces_per_parent: Option<u64>,
    capacity: u64,
    requested: u32,
    unit_price: f64,
}

fn run_preview(args: PreviewArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let part = build_part(session, &workshop, "preview".to_string(), &args.spec)?;
    workshop.check_structure(&part).map_err(WorkshopError::from)?;

    let preview = Preview {
        category: part.category,
        pieces_per_parent: workshop.pieces_per_parent(&part),
        capacity: workshop.capacity(&part),
        requested: part.stock,
        unit_price: workshop.part_price(&part),
    };

    match session.format(OutputFormat::Auto) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(&preview, f)?,
        _ => {
            if let Some(pieces) = preview.pieces_per_parent {
                println!("{}: {}", style("Pieces per parent").bold(), pieces);
            }
            println!("{}: {}", style("Capacity").bold(), style(preview.capacity).green());
            if session.role.can_view_prices() {
                println!("{}: {}", style("Unit price").bold(), money(Some(preview.unit_price)));
            }
        }
    }

    validate_stock_request(u64::from(preview.requested), preview.capacity)
        .map_err(WorkshopError::from)?;
    Ok(())
}

fn run_show(args: ShowArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Part, &args.id)?;
    let Some(part) = workshop.part(&id) else {
        return Err(miette::miette!("No part found matching '{}'", args.id));
    };

    match session.format(OutputFormat::Auto) {
        OutputFormat::Id => println!("{}", part.id),
        f @ (OutputFormat::Json | OutputFormat::Yaml) => {
            session.print_structured(&PartView::new(&workshop, part), f)?
        }
        _ => {
            let capacity = workshop.capacity(part);
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(part.id.to_string()).cyan());
            println!("{}: {}", style("Title").bold(), style(&part.title).yellow());
            println!("{}: {}", style("Category").bold(), part.category);
            println!("{}: {}", style("Length").bold(), dimension(part.length));
            if part.category.is_cut() {
                println!("{}: {} cm", style("Kerf").bold(), part.kerf_margin);
            }

            println!();
            println!("{}", style("Parents:").bold());
            for parent in &part.parents {
                let title = workshop
                    .raw(&parent.id)
                    .map(|r| r.title.as_str())
                    .or_else(|| workshop.part(&parent.id).map(|p| p.title.as_str()))
                    .unwrap_or("(missing)");
                println!(
                    "  {} {} x{}",
                    style(session.display_id(&parent.id)).cyan(),
                    title,
                    parent.units
                );
            }
            if let Some(pieces) = workshop.pieces_per_parent(part) {
                println!("{}: {}", style("Pieces per parent").bold(), pieces);
            }

            println!();
            let stock = if u64::from(part.stock) > capacity {
                style(part.stock.to_string()).red().bold()
            } else {
                style(part.stock.to_string()).green()
            };
            println!("{}: {} / {} possible", style("Stock").bold(), stock, capacity);

            if session.role.can_view_prices() {
                let source = if part.unit_price.is_some() { "explicit" } else { "derived" };
                println!(
                    "{}: {} ({})",
                    style("Unit price").bold(),
                    money(Some(workshop.part_price(part))),
                    source
                );
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Author").dim(),
                part.author,
                style("Created").dim(),
                part.created.format("%Y-%m-%d %H:%M"),
                style("Revision").dim(),
                part.entity_revision
            );
        }
    }
    Ok(())
}

fn run_set_stock(args: SetStockArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Part, &args.id)?;
    let (part, capacity) = session.store().set_part_stock(&id, args.stock)?;

    session.done(format!(
        "Stock of {} set to {} (capacity {})",
        style(session.display_id(&id)).cyan(),
        part.stock,
        capacity
    ));
    Ok(())
}

fn run_set_price(args: SetPriceArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Part, &args.id)?;
    let price = if args.clear { None } else { args.price };
    let part = session.store().set_part_price(&id, price)?;

    let label = if part.unit_price.is_some() { "explicit" } else { "derived" };
    session.done(format!(
        "Price of {} is now {} ({})",
        style(session.display_id(&id)).cyan(),
        money(session.price(part.unit_price.unwrap_or_else(|| workshop.part_price(&part)))),
        label
    ));
    Ok(())
}
