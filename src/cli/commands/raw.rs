//! `pws raw` command - Raw material management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{dimension, money, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::EntityPrefix;
use crate::engine::bom::parse_quantity;
use crate::engine::units::RawCategory;
use crate::entities::{RawMaterial, Receipt};

#[derive(Subcommand, Debug)]
pub enum RawCommands {
    /// List raw materials
    List(ListArgs),

    /// Register a new raw material
    New(NewArgs),

    /// Show a raw material's details
    Show(ShowArgs),

    /// Change the unit price
    SetPrice(SetPriceArgs),

    /// Book a delivery into stock
    Receive(ReceiveArgs),

    /// Delete a raw material nothing is cut from
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only this category
    #[arg(long, short = 'c')]
    pub category: Option<RawCategory>,

    /// Search in title
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Title (e.g., "Pine board 240")
    #[arg(long, short = 't')]
    pub title: String,

    /// Category (board, post, nail, fiber)
    #[arg(long, short = 'c')]
    pub category: RawCategory,

    /// Length in cm (needed to cut board and block types from it)
    #[arg(long, short = 'l')]
    pub length: Option<f64>,

    /// Width in cm
    #[arg(long)]
    pub width: Option<f64>,

    /// Thickness in cm
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Price per unit
    #[arg(long, short = 'p', default_value_t = 0.0)]
    pub price: f64,

    /// Opening stock
    #[arg(long, short = 's', default_value_t = 0)]
    pub stock: u32,

    /// Tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Raw material ID or short ID (RAW@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetPriceArgs {
    /// Raw material ID or short ID (RAW@N)
    pub id: String,

    /// New price per unit
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct ReceiveArgs {
    /// Raw material ID or short ID (RAW@N)
    pub id: String,

    /// Units received
    pub quantity: String,

    /// Price per unit on this delivery (also becomes the material's price)
    #[arg(long, short = 'p')]
    pub price: Option<f64>,

    /// Supplier name
    #[arg(long)]
    pub supplier: Option<String>,

    /// Delivery date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Raw material ID or short ID (RAW@N)
    pub id: String,
}

pub fn run(cmd: RawCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        RawCommands::List(args) => run_list(args, session),
        RawCommands::New(args) => run_new(args, &session),
        RawCommands::Show(args) => run_show(args, &session),
        RawCommands::SetPrice(args) => run_set_price(args, &session),
        RawCommands::Receive(args) => run_receive(args, &session),
        RawCommands::Delete(args) => session.delete(EntityPrefix::Raw, &args.id),
    }
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("title", "TITLE", 30),
    ColumnDef::new("category", "CATEGORY", 10),
    ColumnDef::new("length", "LENGTH", 8),
    ColumnDef::new("stock", "STOCK", 8),
    ColumnDef::new("price", "PRICE", 10),
];

fn run_list(args: ListArgs, mut session: Session) -> Result<()> {
    let workshop = session.workshop();
    let needle = args.search.as_deref().map(str::to_lowercase);

    let raws: Vec<&RawMaterial> = workshop
        .raws
        .iter()
        .filter(|r| args.category.map_or(true, |c| r.category == c))
        .filter(|r| {
            needle
                .as_deref()
                .map_or(true, |n| r.title.to_lowercase().contains(n))
        })
        .collect();

    session.remember(EntityPrefix::Raw, raws.iter().map(|r| r.id.to_string()));

    let format = session.format(OutputFormat::Tsv);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return session.print_structured(&raws, format);
    }

    let rows: Vec<TableRow> = raws
        .iter()
        .map(|r| {
            TableRow::new(r.id.to_string(), &session.short_ids)
                .cell("id", CellValue::Id(r.id.to_string()))
                .cell("title", CellValue::Text(r.title.clone()))
                .cell("category", CellValue::Type(r.category.to_string()))
                .cell("length", CellValue::Float(r.length, 1))
                .cell("stock", CellValue::Number(u64::from(r.stock)))
                .cell("price", CellValue::Money(session.price(r.unit_price)))
        })
        .collect();

    let visible: Vec<&str> = COLUMNS
        .iter()
        .map(|c| c.key)
        .filter(|k| *k != "price" || session.role.can_view_prices())
        .collect();

    TableFormatter::new(COLUMNS, "raw material", "RAW")
        .quiet(session.quiet)
        .output(&rows, format, &visible);
    Ok(())
}

fn run_new(args: NewArgs, session: &Session) -> Result<()> {
    let mut raw = RawMaterial::new(args.title, args.category, args.price, session.config.author())
        .with_stock(args.stock);
    raw.length = args.length;
    raw.width = args.width;
    raw.thickness = args.thickness;
    raw.tags = args.tags;

    let (raw, path) = session.store().create_raw(raw)?;

    session.done(format!(
        "Created raw material {}",
        style(raw.id.to_string()).cyan()
    ));
    if !session.quiet {
        println!("   {}", style(path.display()).dim());
        println!(
            "   {} | {} | stock {}",
            style(&raw.title).yellow(),
            raw.category,
            raw.stock
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Raw, &args.id)?;
    let Some(raw) = workshop.raw(&id) else {
        return Err(miette::miette!("No raw material found matching '{}'", args.id));
    };

    match session.format(OutputFormat::Auto) {
        OutputFormat::Id => println!("{}", raw.id),
        f @ (OutputFormat::Json | OutputFormat::Yaml) => session.print_structured(raw, f)?,
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(raw.id.to_string()).cyan());
            println!("{}: {}", style("Title").bold(), style(&raw.title).yellow());
            println!("{}: {}", style("Category").bold(), raw.category);
            println!("{}: {}", style("Length").bold(), dimension(raw.length));
            if raw.width.is_some() || raw.thickness.is_some() {
                println!(
                    "{}: {} x {}",
                    style("Section").bold(),
                    dimension(raw.width),
                    dimension(raw.thickness)
                );
            }
            println!("{}: {}", style("Stock").bold(), raw.stock);
            if session.role.can_view_prices() {
                println!("{}: {}", style("Unit price").bold(), money(Some(raw.unit_price)));
            }
            if !raw.tags.is_empty() {
                println!("{}: {}", style("Tags").bold(), raw.tags.join(", "));
            }

            let dependents = workshop.dependents_of(&id);
            if !dependents.is_empty() {
                println!();
                println!("{}", style("Cut into:").bold());
                for dep in &dependents {
                    println!(
                        "  {} {} ({})",
                        style(session.display_id(&dep.id)).cyan(),
                        dep.title,
                        dep.relationship
                    );
                }
            }

            let receipts: Vec<&Receipt> = workshop.receipts.iter().filter(|r| r.material == id).collect();
            if !receipts.is_empty() {
                println!();
                println!("{}", style("Receipts:").bold());
                for rcv in receipts {
                    println!(
                        "  {} +{} {}",
                        rcv.received,
                        rcv.quantity,
                        rcv.supplier.as_deref().unwrap_or("")
                    );
                }
            }

            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {} | {}: {}",
                style("Author").dim(),
                raw.author,
                style("Created").dim(),
                raw.created.format("%Y-%m-%d %H:%M"),
                style("Revision").dim(),
                raw.entity_revision
            );
        }
    }
    Ok(())
}

fn run_set_price(args: SetPriceArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Raw, &args.id)?;
    let raw = session.store().set_raw_price(&id, args.price)?;

    session.done(format!(
        "Set price of {} to {}",
        style(session.display_id(&id)).cyan(),
        money(session.price(raw.unit_price))
    ));
    Ok(())
}

fn run_receive(args: ReceiveArgs, session: &Session) -> Result<()> {
    let workshop = session.workshop();
    let id = session.resolve(&workshop, EntityPrefix::Raw, &args.id)?;
    let quantity = parse_quantity("quantity", &args.quantity).map_err(crate::core::WorkshopError::from)?;

    let mut receipt = Receipt::new(id, quantity, session.config.author());
    receipt.unit_price = args.price;
    receipt.supplier = args.supplier;
    if let Some(date) = args.date {
        receipt.received = date;
    }

    let (receipt, raw) = session.store().receive(receipt)?;

    session.done(format!(
        "Received {} x {} ({})",
        receipt.quantity,
        style(&raw.title).yellow(),
        style(receipt.id.to_string()).cyan()
    ));
    if !session.quiet {
        println!("   stock now {}", style(raw.stock).green());
    }
    Ok(())
}
