//! `pws where-used` command - Find what references an entity

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{EntityId, EntityPrefix, Workshop, WorkshopError};

#[derive(clap::Args, Debug)]
pub struct WhereUsedArgs {
    /// Entity ID or short ID to search for (e.g., RAW@1, PART@3, PROT@2)
    pub id: String,
}

/// Entity types that can be referenced by others
const REFERENCED: &[EntityPrefix] = &[EntityPrefix::Raw, EntityPrefix::Part, EntityPrefix::Prot];

/// Resolve a reference of any referenced type
fn resolve_any(session: &Session, workshop: &Workshop, reference: &str) -> Result<String, WorkshopError> {
    let expanded = session
        .short_ids
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string());
    if let Ok(id) = expanded.parse::<EntityId>() {
        return workshop.resolve(id.prefix(), &expanded);
    }

    let mut found: Vec<String> = REFERENCED
        .iter()
        .filter_map(|p| workshop.resolve(*p, &expanded).ok())
        .collect();
    match found.len() {
        0 => Err(WorkshopError::not_found("entity", reference)),
        1 => Ok(found.remove(0)),
        _ => Err(WorkshopError::AmbiguousId {
            kind: "entity",
            reference: reference.to_string(),
            matches: found,
        }),
    }
}

pub fn run(args: WhereUsedArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let workshop = session.workshop();
    let id = resolve_any(&session, &workshop, &args.id)?;
    let dependents = workshop.dependents_of(&id);

    match session.format(OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&dependents).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&dependents).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for dep in &dependents {
                println!("{}", dep.id);
            }
        }
        OutputFormat::Csv => {
            println!("ref_id,ref_type,title,relationship");
            for dep in &dependents {
                println!(
                    "{},{},{},{}",
                    dep.id,
                    dep.kind,
                    escape_csv(&dep.title),
                    escape_csv(&dep.relationship)
                );
            }
        }
        _ => {
            if !session.quiet {
                println!(
                    "{} {}\n",
                    style("References to:").bold(),
                    style(session.display_id(&id)).cyan()
                );
            }
            if dependents.is_empty() {
                println!("{}", style("No references found.").yellow());
                return Ok(());
            }

            println!(
                "{:<16} {:<10} {:<28} {}",
                style("REF ID").bold(),
                style("TYPE").bold(),
                style("TITLE").bold(),
                style("RELATIONSHIP").bold()
            );
            println!("{}", "-".repeat(76));
            for dep in &dependents {
                println!(
                    "{:<16} {:<10} {:<28} {}",
                    style(session.display_id(&dep.id)).cyan(),
                    dep.kind.to_string(),
                    crate::cli::helpers::truncate_str(&dep.title, 27),
                    dep.relationship
                );
            }
            if !session.quiet {
                println!();
                println!("{} reference(s) found.", style(dependents.len()).cyan());
            }
        }
    }

    Ok(())
}
