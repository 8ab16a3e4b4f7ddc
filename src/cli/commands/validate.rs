//! `pws validate` command - Re-check every entity file and invariant

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::ErrorPayload;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Show summary only, don't show individual problems
    #[arg(long)]
    pub summary: bool,
}

/// One problem, for structured output
#[derive(Serialize)]
struct Problem {
    /// Entity ID, or the file path when the file did not parse
    subject: String,
    #[serde(flatten)]
    error: ErrorPayload,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let mut workshop = session.workshop();
    let issues = workshop.issues();
    let failures = std::mem::take(&mut workshop.failures);

    let checked = workshop.raws.len()
        + workshop.parts.len()
        + workshop.prototypes.len()
        + workshop.orders.len()
        + workshop.receipts.len();
    let problems = failures.len() + issues.len();

    let format = session.format(OutputFormat::Auto);
    let structured = matches!(format, OutputFormat::Json | OutputFormat::Yaml);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let mut report: Vec<Problem> = Vec::with_capacity(problems);
            for (path, error) in failures {
                report.push(Problem {
                    subject: path.display().to_string(),
                    error: crate::core::WorkshopError::from(error).payload(),
                });
            }
            for issue in &issues {
                report.push(Problem {
                    subject: issue.id.clone(),
                    error: issue.error.payload(),
                });
            }
            if format == OutputFormat::Yaml {
                print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
            } else {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            }
        }
        _ => {
            if !args.summary {
                for (path, error) in failures {
                    println!("{} {}", style("✗").red(), path.display());
                    eprintln!("{:?}", miette::Report::new(error));
                }
                for issue in &issues {
                    println!(
                        "{} {} [{}] {}",
                        style("✗").red(),
                        style(session.display_id(&issue.id)).cyan(),
                        issue.error.code(),
                        issue.error
                    );
                }
                if problems > 0 {
                    println!();
                }
            }

            println!("{}", style("Validation Summary").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!("  Entities loaded: {}", checked);
            println!("  Problems:        {}", style(problems).red());
            println!();
        }
    }

    if problems > 0 {
        return Err(miette::miette!(
            "Validation failed: {} problem{} found",
            problems,
            if problems == 1 { "" } else { "s" }
        ));
    }

    if !session.quiet && !structured {
        println!("{} All entities passed validation!", style("✓").green().bold());
    }
    Ok(())
}
