//! `pws init` command - Initialize a new workshop project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError, PROJECT_DIR};
use crate::core::EntityPrefix;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the project config even if .pws/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        tracing::debug!(path = %path.display(), "created project directory");
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized workshop project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            if global.quiet {
                return Ok(());
            }
            println!();
            println!("Created project structure:");
            print_structure(project.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Register a raw material",
                style("pws raw new --title \"Pine 240\" --category board --length 240 --price 6").yellow()
            );
            println!(
                "  {} Preview how many board types it yields",
                style("pws part preview --category board-type --parent RAW@1 --length 100").yellow()
            );
            println!("  {} Check every file", style("pws validate").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Workshop project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("pws init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let mut entries = vec![format!("{}/", PROJECT_DIR), format!("{}/config.yaml", PROJECT_DIR)];
    entries.extend(
        EntityPrefix::all()
            .iter()
            .map(|p| format!("{}/", Project::entity_directory(*p))),
    );

    for entry in entries {
        if root.join(&entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
