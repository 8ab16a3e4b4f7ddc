use clap::Parser;
use miette::Result;
use pws::cli::{Cli, Commands, OutputFormat};
use pws::core::WorkshopError;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` ends quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .wrap_lines(false)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    pws::logging::init(global.verbose);

    let result = match cli.command {
        Commands::Init(args) => pws::cli::commands::init::run(args, &global),
        Commands::Raw(cmd) => pws::cli::commands::raw::run(cmd, &global),
        Commands::Part(cmd) => pws::cli::commands::part::run(cmd, &global),
        Commands::Proto(cmd) => pws::cli::commands::proto::run(cmd, &global),
        Commands::Order(cmd) => pws::cli::commands::order::run(cmd, &global),
        Commands::WhereUsed(args) => pws::cli::commands::where_used::run(args, &global),
        Commands::Validate(args) => pws::cli::commands::validate::run(args, &global),
        Commands::Report(cmd) => pws::cli::commands::report::run(cmd, &global),
    };

    if let Err(report) = &result {
        tracing::debug!(error = %report, "command failed");
        if global.format == OutputFormat::Json {
            if let Some(err) = report.downcast_ref::<WorkshopError>() {
                if let Ok(json) = serde_json::to_string(&err.payload()) {
                    eprintln!("{}", json);
                }
            }
        }
    }
    result
}
