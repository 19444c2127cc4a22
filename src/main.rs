use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ferre::cli::{commands, Cli, Commands};

/// Environment variable holding a tracing filter, e.g. `ferre=debug`
const LOG_ENV: &str = "FERRE_LOG";

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("ferre={}", level))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::Product(cmd) => commands::product::run(cmd, &cli.global),
        Commands::Proforma(cmd) => commands::proforma::run(cmd, &cli.global),
        Commands::Measure(cmd) => commands::measure::run(cmd, &cli.global),
        Commands::Config(cmd) => commands::config::run(cmd, &cli.global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
