use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use lem::cli::{Cli, Commands};
use lem::commands::{self, LemContext};
use lem::watch::CancelToken;
use std::io;
use std::process;

fn main() {
    let cli = Cli::parse();
    let no_color = cli.no_color;
    if let Err(e) = run(cli) {
        let (label, cause_label) = if no_color {
            ("Error:".normal(), "caused by:".normal())
        } else {
            ("Error:".red().bold(), "caused by:".red())
        };
        eprintln!("{label} {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  {cause_label} {cause}");
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    lem::logging::init(cli.verbose);

    let ctx = LemContext::new(&cli.config, cli.no_color);

    match cli.command {
        Commands::Init { force } => {
            commands::init::execute(force, &mut ctx.output())?;
        }
        Commands::Validate => {
            commands::validate::execute(&ctx)?;
        }
        Commands::Current => {
            commands::current::execute(&ctx)?;
        }
        Commands::Switch { stage } => {
            commands::switch::execute(&ctx, &stage)?;
        }
        Commands::List { stage } => {
            commands::list::execute(&ctx, stage.as_deref())?;
        }
        Commands::Run { stage } => {
            commands::run::execute(&ctx, stage.as_deref())?;
        }
        Commands::Watch { stage } => {
            let cancel = CancelToken::new();
            let handle = cancel.clone();
            ctrlc::set_handler(move || {
                tracing::debug!("Interrupt received");
                handle.cancel();
            })?;
            commands::watch::execute(&ctx, stage.as_deref(), &cancel)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
