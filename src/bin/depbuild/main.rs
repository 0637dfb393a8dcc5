//! depbuild CLI - builds a fixed set of third-party native libraries

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{MissingState, Session};
use depbuild::core::error::BuildError;
use depbuild::util::diagnostic::{emit, suggestions, Diagnostic};
use depbuild::util::shell::Shell;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("depbuild=debug")
    } else {
        EnvFilter::new("depbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli, &shell) {
        emit(&to_diagnostic(&e), shell.use_color());
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Completions never touch the working directory or its config.
    let session = || Session::new(cli.work_dir.as_deref(), &cli.state, shell);

    match cli.command {
        Commands::Init(args) => commands::init::execute(&session()?, args),
        Commands::Tool(args) => commands::tool::execute(&session()?, args),
        Commands::Lib(args) => commands::lib::execute(&session()?, args),
        Commands::All => commands::all::execute(&session()?),
        Commands::Show(args) => commands::show::execute(&session()?, args),
        Commands::Doctor => commands::doctor::execute(&session()?),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render an error with its context chain and a hint.
fn to_diagnostic(err: &anyhow::Error) -> Diagnostic {
    if let Some(build_err) = err.downcast_ref::<BuildError>() {
        let root = build_err.to_string();
        let mut diag = build_err.to_diagnostic();
        for cause in err.chain().map(|c| c.to_string()).take_while(|c| *c != root) {
            diag = diag.with_context(cause);
        }
        return diag;
    }

    let mut diag = Diagnostic::error(format!("{:#}", err));
    if err.downcast_ref::<MissingState>().is_some() {
        diag = diag.with_suggestion(suggestions::NO_STATE);
    } else if err
        .chain()
        .any(|cause| cause.downcast_ref::<reqwest::Error>().is_some())
    {
        diag = diag.with_suggestion(suggestions::FETCH_FAILED);
    }
    diag
}
