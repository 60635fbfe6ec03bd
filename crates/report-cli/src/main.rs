//! jasper-report: compile and render reports through the JasperStarter engine

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "jasper-report")]
#[command(about = "Compile and render JasperReports templates through JasperStarter")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./jasper.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the jasperstarter executable
    #[arg(long, global = true, env = "JASPERSTARTER_BIN")]
    engine_dir: Option<PathBuf>,

    /// Run the engine as this user (ignored on Windows)
    #[arg(long, global = true)]
    run_as: Option<String>,

    /// Kill the engine after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print the engine command instead of running it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print engine output as a JSON array
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .jrxml template into a .jasper file
    Compile {
        /// Template to compile
        input: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill a report and export it
    Process(commands::report::ProcessArgs),

    /// List the parameters a report declares
    #[command(alias = "params")]
    ListParameters {
        /// Report to inspect
        input: PathBuf,
    },

    /// List the supported output formats
    Formats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            commands::exit_code(&e)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Formats = cli.command {
        return commands::formats::run();
    }

    let ctx = commands::Context::new(&commands::GlobalArgs {
        config: cli.config,
        engine_dir: cli.engine_dir,
        run_as: cli.run_as,
        timeout: cli.timeout,
        dry_run: cli.dry_run,
        json: cli.json,
    })?;

    smol::block_on(async {
        match cli.command {
            Commands::Compile { input, output } => {
                commands::report::compile(&ctx, &input, output.as_deref()).await
            }
            Commands::Process(args) => commands::report::process(&ctx, args).await,
            Commands::ListParameters { input } => {
                commands::report::list_parameters(&ctx, &input).await
            }
            Commands::Formats => commands::formats::run(),
        }
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
