pub mod formats;
pub mod report;

use anyhow::{Context as _, Result};
use report_config::{Config, parser};
use report_executor::{ReportEngine, engine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

/// Flags shared by every subcommand
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub engine_dir: Option<PathBuf>,
    pub run_as: Option<String>,
    pub timeout: Option<u64>,
    pub dry_run: bool,
    pub json: bool,
}

/// Everything a subcommand needs, resolved once from flags and config
pub struct Context {
    pub config: Config,
    pub engine: ReportEngine,
    pub dry_run: bool,
    pub json: bool,
}

impl Context {
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let config = parser::load(args.config.as_deref()).context("Failed to load configuration")?;

        // Flags override the config file
        let install_dir = args
            .engine_dir
            .clone()
            .or_else(|| config.engine.install_dir.clone());
        let locator = engine::locate(install_dir).context("Failed to locate the engine")?;
        debug!(executable = %locator.executable().display(), "Engine located");

        let mut engine = ReportEngine::new(locator).with_env(config.engine.env.clone());

        let timeout = match args.timeout {
            Some(0) => anyhow::bail!("--timeout must be greater than zero"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.engine.timeout(),
        };
        if let Some(timeout) = timeout {
            engine = engine.with_timeout(timeout);
        }

        if let Some(user) = args.run_as.clone().or_else(|| config.engine.run_as.clone()) {
            engine = engine.with_user(user);
        }

        Ok(Self {
            config,
            engine,
            dry_run: args.dry_run,
            json: args.json,
        })
    }

    /// Print engine output lines, as plain text or a JSON array
    pub fn print_lines(&self, lines: &[String]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(lines)?);
        } else {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

/// Process exit code for a failed run: the engine's own code when it failed, 1 otherwise
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    let engine_code = err
        .downcast_ref::<report_executor::Error>()
        .and_then(|e| e.exit_code())
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0);

    ExitCode::from(engine_code.unwrap_or(1))
}
