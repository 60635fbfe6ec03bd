use super::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use indexmap::IndexMap;
use report_executor::{Command, ProcessOptions, user};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Report to fill (.jrxml or .jasper)
    input: PathBuf,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format, repeatable (default: pdf)
    #[arg(short, long = "format", value_delimiter = ',')]
    formats: Vec<String>,

    /// Report locale, e.g. en_US
    #[arg(long)]
    locale: Option<String>,

    /// Report parameter as key=value, repeatable
    #[arg(short = 'P', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Named connection from the config file
    #[arg(long)]
    connection: Option<String>,

    /// Database connection setting as key=value, repeatable
    #[arg(long = "db", value_parser = parse_key_value)]
    db: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

impl ProcessArgs {
    /// Untyped options for this request, before config defaults are applied
    fn to_options(&self, ctx: &Context) -> Result<ProcessOptions> {
        let mut db_connection = match &self.connection {
            Some(name) => Some(ctx.config.connection(name)?.clone()),
            None => None,
        };
        if !self.db.is_empty() {
            db_connection
                .get_or_insert_with(IndexMap::new)
                .extend(self.db.iter().cloned());
        }

        Ok(ProcessOptions {
            format: (!self.formats.is_empty()).then(|| self.formats.clone()),
            params: (!self.params.is_empty()).then(|| self.params.iter().cloned().collect()),
            locale: self.locale.clone(),
            db_connection,
        })
    }
}

pub async fn compile(ctx: &Context, input: &Path, output: Option<&Path>) -> Result<()> {
    let command = ctx.engine.builder().compile(input, output)?;
    run(ctx, command).await
}

pub async fn process(ctx: &Context, args: ProcessArgs) -> Result<()> {
    let options = args.to_options(ctx)?.with_defaults(&ctx.config.defaults);
    let command = ctx
        .engine
        .builder()
        .process_with(&args.input, args.output.as_deref(), &options)?;
    run(ctx, command).await
}

pub async fn list_parameters(ctx: &Context, input: &Path) -> Result<()> {
    let command = ctx.engine.builder().list_parameters(input)?;
    run(ctx, command).await
}

async fn run(ctx: &Context, command: Command) -> Result<()> {
    if ctx.dry_run {
        let command = match ctx.engine.user() {
            Some(user) => user::run_as(command, user),
            None => command,
        };
        if let Some(dir) = command.get_current_dir() {
            println!("# working directory: {}", dir.display());
        }
        println!("{}", command.redacted());
        return Ok(());
    }

    let lines = ctx
        .engine
        .executor()
        .execute(&command, ctx.engine.user())
        .await
        .context("Report engine failed")?;
    info!(lines = lines.len(), "Engine output collected");

    ctx.print_lines(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("date=2024-01-01").unwrap(),
            ("date".to_string(), "2024-01-01".to_string())
        );
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
