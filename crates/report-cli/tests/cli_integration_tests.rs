//! Integration tests for the jasper-report CLI
//!
//! These drive the built binary. Most use `--dry-run`, which prints the engine
//! command line without needing a real engine.

#![cfg(unix)]

use anyhow::Result;

mod common;
use common::CliTestContext;

#[test]
fn test_formats_lists_every_format() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&["formats"])?;
    output.assert_success();

    let formats: Vec<_> = output.stdout.lines().collect();
    assert_eq!(
        formats,
        vec![
            "pdf", "rtf", "xls", "xlsx", "docx", "odt", "ods", "pptx", "csv", "html", "xhtml",
            "xml", "jrprint"
        ]
    );
    Ok(())
}

#[test]
fn test_compile_dry_run() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--dry-run",
        "compile",
        "/srv/reports/invoice.jrxml",
        "-o",
        "/tmp/invoice",
    ])?;

    let expected = format!(
        "{}/jasperstarter compile \"invoice.jrxml\" -o \"/tmp/invoice\"",
        ctx.engine_dir.display()
    );
    output
        .assert_success()
        .assert_contains("# working directory: /srv/reports")
        .assert_contains(&expected);
    Ok(())
}

#[test]
fn test_process_dry_run_full_grammar() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "-f",
        "pdf,xlsx",
        "--locale",
        "en_US",
        "-P",
        "date=2024-01-01",
        "--db",
        "driver=postgresql",
        "--db",
        "host=localhost",
    ])?;

    output
        .assert_success()
        .assert_contains("--locale en_US process \"sales.jasper\" -f pdf xlsx")
        .assert_contains("-P date=\"2024-01-01\"")
        .assert_contains("-t postgresql -H localhost");
    Ok(())
}

#[test]
fn test_process_defaults_to_pdf() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&["--dry-run", "process", "/srv/reports/sales.jasper"])?;
    output
        .assert_success()
        .assert_contains("process \"sales.jasper\" -f pdf")
        .assert_not_contains("-P");
    Ok(())
}

#[test]
fn test_invalid_format_rejected() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "-f",
        "pdf",
        "-f",
        "gif",
    ])?;
    output
        .assert_failure()
        .assert_exit_code(1)
        .assert_contains("invalid output format: 'gif'");
    Ok(())
}

#[test]
fn test_list_parameters_alias() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&["--dry-run", "params", "/srv/reports/sales.jasper"])?;
    output
        .assert_success()
        .assert_contains("list_parameters \"sales.jasper\"");
    Ok(())
}

#[test]
fn test_config_defaults_and_connection() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let config = ctx.create_config(
        "reports.yaml",
        r#"
version: "1.0"
defaults:
  locale: de_DE
  format: [xlsx]
  params:
    company: ACME
connections:
  warehouse:
    driver: postgres
    host: db.internal
    port: "5432"
"#,
    )?;

    let output = ctx.run_cli_command(&[
        "--config",
        config.to_str().unwrap(),
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "-P",
        "year=2024",
        "--connection",
        "warehouse",
    ])?;

    output
        .assert_success()
        .assert_contains("--locale de_DE process")
        .assert_contains("-f xlsx")
        .assert_contains("-P company=\"ACME\" year=\"2024\"")
        .assert_contains("-t postgres -H db.internal --db-port 5432");
    Ok(())
}

#[test]
fn test_unknown_connection_rejected() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "--connection",
        "missing",
    ])?;
    output
        .assert_failure()
        .assert_contains("Connection 'missing' not found");
    Ok(())
}

#[test]
fn test_run_as_dry_run_wraps_command() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--run-as",
        "reports",
        "--dry-run",
        "compile",
        "/srv/reports/invoice.jrxml",
    ])?;
    output
        .assert_success()
        .assert_contains("su 'reports' -c '")
        .assert_contains("compile \"invoice.jrxml\"'");
    Ok(())
}

#[test]
fn test_run_as_dry_run_masks_password() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_cli_command(&[
        "--run-as",
        "reports",
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "--db",
        "username=admin",
        "--db",
        "password=s3cret",
    ])?;
    output
        .assert_success()
        .assert_contains("su 'reports' -c '")
        .assert_contains("-u admin -p ******")
        .assert_not_contains("s3cret");
    Ok(())
}

#[test]
fn test_param_name_with_shell_characters_rejected() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let marker = ctx.test_dir().join("marker");
    let param = format!("x;touch {};y=v", marker.display());
    let output = ctx.run_cli_command(&[
        "--dry-run",
        "process",
        "/srv/reports/sales.jasper",
        "-P",
        param.as_str(),
    ])?;
    output
        .assert_failure()
        .assert_exit_code(1)
        .assert_contains("invalid report parameter name");
    assert!(!marker.exists());
    Ok(())
}

#[test]
fn test_missing_engine_directory() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let output = ctx.run_raw(&[
        "--engine-dir",
        "/definitely/not/installed",
        "compile",
        "/srv/reports/invoice.jrxml",
    ])?;
    output
        .assert_failure()
        .assert_exit_code(1)
        .assert_contains("engine resource directory not found");
    Ok(())
}

#[test]
fn test_invalid_config_version() -> Result<()> {
    let ctx = CliTestContext::new()?;
    let config = ctx.create_config("bad.yaml", "version: \"9.9\"\n")?;
    let output = ctx.run_cli_command(&[
        "--config",
        config.to_str().unwrap(),
        "--dry-run",
        "compile",
        "/srv/reports/invoice.jrxml",
    ])?;
    output
        .assert_failure()
        .assert_contains("Unsupported version");
    Ok(())
}
