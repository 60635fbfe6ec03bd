//! Common test utilities for CLI integration tests

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test context with an isolated working directory and engine directory
pub struct CliTestContext {
    pub test_dir: TempDir,
    pub engine_dir: PathBuf,
    pub binary: PathBuf,
}

impl CliTestContext {
    /// Create a new context; the engine directory exists but holds no engine
    pub fn new() -> Result<Self> {
        let test_dir = TempDir::new()?;
        let engine_dir = test_dir.path().join("engine").join("bin");
        std::fs::create_dir_all(&engine_dir)?;

        Ok(Self {
            test_dir,
            engine_dir,
            binary: PathBuf::from(env!("CARGO_BIN_EXE_jasper-report")),
        })
    }

    /// Run the CLI with `--engine-dir` pointing at the test engine directory
    pub fn run_cli_command(&self, args: &[&str]) -> Result<CliOutput> {
        let engine_dir = self.engine_dir.to_string_lossy().into_owned();
        let mut full_args = vec!["--engine-dir", engine_dir.as_str()];
        full_args.extend_from_slice(args);
        self.run_raw(&full_args)
    }

    /// Run the CLI with exactly `args`
    pub fn run_raw(&self, args: &[&str]) -> Result<CliOutput> {
        let output = Command::new(&self.binary)
            .current_dir(self.test_dir.path())
            .env_remove("JASPERSTARTER_BIN")
            .args(args)
            .output()?;

        Ok(CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            exit_code: output.status.code(),
        })
    }

    /// Create a configuration file in the test directory
    pub fn create_config(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let config_path = self.test_dir.path().join(filename);
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    /// Get the test directory path
    pub fn test_dir(&self) -> &Path {
        self.test_dir.path()
    }
}

#[derive(Debug)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.success {
            panic!(
                "Command failed with exit code {:?}\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.exit_code, self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.success {
            panic!(
                "Command succeeded but was expected to fail\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_contains(&self, text: &str) -> &Self {
        if !self.stdout.contains(text) && !self.stderr.contains(text) {
            panic!(
                "Output does not contain '{}'\nSTDOUT:\n{}\nSTDERR:\n{}",
                text, self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_not_contains(&self, text: &str) -> &Self {
        if self.stdout.contains(text) || self.stderr.contains(text) {
            panic!(
                "Output unexpectedly contains '{}'\nSTDOUT:\n{}\nSTDERR:\n{}",
                text, self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_exit_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.exit_code,
            Some(code),
            "STDOUT:\n{}\nSTDERR:\n{}",
            self.stdout,
            self.stderr
        );
        self
    }
}
