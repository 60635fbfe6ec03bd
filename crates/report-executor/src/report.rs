//! One-call report operations: build a command and run it

use crate::builder::CommandBuilder;
use crate::engine::EngineLocator;
use crate::error::Result;
use crate::executor::ProcessExecutor;
use crate::options::{OptionSet, ProcessOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A builder and an executor sharing one engine location
#[derive(Debug, Clone)]
pub struct ReportEngine {
    builder: CommandBuilder,
    executor: ProcessExecutor,
    run_as: Option<String>,
}

impl ReportEngine {
    /// Create an engine facade for `locator`
    pub fn new(locator: Arc<dyn EngineLocator>) -> Self {
        Self {
            builder: CommandBuilder::new(locator.clone()),
            executor: ProcessExecutor::new(locator),
            run_as: None,
        }
    }

    /// Run every command as `user`
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.run_as = Some(user.into());
        self
    }

    /// Kill commands running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Extra environment for the engine process
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.builder = self.builder.with_env(env);
        self
    }

    /// The command builder
    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    /// The executor
    pub fn executor(&self) -> &ProcessExecutor {
        &self.executor
    }

    /// User commands run as, if any
    pub fn user(&self) -> Option<&str> {
        self.run_as.as_deref()
    }

    /// Compile a template
    pub async fn compile(&self, input: impl AsRef<Path>, output: Option<&Path>) -> Result<Vec<String>> {
        let command = self.builder.compile(input, output)?;
        self.executor.execute(&command, self.user()).await
    }

    /// Fill and export a report
    pub async fn process(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        options: &OptionSet,
    ) -> Result<Vec<String>> {
        let command = self.builder.process(input, output, options)?;
        self.executor.execute(&command, self.user()).await
    }

    /// Fill and export a report from untyped options
    pub async fn process_with(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        options: &ProcessOptions,
    ) -> Result<Vec<String>> {
        let command = self.builder.process_with(input, output, options)?;
        self.executor.execute(&command, self.user()).await
    }

    /// List the parameters a report declares, one engine output line each
    pub async fn list_parameters(&self, input: impl AsRef<Path>) -> Result<Vec<String>> {
        let command = self.builder.list_parameters(input)?;
        self.executor.execute(&command, self.user()).await
    }
}
