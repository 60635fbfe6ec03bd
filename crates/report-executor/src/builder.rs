//! Translate report requests into engine commands

use crate::command::Command;
use crate::engine::{EngineLocator, Platform};
use crate::error::{Error, Result};
use crate::options::{OptionSet, ProcessOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Engine subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Compile a `.jrxml` template into a `.jasper` file
    Compile,
    /// Fill and export a report
    Process,
    /// List the parameters a report declares
    ListParameters,
}

impl Action {
    /// The subcommand as the engine spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Compile => "compile",
            Action::Process => "process",
            Action::ListParameters => "list_parameters",
        }
    }
}

/// Builds immutable [`Command`] values for the engine
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    locator: Arc<dyn EngineLocator>,
    env: HashMap<String, String>,
}

impl CommandBuilder {
    /// Create a builder for the engine found by `locator`
    pub fn new(locator: Arc<dyn EngineLocator>) -> Self {
        Self {
            locator,
            env: HashMap::new(),
        }
    }

    /// Extra environment passed to every built command
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// The locator this builder resolves the engine through
    pub fn locator(&self) -> &Arc<dyn EngineLocator> {
        &self.locator
    }

    fn platform(&self) -> Platform {
        self.locator.platform()
    }

    /// Executable, platform and environment; the input's directory becomes the
    /// working directory and only its base name is returned for the engine.
    fn start(&self, input: &Path) -> Result<(Command, String)> {
        if input.as_os_str().is_empty() {
            return Err(Error::InvalidInputFile);
        }
        let file_name = input
            .file_name()
            .ok_or(Error::InvalidInputFile)?
            .to_string_lossy()
            .into_owned();

        let mut command = Command::new(self.locator.executable().to_string_lossy())
            .platform(self.platform())
            .envs(self.env.clone());

        if let Some(parent) = input.parent().filter(|p| !p.as_os_str().is_empty()) {
            command = command.current_dir(parent);
        }

        Ok((command, file_name))
    }

    fn with_output(&self, command: Command, output: Option<&Path>) -> Command {
        match output {
            Some(output) => command
                .arg("-o")
                .arg(self.platform().quote(&output.to_string_lossy())),
            None => command,
        }
    }

    /// `compile "<input>" [-o "<output>"]`
    pub fn compile(&self, input: impl AsRef<Path>, output: Option<&Path>) -> Result<Command> {
        let (command, file_name) = self.start(input.as_ref())?;
        let command = command
            .arg(Action::Compile.as_str())
            .arg(self.platform().quote(&file_name));
        let command = self.with_output(command, output);

        debug!(action = "compile", command = %command.redacted(), "Built engine command");
        Ok(command)
    }

    /// `[--locale <locale>] process "<input>" [-o "<output>"] -f <fmt>... [-P k="v"...] [<db-flag> <value>...]`
    pub fn process(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        options: &OptionSet,
    ) -> Result<Command> {
        let (mut command, file_name) = self.start(input.as_ref())?;
        let platform = self.platform();

        if let Some(key) = options.get_params().keys().find(|key| !is_param_name(key)) {
            return Err(Error::InvalidParameter { key: key.clone() });
        }

        if let Some(locale) = options.get_locale() {
            command = command.arg("--locale").arg(shell_word(platform, locale));
        }

        command = command
            .arg(Action::Process.as_str())
            .arg(platform.quote(&file_name));
        command = self.with_output(command, output);

        command = command
            .arg("-f")
            .args(options.get_formats().iter().map(|format| format.as_str()));

        if !options.get_params().is_empty() {
            command = command.arg("-P").args(
                options
                    .get_params()
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, platform.quote(value))),
            );
        }

        for (key, value) in options.get_db_connection() {
            command = command.arg(key.flag()).arg(shell_word(platform, value));
        }

        debug!(action = "process", command = %command.redacted(), "Built engine command");
        Ok(command)
    }

    /// Like [`CommandBuilder::process`], applying defaults and validation to
    /// untyped options first
    pub fn process_with(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        options: &ProcessOptions,
    ) -> Result<Command> {
        let input = input.as_ref();
        if input.as_os_str().is_empty() {
            return Err(Error::InvalidInputFile);
        }
        let options = options.resolve()?;
        self.process(input, output, &options)
    }

    /// `list_parameters "<input>"`
    pub fn list_parameters(&self, input: impl AsRef<Path>) -> Result<Command> {
        let (command, file_name) = self.start(input.as_ref())?;
        let command = command
            .arg(Action::ListParameters.as_str())
            .arg(self.platform().quote(&file_name));

        debug!(action = "list_parameters", command = %command.redacted(), "Built engine command");
        Ok(command)
    }
}

/// Parameter names reach the shell unquoted, so only identifier characters are allowed
fn is_param_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Pass plain values through untouched, quote anything the shell would split or expand
fn shell_word(platform: Platform, value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@,=+%".contains(c));
    if plain {
        value.to_string()
    } else {
        platform.quote(value)
    }
}
