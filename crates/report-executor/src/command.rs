//! Command type for a single engine invocation

use crate::engine::Platform;
use async_process::{Command as AsyncCommand, Stdio};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully resolved engine invocation
///
/// Arguments are shell words in the engine's grammar: file names arrive already
/// quoted and parameters as `key="value"`. The rendered line (see the `Display`
/// impl) is what the platform shell runs. A `Command` is built once per
/// invocation and never modified afterwards; the chaining methods consume `self`.
///
/// `Command::default()` is the empty command, which the executor refuses to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// The program to execute
    program: String,
    /// The arguments to pass to the program
    args: Vec<String>,
    /// Environment variables to set
    env: HashMap<String, String>,
    /// Working directory for the command
    current_dir: Option<PathBuf>,
    /// Platform whose shell runs the command
    platform: Option<Platform>,
    /// Log form of a command that embeds another command's line
    masked: Option<String>,
}

impl Command {
    /// Create a new command for the given program
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Add an argument to the command
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.env.insert(key.into(), val.into());
        self
    }

    /// Set multiple environment variables
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, val) in vars {
            self.env.insert(key.into(), val.into());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_owned());
        self
    }

    /// Run through the given platform's shell instead of the host's
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Get the program name
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment variables
    pub fn get_envs(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Get the current directory
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Get the platform whose shell runs the command
    pub fn get_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// True when no program was ever set
    pub fn is_empty(&self) -> bool {
        self.program.trim().is_empty()
    }

    /// Use `line` as the redacted form of this command.
    ///
    /// For wrappers whose arguments carry another command's full line, where the
    /// `-p` value is no longer a separate word.
    pub(crate) fn masked_as(mut self, line: String) -> Self {
        self.masked = Some(line);
        self
    }

    /// The command line with password values masked, for logging
    pub fn redacted(&self) -> String {
        if let Some(line) = &self.masked {
            return line.clone();
        }
        let mut words = vec![self.rendered_program()];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                words.push("******".to_string());
            } else {
                words.push(arg.clone());
            }
            mask_next = arg == "-p";
        }
        words.join(" ")
    }

    fn rendered_program(&self) -> String {
        if self.program.contains(char::is_whitespace) {
            self.get_platform().quote(&self.program)
        } else {
            self.program.clone()
        }
    }

    /// Prepare this command for execution by converting to an `async_process::Command`
    ///
    /// The rendered line is handed to the platform shell with stdin closed and both
    /// output streams piped. On Unix the shell leads a new process group, so the
    /// engine it forks can be signalled together with it.
    pub fn prepare(&self) -> AsyncCommand {
        let (shell, flag) = self.get_platform().shell();
        let mut inner = std::process::Command::new(shell);
        inner.arg(flag).arg(self.to_string());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            inner.process_group(0);
        }

        let mut cmd = AsyncCommand::from(inner);
        for (key, val) in &self.env {
            cmd.env(key, val);
        }

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered_program())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
