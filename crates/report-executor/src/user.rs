//! Running the engine as a different OS user
//!
//! The built command line is handed to `su <user> -c '<line>'`. No password
//! handling is done: the caller must already be allowed to switch to the target
//! user without a prompt (typically by running as root), otherwise `su` fails and
//! the failure surfaces as an execution error.

use crate::command::Command;

/// Wrap `command` so it runs as `user`.
///
/// Commands for platforms without a user switch are returned unchanged. The
/// working directory is kept on the outer command; environment variables are
/// moved into the inner line because `su` resets the environment.
pub fn run_as(command: Command, user: &str) -> Command {
    let platform = command.get_platform();
    if !platform.supports_user_switch() || user.trim().is_empty() || command.is_empty() {
        return command;
    }

    let mut assignments: Vec<_> = command
        .get_envs()
        .iter()
        .map(|(key, val)| format!("{}={}", key, single_quote(val)))
        .collect();
    assignments.sort();

    let wrap = |line: String| {
        let mut inner = assignments.join(" ");
        if !inner.is_empty() {
            inner.push(' ');
        }
        inner.push_str(&line);

        Command::new("su")
            .platform(platform)
            .arg(single_quote(user))
            .arg("-c")
            .arg(single_quote(&inner))
    };

    let masked = wrap(command.redacted()).to_string();
    let wrapped = wrap(command.to_string()).masked_as(masked);

    match command.get_current_dir() {
        Some(dir) => wrapped.current_dir(dir),
        None => wrapped,
    }
}

/// Quote for a POSIX shell so the value reaches the program verbatim
fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
