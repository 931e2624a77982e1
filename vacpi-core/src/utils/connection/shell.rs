//! Debug Shell Module
//!
//! Text commands arrive as `;`-terminated lines (typically over a serial
//! console). Each line is parsed into a [`ShellCommand`] and forwarded through
//! [`SHELL_CHANNEL`] to the control loop, which drains it once per cycle.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

/// Channel used to pass shell commands to the control loop.
pub static SHELL_CHANNEL: embassy_sync::channel::Channel<CriticalSectionRawMutex, ShellCommand, 4> =
    embassy_sync::channel::Channel::new();

/// Command terminator on the console.
pub const TERMINATOR: char = ';';

/// Commands understood by the debug shell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShellCommand {
    /// Toggle logging of raw sensor readings.
    Debug,
    /// Toggle sensor-test mode (navigation paused, readings logged).
    Test,
    /// Anything else, including empty input.
    Invalid,
}

impl ShellCommand {
    /// Parse one command; only the first word counts and anything after a
    /// terminator is dropped.
    pub fn parse(input: &str) -> Self {
        let line = match input.split_once(TERMINATOR) {
            Some((line, _)) => line,
            None => input,
        };

        match line.split_whitespace().next() {
            Some("debug") => ShellCommand::Debug,
            Some("test") => ShellCommand::Test,
            _ => ShellCommand::Invalid,
        }
    }

    /// Parse every `;`-terminated command in `input`, skipping blank ones.
    pub fn parse_all(input: &str) -> impl Iterator<Item = ShellCommand> + '_ {
        input
            .split(TERMINATOR)
            .filter(|line| !line.trim().is_empty())
            .map(ShellCommand::parse)
    }
}

/// Queue a command for the control loop without waiting.
///
/// Returns `false` when the channel is full and the command was dropped.
pub fn forward(command: ShellCommand) -> bool {
    match SHELL_CHANNEL.try_send(command) {
        Ok(()) => {
            tracing::info!(?command, "shell command forwarded");
            true
        }
        Err(_) => {
            tracing::warn!(?command, "shell channel full, command dropped");
            false
        }
    }
}
