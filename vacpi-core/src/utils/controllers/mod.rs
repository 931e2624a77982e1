//! Module Exports
//!
//! This file exports the hardware-facing pieces of the cleaning robot and the
//! control loop that ties them together.
//!
//! - `chassis`: PCA9685 motor binding implementing `Movements`.
//! - `sensors`: analog proximity sensors turned into obstacle snapshots.

/// Module for driving the chassis motors over I2C.
pub mod chassis;
pub mod sensors;

use embassy_time::{Duration, Ticker};
use serde::{Deserialize, Serialize};

use crate::utils::{
    connection::shell::{ShellCommand, SHELL_CHANNEL},
    navigation::{Looper, Movements},
};

pub use chassis::{Chassis, ChassisConfig, DeviceError};
pub use sensors::{AnalogSensors, ObstacleSensors, SensorLevels, SENSOR_THRESHOLD};

/// Runtime toggles flipped from the debug shell.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DebugFlags {
    /// Log the obstacle snapshot of every cycle.
    pub debug: bool,
    /// Hold the chassis still and only sample sensors.
    pub test_mode: bool,
}

/// Owns the navigation loop and its sensor source and paces both.
pub struct SystemController<M, S> {
    looper: Looper<M>,
    sensors: S,
    flags: DebugFlags,
}

impl<M, S> SystemController<M, S>
where
    M: Movements,
    S: ObstacleSensors,
{
    pub fn new(
        movements: M,
        sensors: S,
        flags: Option<DebugFlags>,
    ) -> Self {
        SystemController {
            looper: Looper::new(movements),
            sensors,
            flags: flags.unwrap_or_default(),
        }
    }

    pub fn flags(&self) -> DebugFlags {
        self.flags
    }

    pub fn looper(&self) -> &Looper<M> {
        &self.looper
    }

    /// Apply a command received from the debug shell.
    pub fn handle_command(
        &mut self,
        command: ShellCommand,
    ) {
        match command {
            ShellCommand::Debug => {
                self.flags.debug = !self.flags.debug;
                tracing::info!(debug = self.flags.debug, "debug output toggled");
            }
            ShellCommand::Test => {
                self.flags.test_mode = !self.flags.test_mode;
                if self.flags.test_mode {
                    self.looper.movements_mut().stop_all();
                }
                tracing::info!(test_mode = self.flags.test_mode, "sensor test mode toggled");
            }
            ShellCommand::Invalid => tracing::warn!("invalid shell command ignored"),
        }
    }

    /// Sample the sensors once and run one navigation cycle.
    pub fn cycle(&mut self) {
        let obstruction = self.sensors.read();
        if self.flags.debug || self.flags.test_mode {
            tracing::info!(?obstruction, "sensor readings");
        }
        if self.flags.test_mode {
            return;
        }
        self.looper.advance(obstruction);
    }

    /// Run the control loop every `period`.
    ///
    /// Pending shell commands are applied before each cycle. Returns after
    /// `limit` cycles, or never when `limit` is `None`.
    pub async fn run(
        &mut self,
        period: Duration,
        limit: Option<u32>,
    ) {
        let mut ticker = Ticker::every(period);
        let mut cycles: u32 = 0;
        tracing::info!(period_ms = period.as_millis(), "control loop started");
        loop {
            if limit.is_some_and(|limit| cycles >= limit) {
                break;
            }
            while let Ok(command) = SHELL_CHANNEL.try_receive() {
                self.handle_command(command);
            }
            self.cycle();
            cycles = cycles.saturating_add(1);
            ticker.next().await;
        }
        tracing::info!(cycles, "control loop finished");
    }
}
