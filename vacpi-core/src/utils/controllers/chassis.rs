//! PCA9685 motor binding for the VacPi chassis.
//!
//! Four DC motors (left and right drive, brushes, vacuum fan) hang off a
//! PCA9685 PWM controller on a shared I2C bus. Each motor uses a
//! (phase, enable) channel pair: the phase channel selects the direction and
//! the enable channel carries the speed as a 12-bit duty cycle.

use crate::utils::{
    math::spiral::SpiralProfile,
    navigation::{Direction, Movements, Speed, Turn},
};
use core::cell::RefCell;

use embedded_hal::{delay::DelayNs, i2c::I2c};
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};
use serde::{Deserialize, Serialize};

/// I2C address of the motor shield's PWM controller.
pub const PWM_ADDRESS: u8 = 0x60;

const MAX_DUTY: u16 = 4095;

/// Errors that can occur when talking to the motor controller.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    PwmError(PwmError<E>),
    PwmNotInitialized,
}

/// Speed tiers and timings of the chassis, on a 0..=255 speed scale.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ChassisConfig {
    /// Capped side of a slow curve
    pub slow: u8,
    /// Capped side of a fast curve
    pub mid: u8,
    /// Full drive speed
    pub fast: u8,
    /// Brush motor speed while cleaning
    pub brush: u8,
    /// Vacuum fan speed while cleaning
    pub vacuum: u8,
    /// Time the chassis needs to turn ~45 degrees in place (ms)
    pub rotate_settle_ms: u32,
    /// Inner wheel curve while spiralling
    pub spiral: SpiralProfile,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            slow: 50,
            mid: 65,
            fast: 100,
            brush: 100,
            vacuum: 255,
            rotate_settle_ms: 2000,
            spiral: SpiralProfile::default(),
        }
    }
}

impl ChassisConfig {
    /// Speed of the capped side for a curve tier.
    pub fn curve_speed(
        &self,
        speed: Speed,
    ) -> u8 {
        match speed {
            Speed::Slow => self.slow,
            Speed::Fast => self.mid,
        }
    }

    /// Wheel commands `(left, right)` for driving `direction` with the
    /// `turn` side running at `inner`.
    pub fn differential(
        &self,
        direction: Direction,
        turn: Turn,
        inner: u8,
    ) -> (Drive, Drive) {
        let outer = Drive::Run(direction, self.fast);
        let inner = Drive::Run(direction, inner);
        match turn {
            Turn::Left => (inner, outer),
            Turn::Right => (outer, inner),
        }
    }

    /// Wheel commands `(left, right)` for turning in place towards `turn`.
    pub fn rotation(
        &self,
        turn: Turn,
    ) -> (Drive, Drive) {
        let back = Drive::Run(Direction::Backward, self.fast);
        let ahead = Drive::Run(Direction::Forward, self.fast);
        match turn {
            Turn::Left => (back, ahead),
            Turn::Right => (ahead, back),
        }
    }
}

/// Motors wired to the PWM controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Left,
    Right,
    Brushes,
    Vacuum,
}

impl Motor {
    const ALL: [Motor; 4] = [Motor::Left, Motor::Right, Motor::Brushes, Motor::Vacuum];

    fn index(self) -> usize {
        match self {
            Motor::Left => 0,
            Motor::Right => 1,
            Motor::Brushes => 2,
            Motor::Vacuum => 3,
        }
    }
}

/// Requested state of a single motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Run in `0` at speed `1` (0..=255).
    Run(Direction, u8),
    /// Cut power and let the motor spin down.
    Release,
}

impl Drive {
    /// `(phase, enable)` duty cycles for this drive state.
    pub fn duties(self) -> (u16, u16) {
        match self {
            Drive::Run(Direction::Forward, speed) => (0, duty(speed)),
            Drive::Run(Direction::Backward, speed) => (MAX_DUTY, duty(speed)),
            Drive::Release => (0, 0),
        }
    }
}

/// Scale a 0..=255 speed onto the 12-bit PWM range.
fn duty(speed: u8) -> u16 {
    (speed as u32 * MAX_DUTY as u32 / u8::MAX as u32) as u16
}

/// Motor driver for the VacPi chassis over a shared I2C bus.
pub struct Chassis<'a, I2C: 'static, D> {
    i2c: &'a RefCell<I2C>,
    pub pwm: Option<Pca9685<RefCellDevice<'a, I2C>>>,
    motor_channels: [(Channel, Channel); 4],
    delay: D,
    config: ChassisConfig,
}

impl<'a, I2C, E, D> Chassis<'a, I2C, D>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
    D: DelayNs,
{
    /// Create a chassis driver; `config` falls back to the stock tiers.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        delay: D,
        config: Option<ChassisConfig>,
    ) -> Self {
        Chassis {
            i2c: i2c_bus,
            pwm: None,
            motor_channels: [
                (Channel::C0, Channel::C1),
                (Channel::C2, Channel::C3),
                (Channel::C4, Channel::C5),
                (Channel::C6, Channel::C7),
            ],
            delay,
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &ChassisConfig {
        &self.config
    }

    /// Attach the PWM controller on the I2C bus.
    pub fn init_devices(&mut self) -> Result<(), DeviceError<E>> {
        let pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(PWM_ADDRESS))
            .map_err(DeviceError::PwmError)?;

        self.pwm = Some(pwm);
        Ok(())
    }

    /// Attach and wake the PWM controller.
    ///
    /// On failure the controller is detached again and the bus is scanned so
    /// the log shows which addresses do answer.
    pub fn bring_up(&mut self) -> Result<(), DeviceError<E>> {
        let result = self.init_devices().and_then(|()| self.configure_pwm());
        if let Err(e) = &result {
            tracing::warn!("motor controller bring-up failed, scanning bus: {:?}", e);
            self.pwm = None;
            let found = self.scan_bus();
            tracing::warn!(found, "bus scan finished");
        }
        result
    }

    /// Send an empty write to every 7-bit address. Returns how many
    /// devices acknowledged.
    pub fn scan_bus(&self) -> usize {
        let mut bus = self.i2c.borrow_mut();
        let mut found = 0;
        for addr in 0x03..0x78 {
            if bus.write(addr, &[]).is_ok() {
                tracing::info!("I2C device at 0x{:02X}", addr);
                found += 1;
            }
        }
        found
    }

    /// Wake the PWM controller and set its prescaler (~1.6 kHz).
    pub fn configure_pwm(&mut self) -> Result<(), DeviceError<E>> {
        let pca = self.pwm.as_mut().ok_or(DeviceError::PwmNotInitialized)?;
        pca.enable().map_err(DeviceError::PwmError)?;
        pca.set_prescale(3).map_err(DeviceError::PwmError)?;
        tracing::info!("PWM enabled");
        Ok(())
    }

    /// Apply a drive state to one motor.
    pub fn set_motor(
        &mut self,
        motor: Motor,
        drive: Drive,
    ) -> Result<(), DeviceError<E>> {
        let (phase_channel, enable_channel) = self.motor_channels[motor.index()];
        let (phase, enable) = drive.duties();
        let pca = self.pwm.as_mut().ok_or(DeviceError::PwmNotInitialized)?;

        pca.set_channel_on_off(phase_channel, 0, phase)
            .map_err(DeviceError::PwmError)?;
        pca.set_channel_on_off(enable_channel, 0, enable)
            .map_err(DeviceError::PwmError)?;
        tracing::trace!(?motor, ?drive, "motor set");
        Ok(())
    }

    /// Apply drive states to both wheels, left first.
    pub fn drive(
        &mut self,
        left: Drive,
        right: Drive,
    ) -> Result<(), DeviceError<E>> {
        self.set_motor(Motor::Left, left)?;
        self.set_motor(Motor::Right, right)
    }

    /// Release every motor, wheels first.
    pub fn release_all(&mut self) -> Result<(), DeviceError<E>> {
        for motor in Motor::ALL {
            self.set_motor(motor, Drive::Release)?;
        }
        Ok(())
    }

    fn set_cleaning(
        &mut self,
        on: bool,
    ) -> Result<(), DeviceError<E>> {
        let (brushes, vacuum) = if on {
            (
                Drive::Run(Direction::Forward, self.config.brush),
                Drive::Run(Direction::Forward, self.config.vacuum),
            )
        } else {
            (Drive::Release, Drive::Release)
        };
        self.set_motor(Motor::Brushes, brushes)?;
        self.set_motor(Motor::Vacuum, vacuum)
    }
}

/// Log a failed command; movements are fire-and-forget.
fn report<E: core::fmt::Debug>(
    command: &'static str,
    result: Result<(), DeviceError<E>>,
) {
    if let Err(e) = result {
        tracing::error!(command, "motor command failed: {:?}", e);
    }
}

impl<'a, I2C, E, D> Movements for Chassis<'a, I2C, D>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
    D: DelayNs,
{
    fn stop_all(&mut self) {
        report("stop_all", self.release_all());
    }

    fn start_vacuum(&mut self) {
        report("start_vacuum", self.set_cleaning(true));
    }

    fn stop_vacuum(&mut self) {
        report("stop_vacuum", self.set_cleaning(false));
    }

    fn move_straight(
        &mut self,
        direction: Direction,
    ) {
        let wheel = Drive::Run(direction, self.config.fast);
        report("move_straight", self.drive(wheel, wheel));
    }

    fn rotate45(
        &mut self,
        turn: Turn,
    ) {
        let (left, right) = self.config.rotation(turn);
        let result = self.drive(left, right);
        let failed = result.is_err();
        report("rotate45", result);
        if !failed {
            self.delay.delay_ms(self.config.rotate_settle_ms);
        }
    }

    fn spiral(
        &mut self,
        turn: Turn,
        age: u32,
    ) {
        let inner = self.config.spiral.inner_speed(age);
        let (left, right) = self.config.differential(Direction::Forward, turn, inner);
        report("spiral", self.drive(left, right));
    }

    fn curve(
        &mut self,
        direction: Direction,
        turn: Turn,
        speed: Speed,
    ) {
        let inner = self.config.curve_speed(speed);
        let (left, right) = self.config.differential(direction, turn, inner);
        report("curve", self.drive(left, right));
    }
}
