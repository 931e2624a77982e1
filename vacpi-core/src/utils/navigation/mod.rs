//! Reactive navigation for the VacPi cleaning robot.
//!
//! The navigation layer is split in three parts:
//!
//! - [`Movements`]: the actuator capability, implemented by a hardware binding.
//! - `states`: the navigation variants (edge-follow, linear run, circling).
//! - `looper`: the per-cycle driver owning the single active state.

pub mod looper;
pub mod states;

use serde::{Deserialize, Serialize};

pub use looper::Looper;
pub use states::{Circling, EdgeRun, LinearRun, NavigationState, Transition};

/// Travel direction of both drive motors.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// Side the robot turns towards.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Left,
    Right,
}

/// Speed tier of the slowed side during a curve.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    Fast,
}

/// Obstacle snapshot sampled once per control cycle.
///
/// Every flag is `true` when the corresponding sensor reports an obstruction
/// (or, for `dust_level`, a full dust bin).
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Obstruction {
    pub dust_level: bool,
    pub left: bool,
    pub right: bool,
    pub center: bool,
    pub front: bool,
}

impl Obstruction {
    /// Both side sensors firing at once means the wheels lost the floor.
    pub fn is_lifted(&self) -> bool {
        self.left && self.right
    }

    /// Conditions under which every actuator must be halted.
    pub fn requires_stop(&self) -> bool {
        self.dust_level || self.is_lifted()
    }
}

/// Platform-dependent motion and cleaning commands.
///
/// All commands are fire-and-forget: a binding that fails to reach its
/// hardware reports the fault itself, the navigation layer never sees it.
pub trait Movements {
    /// Stop all engines, locomotion and cleaning alike.
    fn stop_all(&mut self);

    /// Start the engines used for cleaning (vacuum and brushes).
    fn start_vacuum(&mut self);

    /// Stop the engines used for cleaning (vacuum and brushes).
    fn stop_vacuum(&mut self);

    /// Drive both motors at full speed in `direction`.
    fn move_straight(
        &mut self,
        direction: Direction,
    );

    /// Rotate in place by roughly 45 degrees.
    ///
    /// Blocks until the binding's settle time has elapsed.
    fn rotate45(
        &mut self,
        turn: Turn,
    );

    /// Drive an outward spiral; `age` widens the radius as it grows.
    fn spiral(
        &mut self,
        turn: Turn,
        age: u32,
    );

    /// Drive a gentle curve with the `turn` side capped to `speed`.
    fn curve(
        &mut self,
        direction: Direction,
        turn: Turn,
        speed: Speed,
    );
}

impl<M: Movements + ?Sized> Movements for &mut M {
    fn stop_all(&mut self) {
        (**self).stop_all()
    }

    fn start_vacuum(&mut self) {
        (**self).start_vacuum()
    }

    fn stop_vacuum(&mut self) {
        (**self).stop_vacuum()
    }

    fn move_straight(
        &mut self,
        direction: Direction,
    ) {
        (**self).move_straight(direction)
    }

    fn rotate45(
        &mut self,
        turn: Turn,
    ) {
        (**self).rotate45(turn)
    }

    fn spiral(
        &mut self,
        turn: Turn,
        age: u32,
    ) {
        (**self).spiral(turn, age)
    }

    fn curve(
        &mut self,
        direction: Direction,
        turn: Turn,
        speed: Speed,
    ) {
        (**self).curve(direction, turn, speed)
    }
}
