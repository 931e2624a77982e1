//! Navigation states.
//!
//! Each state advances by one tick given the front obstruction signal and
//! answers with a [`Transition`]: either keep the current instance (its
//! counters carry on) or replace it with a freshly built state.

use super::{Direction, Movements, Speed, Turn};

/// Outcome of a single state tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current state and its counters.
    Stay,
    /// Replace the current state.
    Switch(NavigationState),
}

/// The active navigation behaviour, exactly one of which is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    EdgeRun(EdgeRun),
    LinearRun(LinearRun),
    Circling(Circling),
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState::LinearRun(LinearRun::new())
    }
}

impl NavigationState {
    /// Advance the active state by one tick.
    pub fn run<M: Movements>(
        &mut self,
        obstruction: bool,
        movements: &mut M,
    ) -> Transition {
        match self {
            NavigationState::EdgeRun(s) => s.run(obstruction, movements),
            NavigationState::LinearRun(s) => s.run(obstruction, movements),
            NavigationState::Circling(s) => s.run(obstruction, movements),
        }
    }

    /// Ticks spent in this instance.
    pub fn timer(&self) -> u32 {
        match self {
            NavigationState::EdgeRun(s) => s.timer,
            NavigationState::LinearRun(s) => s.timer,
            NavigationState::Circling(s) => s.timer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NavigationState::EdgeRun(_) => "edge_run",
            NavigationState::LinearRun(_) => "linear_run",
            NavigationState::Circling(_) => "circling",
        }
    }
}

/// Follows a boundary: short straight runs alternating with gentle right
/// curves, reversing away on contact.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRun {
    timer: u32,
    straight_timer: u32,
    obstruction_timer: u32,
}

impl EdgeRun {
    pub const TIMER_THRESHOLD: u32 = 1000;
    pub const STRAIGHT_TIMER_THRESHOLD: u32 = 5;
    pub const OBSTRUCTION_TIMER_THRESHOLD: u32 = 50;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Ticks spent in the current straight segment.
    pub fn straight_timer(&self) -> u32 {
        self.straight_timer
    }

    /// Ticks since the last obstruction.
    pub fn obstruction_timer(&self) -> u32 {
        self.obstruction_timer
    }

    pub fn run<M: Movements>(
        &mut self,
        obstruction: bool,
        movements: &mut M,
    ) -> Transition {
        self.timer = self.timer.saturating_add(1);
        self.obstruction_timer = self.obstruction_timer.saturating_add(1);

        if obstruction {
            self.obstruction_timer = 0;
            self.straight_timer = 0;
            movements.curve(Direction::Backward, Turn::Right, Speed::Fast);
            return Transition::Stay;
        } else if self.timer > Self::TIMER_THRESHOLD {
            movements.rotate45(Turn::Left);
            return Transition::Switch(NavigationState::LinearRun(LinearRun::new()));
        } else if self.obstruction_timer > Self::OBSTRUCTION_TIMER_THRESHOLD {
            return Transition::Switch(NavigationState::Circling(Circling::new()));
        }

        self.straight_timer = self.straight_timer.saturating_add(1);
        if self.straight_timer <= Self::STRAIGHT_TIMER_THRESHOLD {
            movements.move_straight(Direction::Forward);
        } else {
            movements.curve(Direction::Forward, Turn::Right, Speed::Slow);
        }
        Transition::Stay
    }
}

/// Drives straight ahead, turning away from anything in front.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinearRun {
    timer: u32,
}

impl LinearRun {
    pub const TIMER_THRESHOLD: u32 = 100;

    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_timer(timer: u32) -> Self {
        Self { timer }
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn run<M: Movements>(
        &mut self,
        obstruction: bool,
        movements: &mut M,
    ) -> Transition {
        self.timer = self.timer.saturating_add(1);

        if obstruction {
            movements.rotate45(Turn::Left);
            return Transition::Stay;
        } else if self.timer > Self::TIMER_THRESHOLD {
            return Transition::Switch(NavigationState::Circling(Circling::new()));
        }

        movements.move_straight(Direction::Forward);
        Transition::Stay
    }
}

/// Spirals outwards from the current spot, restarting from the innermost
/// radius once the timer runs out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Circling {
    timer: u32,
}

impl Circling {
    pub const TIMER_THRESHOLD: u32 = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn run<M: Movements>(
        &mut self,
        obstruction: bool,
        movements: &mut M,
    ) -> Transition {
        self.timer = self.timer.saturating_add(1);

        if obstruction {
            return Transition::Switch(NavigationState::EdgeRun(EdgeRun::new()));
        } else if self.timer > Self::TIMER_THRESHOLD {
            return Transition::Switch(NavigationState::Circling(Circling::new()));
        }

        movements.spiral(Turn::Left, self.timer);
        Transition::Stay
    }
}
