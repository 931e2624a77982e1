//! Per-cycle navigation driver.
//!
//! `Looper` owns the actuator binding and the single live
//! [`NavigationState`]. Each call to [`Looper::advance`] runs the safety
//! interlock, then hands the front sensor signal to the active state.

use super::{Movements, NavigationState, Obstruction, Transition};

/// Main navigation loop; call [`Looper::advance`] once per control cycle.
pub struct Looper<M> {
    movements: M,
    current_state: NavigationState,
    halted: bool,
}

impl<M> Looper<M>
where
    M: Movements,
{
    /// Create a looper starting in a fresh linear run.
    pub fn new(movements: M) -> Self {
        Looper {
            movements,
            current_state: NavigationState::default(),
            halted: false,
        }
    }

    /// Run one control cycle against the obstructions sampled this cycle.
    ///
    /// A full dust bin or a lifted chassis halts everything and leaves the
    /// active state untouched.
    pub fn advance(
        &mut self,
        obstruction: Obstruction,
    ) {
        if obstruction.requires_stop() {
            if !self.halted {
                tracing::warn!(
                    dust_level = obstruction.dust_level,
                    lifted = obstruction.is_lifted(),
                    "safety stop"
                );
                self.halted = true;
            }
            self.movements.stop_all();
            return;
        }
        if self.halted {
            tracing::info!(state = self.current_state.name(), "safety stop cleared");
            self.halted = false;
        }

        self.movements.start_vacuum();
        match self
            .current_state
            .run(obstruction.front, &mut self.movements)
        {
            Transition::Stay => {}
            Transition::Switch(next) => {
                tracing::info!(
                    from = self.current_state.name(),
                    to = next.name(),
                    age = self.current_state.timer(),
                    "navigation state switch"
                );
                self.current_state = next;
            }
        }
    }

    /// Whether the last cycle was cut short by the safety interlock.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The currently active navigation state.
    pub fn state(&self) -> &NavigationState {
        &self.current_state
    }

    pub fn movements(&self) -> &M {
        &self.movements
    }

    pub fn movements_mut(&mut self) -> &mut M {
        &mut self.movements
    }
}
