//! Proximity sensor sampling.
//!
//! The IR proximity and edge sensors report an analog level that drops as an
//! obstacle (or a drop-off edge) comes close. A level at or below the
//! threshold counts as an obstruction.

use serde::{Deserialize, Serialize};

use crate::utils::navigation::Obstruction;

/// Default analog level at or below which a sensor reports an obstruction.
pub const SENSOR_THRESHOLD: u16 = 100;

/// Source of one obstacle snapshot per control cycle.
pub trait ObstacleSensors {
    fn read(&mut self) -> Obstruction;
}

impl<F> ObstacleSensors for F
where
    F: FnMut() -> Obstruction,
{
    fn read(&mut self) -> Obstruction {
        self()
    }
}

/// Raw analog readings of all sensors in one cycle.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SensorLevels {
    pub dust: u16,
    pub left: u16,
    pub right: u16,
    pub center: u16,
    pub front: u16,
}

impl SensorLevels {
    /// Convert raw levels into an obstacle snapshot.
    pub fn to_obstruction(
        &self,
        threshold: u16,
    ) -> Obstruction {
        Obstruction {
            dust_level: self.dust <= threshold,
            left: self.left <= threshold,
            right: self.right <= threshold,
            center: self.center <= threshold,
            front: self.front <= threshold,
        }
    }
}

/// Sensors sampled through an analog read callback.
pub struct AnalogSensors<R> {
    read_levels: R,
    threshold: u16,
}

impl<R> AnalogSensors<R>
where
    R: FnMut() -> SensorLevels,
{
    /// Wrap a level reader; `threshold` defaults to [`SENSOR_THRESHOLD`].
    pub fn new(
        read_levels: R,
        threshold: Option<u16>,
    ) -> Self {
        Self {
            read_levels,
            threshold: threshold.unwrap_or(SENSOR_THRESHOLD),
        }
    }
}

impl<R> ObstacleSensors for AnalogSensors<R>
where
    R: FnMut() -> SensorLevels,
{
    fn read(&mut self) -> Obstruction {
        let levels = (self.read_levels)();
        tracing::trace!(?levels, "sensor levels");
        levels.to_obstruction(self.threshold)
    }
}
