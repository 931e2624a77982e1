//! Speed curve for spiral driving.
//!
//! While spiralling, the outer wheel runs at full speed and the inner wheel
//! follows a power curve of the spiral age, so the turning radius grows as
//! the spiral widens:
//!
//! `inner = a * age^c + b`, clamped to `max`.
//!
//! # Example
//! ```rust
//! use vacpi_core::utils::math::spiral::SpiralProfile;
//! let profile = SpiralProfile::default();
//! let inner = profile.inner_speed(100);
//! assert!(inner > 55 && inner < 65);
//! ```
//!
use libm;
use serde::{Deserialize, Serialize};

/// Coefficients of the inner-wheel speed curve (0..=255 speed scale).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SpiralProfile {
    /// Curve gain
    pub a: f32,
    /// Speed at age zero
    pub b: f32,
    /// Curve exponent, below 1 so growth flattens out
    pub c: f32,
    /// Upper bound for the inner wheel speed
    pub max: u8,
}

impl Default for SpiralProfile {
    /// Fitted through (0, 20), (20, 40) and (100, 60).
    fn default() -> Self {
        Self {
            a: 5.5,
            b: 20.0,
            c: 0.43,
            max: 120,
        }
    }
}

impl SpiralProfile {
    /// Inner wheel speed for a spiral of the given age.
    ///
    /// Non-decreasing in `age` and never above `max`.
    pub fn inner_speed(
        &self,
        age: u32,
    ) -> u8 {
        let raw = self.a * libm::powf(age as f32, self.c) + self.b;
        let clamped = clamp_speed(raw, self.max as f32);
        clamped as u8
    }
}

fn clamp_speed(
    v: f32,
    max: f32,
) -> f32 {
    if v.is_nan() || v < 0.0 {
        0.0
    } else if v > max {
        max
    } else {
        v
    }
}
