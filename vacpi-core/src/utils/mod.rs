//! Utility re-exports and helper macros for the VacPi robot.
//!
//! This module re-exports the navigation core, the hardware controllers, the
//! debug shell and the spiral speed curve:
//!
//! - `navigation`: movement capability, navigation states and the main loop
//! - `controllers`: motor binding, sensors and the paced control loop
//! - `connection`: debug shell commands and their channel
//! - `math`: speed curve for spiral driving
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod connection;
pub mod controllers;
pub mod math;
pub mod navigation;

pub use connection::shell::{ShellCommand, SHELL_CHANNEL};
pub use controllers::{DebugFlags, SystemController};
pub use embassy_time::*;
pub use navigation::{Looper, Movements, Obstruction};

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
