//! Reactive navigation controller for the VacPi floor-cleaning robot on
//! no-std embedded platforms.
//!
//! For a runnable host simulation, see the `vacpi-app/mock-mcu` binary.
#![no_std]

pub mod utils;
