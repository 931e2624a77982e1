//! Module Exports
//!
//! This file exports the debug shell used to talk to the robot at runtime.
//!
//! # Modules
//! - `shell`: Parses text commands and forwards them to the control loop.

/// Module for the line-based debug shell and its command channel.
pub mod shell;
