//! Math utilities for the VacPi robot.
//!
//! This module provides the speed curve used while spiralling outwards.

pub mod spiral;
