//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod hexdump;
pub mod locate;
pub mod patch;
pub mod scan;
pub mod target;
