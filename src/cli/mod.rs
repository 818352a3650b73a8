//! CLI infrastructure for the comaze-probe toolkit
//!
//! This module provides the command-line interface for running the probe
//! metric on synthetic episodes and inspecting its configuration.

pub mod commands;
pub mod output;
pub mod synthetic;
