//! Adapters implementing domain ports.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports module. Adapters depend on the ports, not the other way around.

pub mod recurrent_policy;

pub use recurrent_policy::RecurrentPolicy;
