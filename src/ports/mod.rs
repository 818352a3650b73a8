//! Ports (trait boundaries) for external collaborators.
//!
//! The agents being probed live outside this crate. They plug into the
//! metric through the traits defined here and are implemented by adapters.

pub mod policy;

pub use policy::HiddenStatePolicy;
