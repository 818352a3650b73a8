//! Hidden-state policy port - abstraction over recurrent agents being probed
//!
//! The metric never looks inside an agent. It only needs to step the agent's
//! recurrent core one observation at a time and read back the hidden state,
//! and to protect the agent's live state when it borrows the agent for
//! gradient-carrying evaluation.

use candle_core::{Tensor, Var};

use crate::Result;

/// Recurrent agent whose internal hidden state can be probed.
///
/// # Cloning
///
/// `Clone` must produce an independent recurrent state. Parameters may be
/// shared between clones; the frozen evaluation path detaches every hidden
/// state it reads, so shared parameters never receive gradient from it.
///
/// # Examples
///
/// ```no_run
/// use comaze_probe::ports::HiddenStatePolicy;
///
/// fn probe_width<P: HiddenStatePolicy>(policy: &P) -> usize {
///     policy.hidden_state_dim()
/// }
/// ```
pub trait HiddenStatePolicy {
    /// Observation consumed at each timestep.
    type Observation;

    /// Width of the hidden state returned by [`Self::hidden_state`].
    fn hidden_state_dim(&self) -> usize;

    /// Number of parallel actors the policy runs with outside of probing.
    fn nbr_actors(&self) -> usize;

    /// Reinitialise the recurrent state for `nbr_actors` parallel actors.
    fn reset(&mut self, nbr_actors: usize, training: bool) -> Result<()>;

    /// Snapshot the current recurrent state.
    fn save_inner_state(&mut self) -> Result<()>;

    /// Restore the last snapshot taken by [`Self::save_inner_state`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoSavedInnerState`] if no snapshot exists.
    fn restore_inner_state(&mut self) -> Result<()>;

    /// Advance the recurrent state by one observation and return the new
    /// hidden state, shaped `1 x hidden_state_dim`.
    fn hidden_state(&mut self, observation: &Self::Observation) -> Result<Tensor>;

    /// Parameters fine-tuned when the probe loss is back-propagated into the
    /// policy.
    ///
    /// # Default Implementation
    ///
    /// Returns no parameters, so biasing only trains the probe.
    fn trainable_vars(&self) -> Vec<Var> {
        Vec::new()
    }
}
