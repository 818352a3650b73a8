//! Elman recurrent policy core.
//!
//! A minimal `tanh` RNN implementing [`HiddenStatePolicy`]. It stands in for a
//! trained agent in the demo and the test suite, and is small enough to be
//! fine-tuned through the probe in biasing mode.

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Linear, Module, VarBuilder, VarMap, linear};

use crate::{Error, Result, ports::HiddenStatePolicy};

/// Recurrent core `h_t = tanh(W_x x_t + W_h h_{t-1})`.
///
/// Observations are flat `f32` vectors holding one row of `obs_dim` values
/// per actor the state was last reset for.
///
/// # Examples
///
/// ```no_run
/// use candle_core::Device;
/// use comaze_probe::adapters::RecurrentPolicy;
/// use comaze_probe::ports::HiddenStatePolicy;
///
/// let mut policy = RecurrentPolicy::new(8, 32, 2, &Device::Cpu)?;
/// policy.reset(1, false)?;
/// let hs = policy.hidden_state(&vec![0.5; 8])?;
/// assert_eq!(hs.dims(), &[1, 32]);
/// # Ok::<(), comaze_probe::Error>(())
/// ```
#[derive(Clone)]
pub struct RecurrentPolicy {
    input: Linear,
    recurrent: Linear,
    varmap: VarMap,
    obs_dim: usize,
    hidden_dim: usize,
    nbr_actors: usize,
    device: Device,
    state: Tensor,
    saved_state: Option<Tensor>,
    training: bool,
}

impl RecurrentPolicy {
    /// Create a randomly initialised recurrent core.
    pub fn new(
        obs_dim: usize,
        hidden_dim: usize,
        nbr_actors: usize,
        device: &Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let input = linear(obs_dim, hidden_dim, vb.pp("input"))?;
        let recurrent = linear(hidden_dim, hidden_dim, vb.pp("recurrent"))?;
        let state = Tensor::zeros((nbr_actors, hidden_dim), DType::F32, device)?;

        Ok(Self {
            input,
            recurrent,
            varmap,
            obs_dim,
            hidden_dim,
            nbr_actors,
            device: device.clone(),
            state,
            saved_state: None,
            training: false,
        })
    }

    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Current recurrent state, `actors x hidden_dim`.
    pub fn state(&self) -> &Tensor {
        &self.state
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl HiddenStatePolicy for RecurrentPolicy {
    type Observation = Vec<f32>;

    fn hidden_state_dim(&self) -> usize {
        self.hidden_dim
    }

    fn nbr_actors(&self) -> usize {
        self.nbr_actors
    }

    fn reset(&mut self, nbr_actors: usize, training: bool) -> Result<()> {
        self.state = Tensor::zeros((nbr_actors, self.hidden_dim), DType::F32, &self.device)?;
        self.training = training;
        Ok(())
    }

    fn save_inner_state(&mut self) -> Result<()> {
        self.saved_state = Some(self.state.clone());
        Ok(())
    }

    fn restore_inner_state(&mut self) -> Result<()> {
        let saved = self.saved_state.take().ok_or(Error::NoSavedInnerState)?;
        self.state = saved;
        Ok(())
    }

    fn hidden_state(&mut self, observation: &Vec<f32>) -> Result<Tensor> {
        let rows = self.state.dim(0)?;
        if observation.len() != rows * self.obs_dim {
            return Err(Error::ObservationShape {
                expected: self.obs_dim,
                got: observation.len(),
            });
        }

        let x = Tensor::from_slice(observation.as_slice(), (rows, self.obs_dim), &self.device)?;
        let h = (self.input.forward(&x)? + self.recurrent.forward(&self.state)?)?.tanh()?;
        self.state = h.clone();
        Ok(h)
    }

    fn trainable_vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RecurrentPolicy {
        RecurrentPolicy::new(3, 6, 2, &Device::Cpu).unwrap()
    }

    #[test]
    fn reset_sizes_state_for_actors() {
        let mut p = policy();
        assert_eq!(p.state().dims(), &[2, 6]);
        p.reset(1, true).unwrap();
        assert_eq!(p.state().dims(), &[1, 6]);
        assert!(p.is_training());
    }

    #[test]
    fn hidden_state_advances_recurrent_state() {
        let mut p = policy();
        p.reset(1, false).unwrap();
        let h1 = p.hidden_state(&vec![1.0, 0.0, -1.0]).unwrap();
        assert_eq!(h1.dims(), &[1, 6]);
        let current = p.state().to_vec2::<f32>().unwrap();
        assert_eq!(current, h1.to_vec2::<f32>().unwrap());
    }

    #[test]
    fn wrong_observation_width_is_rejected() {
        let mut p = policy();
        p.reset(1, false).unwrap();
        let err = p.hidden_state(&vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::ObservationShape { expected: 3, got: 2 }));
    }

    #[test]
    fn restore_returns_saved_state() {
        let mut p = policy();
        p.reset(1, false).unwrap();
        p.hidden_state(&vec![0.3, 0.2, 0.1]).unwrap();
        let before = p.state().to_vec2::<f32>().unwrap();

        p.save_inner_state().unwrap();
        p.reset(1, false).unwrap();
        p.hidden_state(&vec![-1.0, -1.0, -1.0]).unwrap();
        p.restore_inner_state().unwrap();

        assert_eq!(p.state().to_vec2::<f32>().unwrap(), before);
    }

    #[test]
    fn restore_without_snapshot_fails() {
        let mut p = policy();
        assert!(matches!(p.restore_inner_state(), Err(Error::NoSavedInnerState)));
    }

    #[test]
    fn clones_keep_independent_state() {
        let mut p = policy();
        p.reset(1, false).unwrap();
        let mut q = p.clone();
        q.hidden_state(&vec![1.0, 1.0, 1.0]).unwrap();
        let zeros = vec![vec![0.0f32; 6]];
        assert_eq!(p.state().to_vec2::<f32>().unwrap(), zeros);
    }

    #[test]
    fn exposes_input_and_recurrent_parameters() {
        // two weight matrices and two bias vectors
        assert_eq!(policy().trainable_vars().len(), 4);
    }
}
