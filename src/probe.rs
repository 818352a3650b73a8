//! Feed-forward probe reading predictions out of a hidden state.

use std::fmt;

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Linear, Module, VarBuilder, VarMap, linear};

use crate::{
    Result,
    config::MetricConfig,
    types::{
        LABEL_DIM, NUM_GOALS, NUM_ORDER_CLASSES, NUM_RULE_CLASSES, NUM_RULES, ORDERING_LABEL_DIM,
        RULE_LABEL_DIM,
    },
};

/// Logits of one forward pass, split per head.
#[derive(Debug, Clone)]
pub struct ProbeLogits {
    /// `NUM_GOALS x NUM_ORDER_CLASSES`
    pub ordering: Tensor,
    /// `NUM_RULES x NUM_RULE_CLASSES`
    pub rules: Tensor,
}

/// `Linear(hidden_state_dim, hidden_units) -> ReLU -> Linear(hidden_units, 36)`
pub struct PredictionNet {
    hidden: Linear,
    output: Linear,
    varmap: VarMap,
    input_dim: usize,
    hidden_units: usize,
    device: Device,
}

impl PredictionNet {
    pub fn new(input_dim: usize, config: &MetricConfig, device: &Device) -> Result<Self> {
        config.validate()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let hidden = linear(input_dim, config.hidden_units, vb.pp("hidden"))?;
        let output = linear(config.hidden_units, LABEL_DIM, vb.pp("output"))?;

        Ok(Self {
            hidden,
            output,
            varmap,
            input_dim,
            hidden_units: config.hidden_units,
            device: device.clone(),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn label_dim(&self) -> usize {
        LABEL_DIM
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Total number of scalar parameters.
    pub fn num_parameters(&self) -> usize {
        self.vars().iter().map(|v| v.as_tensor().elem_count()).sum()
    }

    /// Run a single `1 x input_dim` hidden state through the probe and split
    /// the 36 logits into the two heads.
    pub fn predict(&self, hidden_state: &Tensor) -> Result<ProbeLogits> {
        let xs = hidden_state.reshape((1, self.input_dim))?;
        let logits = self.forward(&xs)?;
        Self::split_heads(&logits)
    }

    /// Split `1 x 36` logits into ordering (`4 x 5`) and rule (`4 x 4`) heads.
    pub fn split_heads(logits: &Tensor) -> Result<ProbeLogits> {
        let ordering = logits
            .narrow(1, 0, ORDERING_LABEL_DIM)?
            .reshape((NUM_GOALS, NUM_ORDER_CLASSES))?;
        let rules = logits
            .narrow(1, ORDERING_LABEL_DIM, RULE_LABEL_DIM)?
            .reshape((NUM_RULES, NUM_RULE_CLASSES))?;
        Ok(ProbeLogits { ordering, rules })
    }
}

impl Module for PredictionNet {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.output.forward(&self.hidden.forward(xs)?.relu()?)
    }
}

impl fmt::Display for PredictionNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PredictionNet(Linear({} -> {}), ReLU, Linear({} -> {}))",
            self.input_dim, self.hidden_units, self.hidden_units, LABEL_DIM
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net() -> PredictionNet {
        let config = MetricConfig::new().with_hidden_units(16);
        PredictionNet::new(8, &config, &Device::Cpu).unwrap()
    }

    #[test]
    fn heads_have_fixed_shapes() {
        let net = net();
        let hs = Tensor::ones((1, 8), DType::F32, &Device::Cpu).unwrap();
        let logits = net.predict(&hs).unwrap();
        assert_eq!(logits.ordering.dims(), &[4, 5]);
        assert_eq!(logits.rules.dims(), &[4, 4]);
    }

    #[test]
    fn split_preserves_logit_order() {
        let raw: Vec<f32> = (0..36).map(|v| v as f32).collect();
        let logits = Tensor::from_vec(raw, (1, 36), &Device::Cpu).unwrap();
        let heads = PredictionNet::split_heads(&logits).unwrap();
        let ordering = heads.ordering.to_vec2::<f32>().unwrap();
        let rules = heads.rules.to_vec2::<f32>().unwrap();
        assert_eq!(ordering[1], vec![5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(rules[0], vec![20.0, 21.0, 22.0, 23.0]);
        assert_eq!(rules[3], vec![32.0, 33.0, 34.0, 35.0]);
    }

    #[test]
    fn parameter_count_matches_layers() {
        // (8*16 + 16) + (16*36 + 36)
        assert_eq!(net().num_parameters(), 144 + 612);
    }

    #[test]
    fn display_describes_layers() {
        assert_eq!(
            net().to_string(),
            "PredictionNet(Linear(8 -> 16), ReLU, Linear(16 -> 36))"
        );
    }
}
