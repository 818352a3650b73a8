//! Label newtypes and the fixed cardinalities of the CoMaze prediction heads.

use std::fmt;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of goals whose reach ordering is predicted.
pub const NUM_GOALS: usize = 4;

/// Ordering classes per goal (four ranks plus "not reached").
pub const NUM_ORDER_CLASSES: usize = 5;

/// Number of rules whose assignment is predicted.
pub const NUM_RULES: usize = 4;

/// Classes per rule.
pub const NUM_RULE_CLASSES: usize = 4;

/// Width of the goal ordering head.
pub const ORDERING_LABEL_DIM: usize = NUM_GOALS * NUM_ORDER_CLASSES;

/// Width of the rule head.
pub const RULE_LABEL_DIM: usize = NUM_RULES * NUM_RULE_CLASSES;

/// Total probe output width.
pub const LABEL_DIM: usize = ORDERING_LABEL_DIM + RULE_LABEL_DIM;

/// Ground-truth ordering class of each goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; NUM_GOALS]")]
pub struct GoalOrderingLabels([u32; NUM_GOALS]);

impl GoalOrderingLabels {
    /// Create goal ordering labels, validating every class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGoalOrderingLabel`] if any value is >= 5.
    pub fn new(values: [u32; NUM_GOALS]) -> Result<Self> {
        for (goal, &value) in values.iter().enumerate() {
            if value as usize >= NUM_ORDER_CLASSES {
                return Err(Error::InvalidGoalOrderingLabel {
                    goal,
                    value,
                    max: NUM_ORDER_CLASSES as u32 - 1,
                });
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[u32; NUM_GOALS] {
        &self.0
    }

    /// Labels as a `NUM_GOALS x 1` index tensor, ready for `gather`.
    pub fn to_index_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::new(&self.0, device)?.reshape((NUM_GOALS, 1))?)
    }
}

impl TryFrom<[u32; NUM_GOALS]> for GoalOrderingLabels {
    type Error = Error;

    fn try_from(values: [u32; NUM_GOALS]) -> Result<Self> {
        Self::new(values)
    }
}

impl fmt::Display for GoalOrderingLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Ground-truth class of each rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; NUM_RULES]")]
pub struct RuleLabels([u32; NUM_RULES]);

impl RuleLabels {
    /// Create rule labels, validating every class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRuleLabel`] if any value is >= 4.
    pub fn new(values: [u32; NUM_RULES]) -> Result<Self> {
        for (rule, &value) in values.iter().enumerate() {
            if value as usize >= NUM_RULE_CLASSES {
                return Err(Error::InvalidRuleLabel {
                    rule,
                    value,
                    max: NUM_RULE_CLASSES as u32 - 1,
                });
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[u32; NUM_RULES] {
        &self.0
    }

    /// Labels as a `NUM_RULES x 1` index tensor, ready for `gather`.
    pub fn to_index_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::new(&self.0, device)?.reshape((NUM_RULES, 1))?)
    }
}

impl TryFrom<[u32; NUM_RULES]> for RuleLabels {
    type Error = Error;

    fn try_from(values: [u32; NUM_RULES]) -> Result<Self> {
        Self::new(values)
    }
}

impl fmt::Display for RuleLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
