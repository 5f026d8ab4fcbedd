//! Actions.
use border_core::Act;
use ndarray::Array1;

/// Continuous action, a vector of setpoints.
///
/// Whether the values are in the native range of the simulator or in `[-1, 1]`
/// depends on the environment receiving the action.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyPlusContinuousAct {
    /// Values of the action.
    pub act: Array1<f32>,
}

impl EnergyPlusContinuousAct {
    /// Creates a continuous action from a vector.
    pub fn new(act: Vec<f32>) -> Self {
        Self {
            act: Array1::from(act),
        }
    }
}

impl Act for EnergyPlusContinuousAct {
    fn len(&self) -> usize {
        self.act.len()
    }
}

impl From<Array1<f32>> for EnergyPlusContinuousAct {
    fn from(act: Array1<f32>) -> Self {
        Self { act }
    }
}

/// Discrete action, an index of the quantized action table of
/// [`DiscreteActionWrapper`](crate::DiscreteActionWrapper).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnergyPlusDiscreteAct {
    /// Index of the action.
    pub act: i64,
}

impl EnergyPlusDiscreteAct {
    /// Creates a discrete action.
    pub fn new(act: i64) -> Self {
        Self { act }
    }
}

impl Act for EnergyPlusDiscreteAct {
    fn len(&self) -> usize {
        1
    }
}

impl From<i64> for EnergyPlusDiscreteAct {
    fn from(act: i64) -> Self {
        Self { act }
    }
}
