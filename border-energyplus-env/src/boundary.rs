//! Detection of control-step boundaries.
#![allow(clippy::float_cmp)]
use crate::{EnergyPlusObs, EnvError};
use serde::{Deserialize, Serialize};

/// Decides whether a sub-step of the simulator still belongs to the current control step.
///
/// Used by [`RepeatAction`](crate::RepeatAction), which keeps repeating an action
/// while [`ControlStepBoundary::is_same_interval`] returns `true`.
pub trait ControlStepBoundary {
    /// Called when the environment is reset.
    fn reset(&mut self) {}

    /// Returns `true` if `obs`, the observation of the latest sub-step, belongs to
    /// the same control interval as `last`, the last observation of the previous
    /// control step (or the observation at reset).
    fn is_same_interval(&mut self, last: &EnergyPlusObs, obs: &EnergyPlusObs) -> bool;
}

/// Compares the first `len` fields of observations.
///
/// EnergyPlus updates some fields, e.g. temperatures, only once per control interval,
/// so the interval is unchanged as long as these fields are equal.
#[derive(Clone, Debug)]
pub struct ObsPrefixBoundary {
    len: usize,
}

impl ObsPrefixBoundary {
    /// Compares the first `len` fields.
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl ControlStepBoundary for ObsPrefixBoundary {
    fn is_same_interval(&mut self, last: &EnergyPlusObs, obs: &EnergyPlusObs) -> bool {
        last.obs
            .iter()
            .take(self.len)
            .eq(obs.obs.iter().take(self.len))
    }
}

/// Counts sub-steps, a control step spans exactly `n` of them.
#[derive(Clone, Debug)]
pub struct SubStepCountBoundary {
    n: usize,
    count: usize,
}

impl SubStepCountBoundary {
    /// A control step of `n` sub-steps.
    pub fn new(n: usize) -> Self {
        Self { n, count: 0 }
    }
}

impl ControlStepBoundary for SubStepCountBoundary {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn is_same_interval(&mut self, _last: &EnergyPlusObs, _obs: &EnergyPlusObs) -> bool {
        self.count += 1;
        if self.count >= self.n {
            self.count = 0;
            false
        } else {
            true
        }
    }
}

/// Configuration of the boundary detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryConfig {
    /// See [`ObsPrefixBoundary`].
    ObsPrefix {
        /// Number of fields compared.
        len: usize,
    },

    /// See [`SubStepCountBoundary`].
    SubSteps {
        /// Number of sub-steps in a control step.
        n: usize,
    },
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self::ObsPrefix { len: 3 }
    }
}

impl BoundaryConfig {
    /// Builds the detector.
    pub fn build(&self) -> Result<Box<dyn ControlStepBoundary>, EnvError> {
        match self {
            Self::ObsPrefix { len } if *len == 0 => Err(EnvError::InvalidConfig(
                "an empty prefix never detects a boundary".to_string(),
            )),
            Self::ObsPrefix { len } => Ok(Box::new(ObsPrefixBoundary::new(*len))),
            Self::SubSteps { n } if *n == 0 => Err(EnvError::InvalidConfig(
                "a control step needs at least one sub-step".to_string(),
            )),
            Self::SubSteps { n } => Ok(Box::new(SubStepCountBoundary::new(*n))),
        }
    }
}
