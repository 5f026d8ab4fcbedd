//! Observation.
use border_core::Obs;
use ndarray::Array1;

/// Observation vector of a simulator or a wrapper.
///
/// The layout of the raw observation of the data center simulator is
/// `[outside_temp, west_temp, east_temp, total_power, ite_power, hvac_power]`.
/// [`ObsNormalizer`](crate::ObsNormalizer) removes `total_power` from it.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyPlusObs {
    /// Values of the sensors.
    pub obs: Array1<f32>,
}

impl EnergyPlusObs {
    /// Creates an observation from a vector.
    pub fn new(obs: Vec<f32>) -> Self {
        Self {
            obs: Array1::from(obs),
        }
    }
}

impl Obs for EnergyPlusObs {
    fn len(&self) -> usize {
        self.obs.len()
    }
}

impl From<Array1<f32>> for EnergyPlusObs {
    fn from(obs: Array1<f32>) -> Self {
        Self { obs }
    }
}

impl From<Vec<f32>> for EnergyPlusObs {
    fn from(obs: Vec<f32>) -> Self {
        Self::new(obs)
    }
}
