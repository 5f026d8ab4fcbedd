//! Normalization of observations.
use crate::{BoxSpace, EnergyPlusObs, EnvError, ModelBasedEnv, Space};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::trace;
use ndarray::{s, Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Index of the total power in the raw observation.
///
/// The total power is the sum of the two fields following it, the IT equipment
/// power and the HVAC power. [`ObsNormalizer`] drops it and restores it in the
/// inverse transformation.
pub const TOTAL_POWER_INDEX: usize = 3;

/// Configuration of [`ObsNormalizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObsNormalizerConfig<C> {
    /// Scale of each field of the normalized observation, i.e., the raw observation
    /// without the total power.
    pub obs_max: Vec<f32>,

    /// Configuration of the inner environment.
    pub inner: C,
}

impl<C: Default> Default for ObsNormalizerConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> ObsNormalizerConfig<C> {
    /// Creates a configuration for the data center layout,
    /// three temperatures in Celsius and two powers in Watt.
    pub fn new(inner: C) -> Self {
        Self {
            obs_max: vec![50.0, 50.0, 50.0, 1e5, 1e5],
            inner,
        }
    }

    /// Sets the scales.
    pub fn obs_max(mut self, obs_max: Vec<f32>) -> Self {
        self.obs_max = obs_max;
        self
    }
}

/// Drops the total power from observations and rescales the remaining fields.
///
/// For a raw observation `[t0, t1, t2, p_total, p_ite, p_hvac]` it returns
/// `[t0, t1, t2, p_ite, p_hvac] / obs_max`. The inverse transformations restore
/// `p_total` as `p_ite + p_hvac`, which is used to evaluate the cost function of
/// the inner environment on normalized states.
pub struct ObsNormalizer<E> {
    env: E,
    obs_max: Array1<f32>,
}

impl<E> ObsNormalizer<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    /// Wraps `env`.
    ///
    /// `obs_max` needs at least five positive, finite elements.
    pub fn new(env: E, obs_max: Vec<f32>) -> Result<Self> {
        if obs_max.len() < TOTAL_POWER_INDEX + 2 {
            return Err(EnvError::InvalidConfig(format!(
                "obs_max needs at least {} elements, got {}",
                TOTAL_POWER_INDEX + 2,
                obs_max.len()
            ))
            .into());
        }
        if obs_max.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(EnvError::InvalidConfig(format!(
                "obs_max must be positive and finite, got {:?}",
                obs_max
            ))
            .into());
        }
        Ok(Self {
            env,
            obs_max: Array1::from(obs_max),
        })
    }

    /// Returns a reference to the inner environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Returns a mutable reference to the inner environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Unwraps the inner environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    fn check_len(&self, expected: usize, actual: usize) -> Result<(), EnvError> {
        if expected == actual {
            Ok(())
        } else {
            Err(EnvError::ObsShape { expected, actual })
        }
    }

    /// Normalizes a raw observation.
    pub fn observation(&self, raw: &EnergyPlusObs) -> Result<EnergyPlusObs, EnvError> {
        self.check_len(self.obs_max.len() + 1, raw.obs.len())?;
        let kept: Array1<f32> = raw
            .obs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != TOTAL_POWER_INDEX)
            .map(|(_, v)| *v)
            .collect();
        Ok((kept / &self.obs_max).into())
    }

    /// Inverse of [`ObsNormalizer::observation`].
    ///
    /// The returned observation is one element longer than `normalized`.
    pub fn reverse_observation(&self, normalized: &EnergyPlusObs) -> Result<EnergyPlusObs, EnvError> {
        self.check_len(self.obs_max.len(), normalized.obs.len())?;
        let obs = &normalized.obs * &self.obs_max;
        let total = obs[TOTAL_POWER_INDEX] + obs[TOTAL_POWER_INDEX + 1];

        let mut raw = Vec::with_capacity(obs.len() + 1);
        raw.extend(obs.iter().take(TOTAL_POWER_INDEX));
        raw.push(total);
        raw.extend(obs.iter().skip(TOTAL_POWER_INDEX));
        Ok(raw.into())
    }

    /// Inverse of [`ObsNormalizer::observation`] applied to each row of `normalized`.
    pub fn reverse_observation_batch(
        &self,
        normalized: ArrayView2<f32>,
    ) -> Result<Array2<f32>, EnvError> {
        self.check_len(self.obs_max.len(), normalized.ncols())?;
        let obs = &normalized * &self.obs_max;
        let total = &obs.column(TOTAL_POWER_INDEX) + &obs.column(TOTAL_POWER_INDEX + 1);

        let mut raw = Array2::<f32>::zeros((obs.nrows(), obs.ncols() + 1));
        raw.slice_mut(s![.., ..TOTAL_POWER_INDEX])
            .assign(&obs.slice(s![.., ..TOTAL_POWER_INDEX]));
        raw.column_mut(TOTAL_POWER_INDEX).assign(&total);
        raw.slice_mut(s![.., TOTAL_POWER_INDEX + 1..])
            .assign(&obs.slice(s![.., TOTAL_POWER_INDEX..]));
        Ok(raw)
    }

    /// Same as [`ObsNormalizer::reverse_observation_batch`] for candle tensors
    /// of shape `(batch, n)`.
    #[cfg(feature = "candle")]
    pub fn reverse_observation_batch_tensor(
        &self,
        normalized: &candle_core::Tensor,
    ) -> Result<candle_core::Tensor> {
        use candle_core::{Tensor, D};

        let (_, n) = normalized.dims2()?;
        self.check_len(self.obs_max.len(), n)?;
        let obs_max = Tensor::from_iter(self.obs_max.iter().cloned(), normalized.device())?
            .to_dtype(normalized.dtype())?
            .unsqueeze(0)?;
        let obs = normalized.broadcast_mul(&obs_max)?;
        let total = (obs.narrow(1, TOTAL_POWER_INDEX, 1)?
            + obs.narrow(1, TOTAL_POWER_INDEX + 1, 1)?)?;
        let raw = Tensor::cat(
            &[
                &obs.narrow(1, 0, TOTAL_POWER_INDEX)?,
                &total,
                &obs.narrow(1, TOTAL_POWER_INDEX, n - TOTAL_POWER_INDEX)?,
            ],
            D::Minus1,
        )?;
        Ok(raw)
    }
}

impl<E> Env for ObsNormalizer<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    type Config = ObsNormalizerConfig<E::Config>;
    type Obs = EnergyPlusObs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let env = E::build(&config.inner, seed)?;
        Self::new(env, config.obs_max.clone())
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("ObsNormalizer::step()");

        let (step, mut record) = self.env.step(a)?;
        let obs = self.observation(&step.obs)?;
        record.insert("obs", RecordValue::Array1(obs.obs.to_vec()));

        let step = Step::new(
            obs,
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        Ok((step, record))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("ObsNormalizer::reset()");
        let obs = self.env.reset()?;
        Ok(self.observation(&obs)?)
    }
}

impl<E> ModelBasedEnv for ObsNormalizer<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    fn action_space(&self) -> Space {
        self.env.action_space()
    }

    /// Bounds of the inner observation space, normalized in the same way as observations.
    fn observation_space(&self) -> BoxSpace {
        let inner = self.env.observation_space();
        let normalize = |bound: &[f32]| -> Vec<f32> {
            bound
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != TOTAL_POWER_INDEX)
                .zip(self.obs_max.iter())
                .map(|((_, v), m)| v / m)
                .collect()
        };
        BoxSpace {
            low: normalize(&inner.low),
            high: normalize(&inner.high),
        }
    }

    /// Restores raw `states` and `next_states` and forwards the call.
    fn cost(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        let states = self.reverse_observation_batch(states)?;
        let next_states = self.reverse_observation_batch(next_states)?;
        self.env.cost(states.view(), actions, next_states.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScriptedSim, ScriptedSimConfig};
    use ndarray::{arr1, arr2};

    fn normalizer() -> ObsNormalizer<ScriptedSim> {
        let sim = ScriptedSim::build(&ScriptedSimConfig::default(), 0).unwrap();
        ObsNormalizer::new(sim, vec![50.0, 50.0, 50.0, 1e5, 1e5]).unwrap()
    }

    #[test]
    fn test_observation_drops_total_power() {
        let n = normalizer();
        let raw = EnergyPlusObs::new(vec![25.0, 20.0, 10.0, 7e4, 5e4, 2e4]);
        let obs = n.observation(&raw).unwrap();
        assert_eq!(obs.obs, arr1(&[0.5, 0.4, 0.2, 0.5, 0.2]));
    }

    #[test]
    fn test_reverse_observation_restores_total_power() {
        let n = normalizer();
        let obs = EnergyPlusObs::new(vec![0.5, 0.4, 0.2, 0.5, 0.25]);
        let raw = n.reverse_observation(&obs).unwrap();
        assert_eq!(raw.obs, arr1(&[25.0, 20.0, 10.0, 75000.0, 50000.0, 25000.0]));
    }

    #[test]
    fn test_reverse_observation_batch() {
        let n = normalizer();
        let batch = arr2(&[[0.5, 0.4, 0.2, 0.5, 0.25], [0.0, -0.2, 1.0, 0.0, 1.0]]);
        let raw = n.reverse_observation_batch(batch.view()).unwrap();
        assert_eq!(
            raw,
            arr2(&[
                [25.0, 20.0, 10.0, 75000.0, 50000.0, 25000.0],
                [0.0, -10.0, 50.0, 100000.0, 0.0, 100000.0]
            ])
        );
    }

    #[test]
    fn test_shape_errors() {
        let n = normalizer();
        let short = EnergyPlusObs::new(vec![0.0; 5]);
        assert_eq!(
            n.observation(&short),
            Err(EnvError::ObsShape {
                expected: 6,
                actual: 5
            })
        );
        assert!(n.reverse_observation(&EnergyPlusObs::new(vec![0.0; 6])).is_err());
        assert!(n
            .reverse_observation_batch(Array2::zeros((2, 4)).view())
            .is_err());
    }

    #[test]
    fn test_invalid_obs_max() {
        let sim = ScriptedSim::build(&ScriptedSimConfig::default(), 0).unwrap();
        assert!(ObsNormalizer::new(sim, vec![50.0, 50.0, 50.0, 1e5]).is_err());
        let sim = ScriptedSim::build(&ScriptedSimConfig::default(), 0).unwrap();
        assert!(ObsNormalizer::new(sim, vec![50.0, 50.0, 0.0, 1e5, 1e5]).is_err());
    }

    #[cfg(feature = "candle")]
    #[test]
    fn test_reverse_observation_batch_tensor() -> Result<()> {
        use candle_core::{Device, Tensor};

        let n = normalizer();
        let batch = arr2(&[[0.5f32, 0.4, 0.2, 0.5, 0.25], [0.0, -0.2, 1.0, 0.0, 1.0]]);
        let tensor = Tensor::from_iter(batch.iter().cloned(), &Device::Cpu)?.reshape((2, 5))?;

        let expected = n.reverse_observation_batch(batch.view())?;
        let actual = n.reverse_observation_batch_tensor(&tensor)?.to_vec2::<f32>()?;
        for (row_e, row_a) in expected.outer_iter().zip(actual.iter()) {
            assert_eq!(row_e.to_vec(), *row_a);
        }
        Ok(())
    }
}
