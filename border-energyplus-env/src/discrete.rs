//! Quantization of continuous actions into a discrete action space.
use crate::{
    BoxSpace, DiscreteSpace, EnergyPlusContinuousAct, EnergyPlusDiscreteAct, EnvError,
    ModelBasedEnv, Space,
};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::{info, trace};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Integers above this are not exactly representable in `f32`.
const MAX_F32_INDEX: i64 = 1 << 24;

/// Configuration of [`DiscreteActionWrapper`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteActionConfig<C> {
    /// The number of levels in each dimension of the action.
    pub num_levels: usize,

    /// Configuration of the inner environment.
    pub inner: C,
}

impl<C: Default> Default for DiscreteActionConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> DiscreteActionConfig<C> {
    /// Creates a configuration with 4 levels.
    pub fn new(inner: C) -> Self {
        Self {
            num_levels: 4,
            inner,
        }
    }

    /// Sets the number of levels.
    pub fn num_levels(mut self, v: usize) -> Self {
        self.num_levels = v;
        self
    }
}

/// Exposes a discrete action space over an environment with actions in `[-1, 1]^dims`.
///
/// Each dimension takes one of `num_levels` values evenly spaced in `[-1, 1]`,
/// giving `num_levels^dims` discrete actions. An index is decoded digit by digit
/// in base `num_levels`, the least significant digit being the first dimension.
pub struct DiscreteActionWrapper<E> {
    env: E,
    num_levels: usize,
    dims: usize,
    table: Vec<f32>,
    act_space: DiscreteSpace,
}

impl<E> DiscreteActionWrapper<E>
where
    E: ModelBasedEnv<Act = EnergyPlusContinuousAct>,
{
    /// Wraps `env`, which must have a continuous action space.
    pub fn new(env: E, num_levels: usize) -> Result<Self> {
        let dims = env.action_space().into_box()?.dims();
        if num_levels == 0 {
            return Err(EnvError::InvalidConfig("num_levels must be greater than zero".into()).into());
        }
        let n = (num_levels as i64)
            .checked_pow(dims as u32)
            .ok_or_else(|| {
                EnvError::InvalidConfig(format!(
                    "{}^{} discrete actions overflow",
                    num_levels, dims
                ))
            })?;
        let table = Array1::linspace(-1.0, 1.0, num_levels).to_vec();
        info!("{} discrete actions, levels {:?}", n, table);

        Ok(Self {
            env,
            num_levels,
            dims,
            table,
            act_space: DiscreteSpace { n },
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

    /// Values each dimension of the action can take.
    pub fn action_table(&self) -> &[f32] {
        &self.table
    }

    /// Decodes an index into the level of each dimension.
    pub fn levels(&self, index: i64) -> Result<Vec<usize>, EnvError> {
        if !self.act_space.contains(index) {
            return Err(EnvError::ActionOutOfBounds(
                index.to_string(),
                self.act_space.to_string(),
            ));
        }
        let base = self.num_levels as i64;
        let mut rest = index;
        Ok((0..self.dims)
            .map(|_| {
                let level = rest % base;
                rest /= base;
                level as usize
            })
            .collect())
    }

    /// Converts an index into a continuous action.
    pub fn action(&self, index: i64) -> Result<EnergyPlusContinuousAct, EnvError> {
        let act: Array1<f32> = self
            .levels(index)?
            .into_iter()
            .map(|l| self.table[l])
            .collect();
        Ok(act.into())
    }

    /// Returns the index of the discrete action closest to `act`.
    ///
    /// Each dimension is snapped to the nearest level independently. A value
    /// equally close to two levels is snapped to the lower one.
    pub fn reverse_action(&self, act: &EnergyPlusContinuousAct) -> Result<i64, EnvError> {
        if act.act.len() != self.dims {
            return Err(EnvError::ActShape {
                expected: self.dims,
                actual: act.act.len(),
            });
        }
        if act.act.iter().any(|v| v.is_nan()) {
            return Err(EnvError::ActionOutOfBounds(
                format!("{}", act.act),
                "action table".to_string(),
            ));
        }

        let base = self.num_levels as i64;
        let index = act.act.iter().rev().fold(0i64, |index, v| {
            index * base + self.nearest_level(*v) as i64
        });
        Ok(index)
    }

    fn nearest_level(&self, v: f32) -> usize {
        let mut best = 0;
        for (l, x) in self.table.iter().enumerate().skip(1) {
            if (x - v).abs() < (self.table[best] - v).abs() {
                best = l;
            }
        }
        best
    }
}

impl<E> Env for DiscreteActionWrapper<E>
where
    E: ModelBasedEnv<Act = EnergyPlusContinuousAct>,
{
    type Config = DiscreteActionConfig<E::Config>;
    type Obs = E::Obs;
    type Act = EnergyPlusDiscreteAct;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let env = E::build(&config.inner, seed)?;
        Self::new(env, config.num_levels)
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("DiscreteActionWrapper::step()");

        let act = self.action(a.act)?;
        let (step, mut record) = self.env.step(&act)?;
        record.insert("act_index", RecordValue::Scalar(a.act as _));

        let step = Step::new(
            step.obs,
            *a,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        Ok((step, record))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("DiscreteActionWrapper::reset()");
        self.env.reset()
    }
}

impl<E> ModelBasedEnv for DiscreteActionWrapper<E>
where
    E: ModelBasedEnv<Act = EnergyPlusContinuousAct>,
{
    fn action_space(&self) -> Space {
        Space::Discrete(self.act_space)
    }

    fn observation_space(&self) -> BoxSpace {
        self.env.observation_space()
    }

    /// `actions` is a column of indices, which are decoded before forwarding the call.
    ///
    /// Indices are given as `f32`, so this fails for spaces of more than `2^24` actions.
    fn cost(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        if actions.ncols() != 1 {
            return Err(EnvError::ActShape {
                expected: 1,
                actual: actions.ncols(),
            }
            .into());
        }
        if self.act_space.n > MAX_F32_INDEX {
            return Err(EnvError::InvalidConfig(format!(
                "{} cannot be indexed with f32",
                self.act_space
            ))
            .into());
        }
        let mut decoded = Array2::<f32>::zeros((actions.nrows(), self.dims));
        for (mut row, index) in decoded.outer_iter_mut().zip(actions.column(0).iter()) {
            if index.fract() != 0.0 {
                return Err(
                    EnvError::ActionOutOfBounds(index.to_string(), self.act_space.to_string())
                        .into(),
                );
            }
            row.assign(&self.action(*index as i64)?.act);
        }
        self.env.cost(states, decoded.view(), next_states)
    }
}
