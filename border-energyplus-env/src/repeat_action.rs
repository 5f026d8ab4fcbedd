//! Aggregation of sub-steps into control steps.
use crate::{
    BoundaryConfig, BoxSpace, ControlStepBoundary, EnergyPlusObs, EnvError, ModelBasedEnv, Space,
};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::{debug, trace};
use ndarray::{stack, Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Configuration of [`RepeatAction`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatActionConfig<C> {
    /// Detector of control-step boundaries.
    pub boundary: BoundaryConfig,

    /// Configuration of the inner environment.
    pub inner: C,
}

impl<C> RepeatActionConfig<C> {
    /// Creates a configuration with the default boundary detector.
    pub fn new(inner: C) -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            inner,
        }
    }

    /// Sets the boundary detector.
    pub fn boundary(mut self, boundary: BoundaryConfig) -> Self {
        self.boundary = boundary;
        self
    }
}

/// Repeats an action over the sub-steps of a control interval.
///
/// A call of [`Env::step`] drives the inner environment until the boundary detector
/// reports a new control interval or the inner episode ends. The returned observation
/// and reward are the means over the sub-steps. Termination flags and info are those
/// of the last sub-step.
///
/// The last observation of a control step, not the mean, is the baseline for
/// detecting the next boundary.
pub struct RepeatAction<E> {
    env: E,
    boundary: Box<dyn ControlStepBoundary>,
    last_obs: Option<EnergyPlusObs>,
    window_obs: Vec<EnergyPlusObs>,
    window_reward: Vec<f32>,
}

impl<E> RepeatAction<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    /// Wraps `env` with the given boundary detector.
    pub fn new(env: E, boundary: Box<dyn ControlStepBoundary>) -> Self {
        Self {
            env,
            boundary,
            last_obs: None,
            window_obs: Vec::new(),
            window_reward: Vec::new(),
        }
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

    /// Pointwise mean of the observations and mean of the rewards in the window.
    ///
    /// The window is cleared.
    fn drain_window(&mut self) -> Result<(EnergyPlusObs, f32)> {
        let views = self.window_obs.iter().map(|o| o.obs.view()).collect::<Vec<_>>();
        let obs = stack(Axis(0), &views)?
            .mean_axis(Axis(0))
            .ok_or(EnvError::NotReset)?;
        let reward = self.window_reward.iter().sum::<f32>() / self.window_reward.len() as f32;
        self.window_obs.clear();
        self.window_reward.clear();
        Ok((obs.into(), reward))
    }
}

impl<E> Env for RepeatAction<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    type Config = RepeatActionConfig<E::Config>;
    type Obs = EnergyPlusObs;
    type Act = E::Act;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let boundary = config.boundary.build()?;
        let env = E::build(&config.inner, seed)?;
        Ok(Self::new(env, boundary))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("RepeatAction::step()");

        let last_obs = self.last_obs.take().ok_or(EnvError::NotReset)?;
        self.window_obs.clear();
        self.window_reward.clear();

        let (last, record) = loop {
            let (step, record) = self.env.step(a)?;
            self.window_obs.push(step.obs.clone());
            self.window_reward.push(step.reward);

            let same = self.boundary.is_same_interval(&last_obs, &step.obs);
            if step.is_done() || !same {
                break (step, record);
            }
        };

        let n_sub_steps = self.window_obs.len();
        debug!("Control step of {} sub-steps", n_sub_steps);

        if !last.is_done() {
            self.last_obs = Some(last.obs.clone());
        }
        let (obs, reward) = self.drain_window()?;

        let mut record = record;
        record.insert("n_sub_steps", RecordValue::Scalar(n_sub_steps as _));

        let step = Step::new(
            obs,
            a.clone(),
            reward,
            last.is_terminated,
            last.is_truncated,
            last.info,
        );
        Ok((step, record))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("RepeatAction::reset()");

        self.window_obs.clear();
        self.window_reward.clear();
        self.boundary.reset();

        let obs = self.env.reset()?;
        self.last_obs = Some(obs.clone());
        Ok(obs)
    }
}

impl<E> ModelBasedEnv for RepeatAction<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs>,
{
    fn action_space(&self) -> Space {
        self.env.action_space()
    }

    fn observation_space(&self) -> BoxSpace {
        self.env.observation_space()
    }

    fn cost(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        self.env.cost(states, actions, next_states)
    }
}
