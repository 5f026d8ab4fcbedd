//! Named fields of observations and actions in records.
use crate::{BoxSpace, EnergyPlusContinuousAct, EnergyPlusObs, ModelBasedEnv, Space};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::trace;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Configuration of [`Monitor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig<C> {
    /// Names of observation fields, with their indices in the observation.
    pub obs_fields: Vec<(usize, String)>,

    /// Names of the elements of actions.
    pub act_fields: Vec<String>,

    /// Configuration of the inner environment.
    pub inner: C,
}

impl<C: Default> Default for MonitorConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> MonitorConfig<C> {
    /// Creates a configuration for the raw observation and the action of the
    /// data center simulator.
    pub fn new(inner: C) -> Self {
        let obs_fields = [
            (0, "outside_temperature"),
            (1, "west_temperature"),
            (2, "east_temperature"),
            (4, "ite_power"),
            (5, "hvac_power"),
        ];
        let act_fields = [
            "west_setpoint",
            "east_setpoint",
            "west_airflow",
            "east_airflow",
        ];
        Self {
            obs_fields: obs_fields
                .iter()
                .map(|(i, name)| (*i, name.to_string()))
                .collect(),
            act_fields: act_fields.iter().map(|name| name.to_string()).collect(),
            inner,
        }
    }

    /// Sets the names of observation fields.
    pub fn obs_fields(mut self, v: Vec<(usize, String)>) -> Self {
        self.obs_fields = v;
        self
    }

    /// Sets the names of action elements.
    pub fn act_fields(mut self, v: Vec<String>) -> Self {
        self.act_fields = v;
        self
    }
}

/// Adds named observation and action fields to the record of each step.
///
/// The record gets `observation/<name>` and `action/<name>` entries, `reward`,
/// `episode` and `global_step`. The action is taken from `act_native` in the
/// inner record if it exists, i.e., when this wrapper is placed on an
/// [`EpisodeSegmenter`](crate::EpisodeSegmenter), so that setpoints are
/// recorded in the units of the simulator.
///
/// Nothing is written to files; records are passed to the caller as usual.
pub struct Monitor<E> {
    env: E,
    obs_fields: Vec<(usize, String)>,
    act_fields: Vec<String>,
    episode: usize,
    global_step: usize,
}

impl<E> Monitor<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct>,
{
    /// Wraps `env`.
    pub fn new(env: E, obs_fields: Vec<(usize, String)>, act_fields: Vec<String>) -> Self {
        Self {
            env,
            obs_fields,
            act_fields,
            episode: 0,
            global_step: 0,
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

    /// The number of resets so far.
    pub fn episode(&self) -> usize {
        self.episode
    }

    /// The number of steps since construction.
    pub fn global_step(&self) -> usize {
        self.global_step
    }

    fn annotate(
        &self,
        record: &mut Record,
        obs: &EnergyPlusObs,
        act: &EnergyPlusContinuousAct,
        reward: f32,
    ) {
        for (i, name) in self.obs_fields.iter() {
            if let Some(v) = obs.obs.get(*i) {
                record.insert(format!("observation/{}", name), RecordValue::Scalar(*v));
            }
        }

        let act = match record.get_array1("act_native") {
            Ok(native) => native,
            Err(_) => act.act.to_vec(),
        };
        for (name, v) in self.act_fields.iter().zip(act.iter()) {
            record.insert(format!("action/{}", name), RecordValue::Scalar(*v));
        }

        record.insert("reward", RecordValue::Scalar(reward));
        record.insert("episode", RecordValue::Scalar(self.episode as _));
        record.insert("global_step", RecordValue::Scalar(self.global_step as _));
    }
}

impl<E> Env for Monitor<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct>,
{
    type Config = MonitorConfig<E::Config>;
    type Obs = EnergyPlusObs;
    type Act = EnergyPlusContinuousAct;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let env = E::build(&config.inner, seed)?;
        Ok(Self::new(
            env,
            config.obs_fields.clone(),
            config.act_fields.clone(),
        ))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("Monitor::step()");

        let (step, mut record) = self.env.step(a)?;
        self.annotate(&mut record, &step.obs, a, step.reward);
        self.global_step += 1;

        let step = Step::new(
            step.obs,
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        Ok((step, record))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("Monitor::reset()");
        let obs = self.env.reset()?;
        self.episode += 1;
        Ok(obs)
    }
}

impl<E> ModelBasedEnv for Monitor<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct>,
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
