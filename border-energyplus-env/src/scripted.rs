//! A small deterministic stand-in for the data center simulator.
use crate::{
    BoxSpace, EnergyPlusContinuousAct, EnergyPlusInfo, EnergyPlusObs, EnvError, ModelBasedEnv,
    Space,
};
use anyhow::Result;
use border_core::{record::Record, Env, Step};
use log::{info, trace};
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Control intervals in a simulated day.
const INTERVALS_PER_DAY: usize = 96;

/// Comfortable range of zone temperatures in Celsius.
const COMFORT_RANGE: (f32, f32) = (18.0, 27.0);

/// Scale of power in the cost function.
const POWER_SCALE: f32 = 1e5;

/// Configuration of [`ScriptedSim`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedSimConfig {
    /// The number of sub-steps in a control interval.
    pub sub_steps_per_interval: usize,

    /// The number of sub-steps after which the simulation run ends.
    /// The run never ends if `None`.
    pub episode_len: Option<usize>,

    /// Amplitude of uniform noise added to temperatures and the IT equipment power.
    pub noise: f32,
}

impl Default for ScriptedSimConfig {
    fn default() -> Self {
        Self {
            sub_steps_per_interval: 3,
            episode_len: Some(INTERVALS_PER_DAY * 3 * 10),
            noise: 0.1,
        }
    }
}

impl ScriptedSimConfig {
    /// Sets the number of sub-steps in a control interval.
    pub fn sub_steps_per_interval(mut self, v: usize) -> Self {
        self.sub_steps_per_interval = v;
        self
    }

    /// Sets the length of a simulation run in sub-steps.
    pub fn episode_len(mut self, v: Option<usize>) -> Self {
        self.episode_len = v;
        self
    }

    /// Sets the amplitude of noise.
    pub fn noise(mut self, v: f32) -> Self {
        self.noise = v;
        self
    }
}

/// A two-zone data center driven by a sinusoidal outside temperature.
///
/// Observations follow the raw layout
/// `[outside_temp, west_temp, east_temp, total_power, ite_power, hvac_power]`
/// and actions are `[west_setpoint, east_setpoint, west_airflow, east_airflow]`
/// in native units. Temperatures change only at the first sub-step of each
/// control interval, as in EnergyPlus, so that [`ObsPrefixBoundary`] detects
/// the control intervals. Powers change at every sub-step.
///
/// The reward of a sub-step is the negative of its cost.
///
/// [`ObsPrefixBoundary`]: crate::ObsPrefixBoundary
pub struct ScriptedSim {
    config: ScriptedSimConfig,
    rng: fastrand::Rng,
    obs_space: BoxSpace,
    act_space: BoxSpace,
    sub_step: usize,
    running: bool,
    temps: [f32; 3],
    n_resets: usize,
    n_steps: usize,
}

impl ScriptedSim {
    /// The number of calls of [`Env::reset`].
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// The number of sub-steps since construction.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// The number of sub-steps since the last reset.
    pub fn sub_step(&self) -> usize {
        self.sub_step
    }

    fn interval(&self) -> usize {
        self.sub_step / self.config.sub_steps_per_interval
    }

    fn noise(&mut self) -> f32 {
        self.config.noise * (2.0 * self.rng.f32() - 1.0)
    }

    fn outside_temperature(interval: usize) -> f32 {
        20.0 + 10.0 * (2.0 * PI * interval as f32 / INTERVALS_PER_DAY as f32).sin()
    }

    /// Advances zone temperatures towards the setpoints, pulled by the outside.
    fn update_temperatures(&mut self, act: &Array1<f32>) {
        let outside = Self::outside_temperature(self.interval()) + self.noise();
        let [_, west, east] = self.temps;
        let west = west + 0.3 * (act[0] - west) + 0.05 * (outside - west);
        let east = east + 0.3 * (act[1] - east) + 0.05 * (outside - east);
        let (nw, ne) = (self.noise(), self.noise());
        self.temps = [
            self.clip(0, outside),
            self.clip(1, west + nw),
            self.clip(2, east + ne),
        ];
    }

    fn clip(&self, i: usize, v: f32) -> f32 {
        v.max(self.obs_space.low[i]).min(self.obs_space.high[i])
    }

    fn observe(&mut self, act: Option<&Array1<f32>>) -> EnergyPlusObs {
        let phase = 2.0 * PI * self.sub_step as f32
            / (INTERVALS_PER_DAY * self.config.sub_steps_per_interval) as f32;
        let ite = 4e4 + 1e4 * phase.sin() + 100.0 * self.noise();
        let hvac = match act {
            Some(act) => {
                let heat = (self.temps[0] - 0.5 * (act[0] + act[1])).max(0.0);
                1e4 * (act[2] + act[3]) + 2e3 * heat
            }
            None => 0.0,
        };
        let ite = self.clip(4, ite);
        let hvac = self.clip(5, hvac);
        EnergyPlusObs::new(vec![
            self.temps[0],
            self.temps[1],
            self.temps[2],
            ite + hvac,
            ite,
            hvac,
        ])
    }

    fn row_cost(next_state: &[f32]) -> f32 {
        let (low, high) = COMFORT_RANGE;
        let violation: f32 = next_state[1..3]
            .iter()
            .map(|t| (low - t).max(0.0) + (t - high).max(0.0))
            .sum();
        next_state[3] / POWER_SCALE + violation
    }
}

impl Env for ScriptedSim {
    type Config = ScriptedSimConfig;
    type Obs = EnergyPlusObs;
    type Act = EnergyPlusContinuousAct;
    type Info = EnergyPlusInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.sub_steps_per_interval == 0 {
            return Err(EnvError::InvalidConfig(
                "sub_steps_per_interval must be greater than zero".into(),
            )
            .into());
        }
        info!("Build ScriptedSim with seed {}", seed);

        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed as u64),
            obs_space: BoxSpace::new(
                vec![-20.0, -20.0, -20.0, 0.0, 0.0, 0.0],
                vec![50.0, 50.0, 50.0, 2e5, 1e5, 1e5],
            )?,
            act_space: BoxSpace::new(vec![15.0, 15.0, 0.5, 0.5], vec![30.0, 30.0, 5.0, 5.0])?,
            sub_step: 0,
            running: false,
            temps: [20.0, 22.0, 22.0],
            n_resets: 0,
            n_steps: 0,
        })
    }

    /// Advances the simulation by a sub-step.
    ///
    /// Actions are clipped to the action space.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("ScriptedSim::step()");

        if !self.running {
            return Err(EnvError::NotReset.into());
        }
        if a.act.len() != self.act_space.dims() {
            return Err(EnvError::ActShape {
                expected: self.act_space.dims(),
                actual: a.act.len(),
            }
            .into());
        }
        let act: Array1<f32> = a
            .act
            .iter()
            .zip(self.act_space.low.iter().zip(self.act_space.high.iter()))
            .map(|(v, (l, h))| v.max(*l).min(*h))
            .collect();

        self.sub_step += 1;
        self.n_steps += 1;
        if self.sub_step % self.config.sub_steps_per_interval == 0 {
            self.update_temperatures(&act);
        }
        let obs = self.observe(Some(&act));
        let reward = -Self::row_cost(&obs.obs.to_vec());

        let is_terminated = self
            .config
            .episode_len
            .map_or(false, |len| self.sub_step >= len);
        if is_terminated {
            info!("Simulation run ended after {} sub-steps", self.sub_step);
            self.running = false;
        }

        let step = Step::new(
            obs,
            a.clone(),
            reward,
            is_terminated,
            false,
            EnergyPlusInfo::default(),
        );
        Ok((step, Record::empty()))
    }

    /// Restarts the simulation run from its first sub-step.
    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("ScriptedSim::reset()");

        self.sub_step = 0;
        self.running = true;
        self.n_resets += 1;
        self.temps = [Self::outside_temperature(0), 22.0, 22.0];
        Ok(self.observe(None))
    }
}

impl ModelBasedEnv for ScriptedSim {
    fn action_space(&self) -> Space {
        Space::Box(self.act_space.clone())
    }

    fn observation_space(&self) -> BoxSpace {
        self.obs_space.clone()
    }

    /// Total power scaled by `1e5` plus the deviation of the zone temperatures
    /// of `next_states` from the comfortable range.
    fn cost(
        &self,
        _states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        if actions.ncols() != self.act_space.dims() {
            return Err(EnvError::ActShape {
                expected: self.act_space.dims(),
                actual: actions.ncols(),
            }
            .into());
        }
        if next_states.ncols() != self.obs_space.dims() {
            return Err(EnvError::ObsShape {
                expected: self.obs_space.dims(),
                actual: next_states.ncols(),
            }
            .into());
        }
        Ok(next_states
            .outer_iter()
            .map(|row| Self::row_cost(&row.to_vec()))
            .collect())
    }
}
