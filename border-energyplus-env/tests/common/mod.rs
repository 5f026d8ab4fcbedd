//! A simulator whose observations are known functions of the sub-step index.
#![allow(dead_code)]
use anyhow::Result;
use border_core::{record::Record, Env, Step};
use border_energyplus_env::{
    BoxSpace, EnergyPlusContinuousAct, EnergyPlusInfo, EnergyPlusObs, EnvError, ModelBasedEnv,
    Space,
};
use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSimConfig {
    /// Sub-steps per control interval.
    pub k: usize,

    /// The sub-step at which the run terminates.
    pub terminal_at: Option<usize>,

    /// Dimension of actions.
    pub dims: usize,
}

impl Default for TableSimConfig {
    fn default() -> Self {
        Self {
            k: 3,
            terminal_at: None,
            dims: 4,
        }
    }
}

/// At sub-step `t` the observation is `[t / k, t / k, t / k, 3t, t, 2t]`, with integer
/// division in the first three fields, and the reward is `t`.
///
/// The native action space is `[0, 10]^dims`.
pub struct TableSim {
    config: TableSimConfig,
    t: usize,
    running: bool,
    pub actions: Vec<Vec<f32>>,
    pub n_resets: usize,
    pub n_steps: usize,
}

impl TableSim {
    pub fn obs_at(&self, t: usize) -> EnergyPlusObs {
        let p = (t / self.config.k) as f32;
        let t = t as f32;
        EnergyPlusObs::new(vec![p, p, p, 3.0 * t, t, 2.0 * t])
    }
}

impl Env for TableSim {
    type Config = TableSimConfig;
    type Obs = EnergyPlusObs;
    type Act = EnergyPlusContinuousAct;
    type Info = EnergyPlusInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        if config.k == 0 {
            return Err(EnvError::InvalidConfig("k = 0".into()).into());
        }
        Ok(Self {
            config: config.clone(),
            t: 0,
            running: false,
            actions: vec![],
            n_resets: 0,
            n_steps: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if !self.running {
            return Err(EnvError::NotReset.into());
        }
        self.actions.push(a.act.to_vec());
        self.t += 1;
        self.n_steps += 1;

        let is_terminated = self.config.terminal_at == Some(self.t);
        if is_terminated {
            self.running = false;
        }
        let step = Step::new(
            self.obs_at(self.t),
            a.clone(),
            self.t as f32,
            is_terminated,
            false,
            EnergyPlusInfo::default(),
        );
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        self.running = true;
        self.n_resets += 1;
        Ok(self.obs_at(0))
    }
}

impl ModelBasedEnv for TableSim {
    fn action_space(&self) -> Space {
        Space::Box(BoxSpace {
            low: vec![0.0; self.config.dims],
            high: vec![10.0; self.config.dims],
        })
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace {
            low: vec![0.0; 6],
            high: vec![1e3, 1e3, 1e3, 3e3, 1e3, 2e3],
        }
    }

    /// Total power of `next_states` plus the sum of `actions`.
    fn cost(
        &self,
        _states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>> {
        Ok(&next_states.column(3) + &actions.sum_axis(Axis(1)))
    }
}

/// Returns the error in `result` as [`EnvError`].
pub fn env_error<T>(result: Result<T>) -> Option<EnvError> {
    result
        .err()
        .and_then(|e| e.downcast_ref::<EnvError>().cloned())
}
