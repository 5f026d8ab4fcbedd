//! Segmentation of a long simulation run into training episodes.
use crate::{
    BoxSpace, EnergyPlusContinuousAct, EnergyPlusInfo, EnergyPlusObs, EnvError, ModelBasedEnv,
    Space,
};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
use log::{debug, info, trace};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Five days of 15-minute control intervals.
const DEFAULT_MAX_STEPS: usize = 96 * 5;

/// Configuration of [`EpisodeSegmenter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSegmenterConfig<C> {
    /// The maximum number of steps in a segment.
    pub max_steps: usize,

    /// Configuration of the inner environment.
    pub inner: C,
}

impl<C: Default> Default for EpisodeSegmenterConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> EpisodeSegmenterConfig<C> {
    /// Creates a configuration with segments of 480 steps.
    pub fn new(inner: C) -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            inner,
        }
    }

    /// Sets the maximum number of steps in a segment.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentState {
    /// The segment has finished after the given number of steps.
    AwaitingReset(usize),
    Active(usize),
}

/// Cuts a simulation run into segments of at most `max_steps` steps.
///
/// A segment ends either when the inner environment ends its episode or when
/// `max_steps` steps have been taken. In the latter case the step is marked as
/// truncated and the following [`Env::reset`] does not reset the inner environment;
/// the next segment starts from the last observation of the previous one.
/// [`EnergyPlusInfo::true_done`] tells whether the inner episode has really ended.
///
/// Actions are given in `[-1, 1]` and mapped onto the action space of the inner
/// environment by `low + (a + 1) / 2 * (high - low)`. Actions out of `[-1, 1]` are
/// rejected, not clipped.
pub struct EpisodeSegmenter<E> {
    env: E,
    max_steps: usize,
    state: SegmentState,
    true_done: bool,
    last_obs: Option<EnergyPlusObs>,
    act_space: BoxSpace,
    native_low: Array1<f32>,
    native_span: Array1<f32>,
}

impl<E> EpisodeSegmenter<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct, Info = EnergyPlusInfo>,
{
    /// Wraps `env`, which must have a continuous action space.
    pub fn new(env: E, max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(EnvError::InvalidConfig("max_steps must be greater than zero".into()).into());
        }
        let native_space = env.action_space().into_box()?;
        info!(
            "Segments of {} steps, native action space {}",
            max_steps, native_space
        );

        Ok(Self {
            env,
            max_steps,
            state: SegmentState::AwaitingReset(0),
            true_done: true,
            last_obs: None,
            act_space: BoxSpace::symmetric(native_space.dims()),
            native_low: native_space.low_array(),
            native_span: native_space.span_array(),
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

    /// The number of steps taken in the current segment.
    ///
    /// After the end of a segment it is the length of that segment until the next reset.
    pub fn current_steps(&self) -> usize {
        match self.state {
            SegmentState::Active(n) | SegmentState::AwaitingReset(n) => n,
        }
    }

    /// The maximum number of steps in a segment.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Whether the inner episode has ended since the last reset of the inner environment.
    pub fn is_true_done(&self) -> bool {
        self.true_done
    }

    /// Maps an action in `[-1, 1]` onto the native range.
    pub fn to_native(&self, act: &Array1<f32>) -> Array1<f32> {
        (act + 1.0) * 0.5 * &self.native_span + &self.native_low
    }
}

impl<E> Env for EpisodeSegmenter<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct, Info = EnergyPlusInfo>,
{
    type Config = EpisodeSegmenterConfig<E::Config>;
    type Obs = EnergyPlusObs;
    type Act = EnergyPlusContinuousAct;
    type Info = EnergyPlusInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let env = E::build(&config.inner, seed)?;
        Self::new(env, config.max_steps)
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        trace!("EpisodeSegmenter::step()");

        let current_steps = match self.state {
            SegmentState::Active(n) => n,
            SegmentState::AwaitingReset(_) if self.last_obs.is_none() => {
                return Err(EnvError::NotReset.into())
            }
            SegmentState::AwaitingReset(_) => {
                return Err(EnvError::SegmentFinished(self.max_steps).into())
            }
        };
        if !self.act_space.contains(a.act.iter()) {
            return Err(EnvError::ActionOutOfBounds(
                format!("{}", a.act),
                format!("{}", self.act_space),
            )
            .into());
        }

        let native = EnergyPlusContinuousAct::from(self.to_native(&a.act));
        let (step, mut record) = self.env.step(&native)?;
        self.last_obs = Some(step.obs.clone());
        record.insert("act_native", RecordValue::Array1(native.act.to_vec()));

        let mut info = step.info;
        if step.is_terminated || step.is_truncated {
            debug!("Simulation ended after {} steps in segment", current_steps + 1);
            self.true_done = true;
            self.state = SegmentState::AwaitingReset(current_steps + 1);
            info.true_done = Some(true);
            record.insert("segment_step", RecordValue::Scalar((current_steps + 1) as _));
            let step = Step::new(
                step.obs,
                a.clone(),
                step.reward,
                step.is_terminated,
                step.is_truncated,
                info,
            );
            return Ok((step, record));
        }

        info.true_done = Some(false);
        let current_steps = current_steps + 1;
        record.insert("segment_step", RecordValue::Scalar(current_steps as _));
        let is_truncated = current_steps >= self.max_steps;
        self.state = if is_truncated {
            debug!("Segment of {} steps finished", current_steps);
            SegmentState::AwaitingReset(current_steps)
        } else {
            SegmentState::Active(current_steps)
        };

        let step = Step::new(step.obs, a.clone(), step.reward, false, is_truncated, info);
        Ok((step, record))
    }

    /// Starts a new segment.
    ///
    /// The inner environment is reset only if its episode has ended. Otherwise the
    /// last observation is returned and the simulation continues from there.
    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("EpisodeSegmenter::reset()");

        let obs = match (self.true_done, self.last_obs.as_ref()) {
            (false, Some(obs)) => obs.clone(),
            _ => {
                let obs = self.env.reset()?;
                self.last_obs = Some(obs.clone());
                self.true_done = false;
                obs
            }
        };
        self.state = SegmentState::Active(0);
        Ok(obs)
    }
}

impl<E> ModelBasedEnv for EpisodeSegmenter<E>
where
    E: ModelBasedEnv<Obs = EnergyPlusObs, Act = EnergyPlusContinuousAct, Info = EnergyPlusInfo>,
{
    fn action_space(&self) -> Space {
        Space::Box(self.act_space.clone())
    }

    fn observation_space(&self) -> BoxSpace {
        self.env.observation_space()
    }

    /// Maps `actions` onto the native range and forwards the call.
    fn cost(
        &self,
        states: ArrayView2<f32>,
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
        let native: Array2<f32> = (&actions + 1.0) * 0.5 * &self.native_span + &self.native_low;
        self.env.cost(states, native.view(), next_states)
    }
}
