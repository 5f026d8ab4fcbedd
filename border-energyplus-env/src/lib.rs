//! Wrappers connecting building-energy simulators to reinforcement learning agents.
//!
//! A building-energy simulator like [EnergyPlus](https://energyplus.net) advances in
//! short physical sub-steps, while an agent acts at a coarser control interval and
//! learns from episodes of bounded length. This crate provides wrappers, each
//! implementing [`Env`](border_core::Env) and [`ModelBasedEnv`], that reconcile
//! the two sides:
//!
//! * [`RepeatAction`] repeats an action over the sub-steps of a control interval and
//!   averages observations and rewards over them.
//! * [`EpisodeSegmenter`] cuts a long simulation run into episodes of at most
//!   `max_steps` control steps and maps actions in `[-1, 1]` onto the native range
//!   of the simulator. Whether the simulation has really ended is kept in
//!   [`EnergyPlusInfo::true_done`].
//! * [`Monitor`] annotates records with named observation and action fields.
//! * [`ObsNormalizer`] drops the total power field and rescales observations.
//!   Its inverse is used to evaluate costs of normalized, e.g. model-predicted, states.
//! * [`DiscreteActionWrapper`] exposes a single discrete action, decoded into a
//!   quantized continuous action.
//!
//! The wrappers are usually stacked in this order:
//!
//! ```text
//! DiscreteActionWrapper -> ObsNormalizer -> Monitor -> EpisodeSegmenter -> RepeatAction -> simulator
//! ```
//!
//! [`DiscreteStack`] and [`ContinuousStack`] are the corresponding types, built from
//! [`discrete_stack_config`] and [`continuous_stack_config`].
//!
//! The simulator itself is out of the scope of this crate. Any type implementing
//! [`ModelBasedEnv`] with [`EnergyPlusObs`] and [`EnergyPlusContinuousAct`] can be
//! wrapped. [`ScriptedSim`] is a small deterministic stand-in used in tests and examples.
mod act;
mod base;
mod boundary;
mod discrete;
mod error;
mod monitor;
mod normalizer;
mod obs;
mod repeat_action;
mod scripted;
mod segmenter;
mod space;
mod stack;
pub use act::{EnergyPlusContinuousAct, EnergyPlusDiscreteAct};
pub use base::{EnergyPlusInfo, ModelBasedEnv};
pub use boundary::{BoundaryConfig, ControlStepBoundary, ObsPrefixBoundary, SubStepCountBoundary};
pub use discrete::{DiscreteActionConfig, DiscreteActionWrapper};
pub use error::EnvError;
pub use monitor::{Monitor, MonitorConfig};
pub use normalizer::{ObsNormalizer, ObsNormalizerConfig, TOTAL_POWER_INDEX};
pub use obs::EnergyPlusObs;
pub use repeat_action::{RepeatAction, RepeatActionConfig};
pub use scripted::{ScriptedSim, ScriptedSimConfig};
pub use segmenter::{EpisodeSegmenter, EpisodeSegmenterConfig};
pub use space::{BoxSpace, DiscreteSpace, Space};
pub use stack::{
    continuous_stack_config, discrete_stack_config, load_config, save_config, ContinuousStack,
    ContinuousStackConfig, DiscreteStack, DiscreteStackConfig,
};
