//! Traits shared by simulators and wrappers.
use crate::{BoxSpace, Space};
use anyhow::Result;
use border_core::{Env, Info};
use ndarray::{Array1, ArrayView2};

/// Information given at every step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnergyPlusInfo {
    /// Whether the underlying simulation has really ended.
    ///
    /// Set by [`EpisodeSegmenter`](crate::EpisodeSegmenter). A step where an episode
    /// ends with `Some(false)` is the end of a training segment, not an absorbing state.
    /// `None` below the segmenter.
    pub true_done: Option<bool>,
}

impl Info for EnergyPlusInfo {}

/// An environment providing its spaces and a cost function over batches of transitions.
///
/// The cost function lets model-based agents evaluate predicted transitions without
/// interacting with the simulator. Wrappers convert the arguments from their own
/// representation into the one of the inner environment before forwarding the call.
pub trait ModelBasedEnv: Env {
    /// Space of actions accepted by [`Env::step`].
    fn action_space(&self) -> Space;

    /// Space of observations returned by [`Env::step`] and [`Env::reset`].
    fn observation_space(&self) -> BoxSpace;

    /// Returns the cost of each transition `(states[i], actions[i], next_states[i])`.
    ///
    /// Rows of the arguments are samples of a batch.
    fn cost(
        &self,
        states: ArrayView2<f32>,
        actions: ArrayView2<f32>,
        next_states: ArrayView2<f32>,
    ) -> Result<Array1<f32>>;
}
