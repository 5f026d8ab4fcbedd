//! The usual stacks of wrappers and their configurations.
use crate::{
    DiscreteActionConfig, DiscreteActionWrapper, EpisodeSegmenter, EpisodeSegmenterConfig,
    Monitor, MonitorConfig, ObsNormalizer, ObsNormalizerConfig, RepeatAction, RepeatActionConfig,
};
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Wrappers with a continuous action space in `[-1, 1]` over a simulator `S`.
pub type ContinuousStack<S> = ObsNormalizer<Monitor<EpisodeSegmenter<RepeatAction<S>>>>;

/// [`ContinuousStack`] with quantized actions.
pub type DiscreteStack<S> = DiscreteActionWrapper<ContinuousStack<S>>;

/// Configuration of [`ContinuousStack`].
pub type ContinuousStackConfig<C> =
    ObsNormalizerConfig<MonitorConfig<EpisodeSegmenterConfig<RepeatActionConfig<C>>>>;

/// Configuration of [`DiscreteStack`].
pub type DiscreteStackConfig<C> = DiscreteActionConfig<ContinuousStackConfig<C>>;

/// Returns the configuration of [`ContinuousStack`] with default parameters
/// over a simulator configured with `sim`.
pub fn continuous_stack_config<C>(sim: C) -> ContinuousStackConfig<C> {
    ObsNormalizerConfig::new(MonitorConfig::new(EpisodeSegmenterConfig::new(
        RepeatActionConfig::new(sim),
    )))
}

/// Returns the configuration of [`DiscreteStack`] with default parameters
/// over a simulator configured with `sim`.
pub fn discrete_stack_config<C>(sim: C) -> DiscreteStackConfig<C> {
    DiscreteActionConfig::new(continuous_stack_config(sim))
}

/// Loads a configuration from a YAML file.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    info!("Load config from {:?}", path);
    let file = File::open(path)?;
    let rdr = BufReader::new(file);
    let config = serde_yaml::from_reader(rdr)?;
    Ok(config)
}

/// Saves a configuration as a YAML file.
pub fn save_config<T: Serialize>(config: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    file.write_all(serde_yaml::to_string(config)?.as_bytes())?;
    info!("Saved config in {:?}", path);
    Ok(())
}
