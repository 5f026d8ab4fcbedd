//! Utilities for interaction of agents and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Runs episodes with a policy and writes the record of every step to `recorder`.
///
/// Besides the entries added by the environment, each record holds `reward`,
/// `episode` and `step`. Returns the sum of rewards of each episode.
///
/// An episode ends when the environment returns a done step, whether it was
/// terminated or truncated.
pub fn rollout<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset()?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_obs);
            let (step, mut record) = env.step(&act)?;
            r_total += step.reward;

            record.insert("reward", RecordValue::Scalar(step.reward));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            count_step += 1;
            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
        }

        info!(
            "Episode {}, {} steps, reward = {}",
            episode, count_step, r_total
        );
        rs.push(r_total);
    }

    Ok(rs)
}
