mod common;
use anyhow::Result;
use border_core::Env;
use border_energyplus_env::{
    BoxSpace, EnergyPlusContinuousAct, EnvError, EpisodeSegmenter, EpisodeSegmenterConfig,
    ModelBasedEnv, Space,
};
use common::{env_error, TableSim, TableSimConfig};
use ndarray::{arr1, arr2};

fn act(v: f32) -> EnergyPlusContinuousAct {
    EnergyPlusContinuousAct::new(vec![v; 4])
}

fn build(terminal_at: Option<usize>, max_steps: usize) -> Result<EpisodeSegmenter<TableSim>> {
    let sim = TableSimConfig {
        terminal_at,
        ..Default::default()
    };
    EpisodeSegmenter::build(&EpisodeSegmenterConfig::new(sim).max_steps(max_steps), 0)
}

#[test]
fn test_segment_length() -> Result<()> {
    let mut env = build(None, 5)?;
    env.reset()?;

    for i in 1..=5 {
        let (step, record) = env.step(&act(0.0))?;
        assert_eq!(step.is_truncated, i == 5);
        assert!(!step.is_terminated);
        assert_eq!(step.info.true_done, Some(false));
        assert_eq!(record.get_scalar("segment_step")?, i as f32);
        assert_eq!(env.current_steps(), i);
    }
    assert_eq!(
        env_error(env.step(&act(0.0))),
        Some(EnvError::SegmentFinished(5))
    );

    // The count is kept until the next segment starts
    assert_eq!(env.current_steps(), 5);
    env.reset()?;
    assert_eq!(env.current_steps(), 0);
    Ok(())
}

#[test]
fn test_truncation_continues_simulation() -> Result<()> {
    let mut env = build(None, 3)?;
    env.reset()?;
    for _ in 0..3 {
        env.step(&act(0.0))?;
    }

    // The next segment starts where the previous one ended
    let obs = env.reset()?;
    assert_eq!(obs, env.inner().obs_at(3));
    assert_eq!(env.inner().n_resets, 1);
    assert!(!env.is_true_done());

    let (step, _) = env.step(&act(0.0))?;
    assert_eq!(step.obs, env.inner().obs_at(4));
    assert_eq!(step.reward, 4.0);
    Ok(())
}

#[test]
fn test_true_done() -> Result<()> {
    let mut env = build(Some(7), 5)?;
    env.reset()?;
    for _ in 0..5 {
        env.step(&act(0.0))?;
    }
    env.reset()?;

    let (step, _) = env.step(&act(0.0))?;
    assert!(!step.is_done());
    let (step, record) = env.step(&act(0.0))?;
    assert!(step.is_terminated);
    assert!(!step.is_truncated);
    assert_eq!(step.info.true_done, Some(true));
    assert_eq!(record.get_scalar("segment_step")?, 2.0);
    assert_eq!(env.current_steps(), 2);
    assert!(env.is_true_done());

    // Segment is over, and so is the simulation
    assert_eq!(
        env_error(env.step(&act(0.0))),
        Some(EnvError::SegmentFinished(5))
    );

    let obs = env.reset()?;
    assert_eq!(obs, env.inner().obs_at(0));
    assert_eq!(env.inner().n_resets, 2);
    assert!(!env.is_true_done());
    Ok(())
}

#[test]
fn test_true_done_at_segment_end() -> Result<()> {
    // Both conditions hold at the same step; the simulation end wins.
    let mut env = build(Some(4), 4)?;
    env.reset()?;
    for _ in 0..3 {
        env.step(&act(0.0))?;
    }
    let (step, _) = env.step(&act(0.0))?;
    assert!(step.is_terminated);
    assert_eq!(step.info.true_done, Some(true));

    env.reset()?;
    assert_eq!(env.inner().n_resets, 2);
    Ok(())
}

#[test]
fn test_step_before_reset() -> Result<()> {
    let mut env = build(None, 5)?;
    assert_eq!(env_error(env.step(&act(0.0))), Some(EnvError::NotReset));
    assert_eq!(env.inner().n_steps, 0);
    Ok(())
}

#[test]
fn test_action_out_of_bounds() -> Result<()> {
    let mut env = build(None, 5)?;
    env.reset()?;

    for a in &[
        act(1.0 + 1e-3),
        act(-1.0 - 1e-3),
        act(f32::NAN),
        EnergyPlusContinuousAct::new(vec![0.0; 3]),
    ] {
        let err = env_error(env.step(a));
        assert!(
            matches!(err, Some(EnvError::ActionOutOfBounds(_, _))),
            "{:?}",
            err
        );
    }

    // Nothing reached the simulator, the segment goes on
    assert_eq!(env.inner().n_steps, 0);
    assert_eq!(env.current_steps(), 0);
    env.step(&act(1.0))?;
    env.step(&act(-1.0))?;
    assert_eq!(env.current_steps(), 2);
    Ok(())
}

#[test]
fn test_action_mapping() -> Result<()> {
    let mut env = build(None, 5)?;
    assert_eq!(env.action_space(), Space::Box(BoxSpace::symmetric(4)));
    env.reset()?;

    let a = EnergyPlusContinuousAct::new(vec![-1.0, 0.0, 1.0, 0.5]);
    let (step, record) = env.step(&a)?;
    assert_eq!(env.inner().actions[0], vec![0.0, 5.0, 10.0, 7.5]);
    assert_eq!(record.get_array1("act_native")?, vec![0.0, 5.0, 10.0, 7.5]);
    // The step holds the action given to the wrapper
    assert_eq!(step.act, a);
    Ok(())
}

#[test]
fn test_cost_maps_actions() -> Result<()> {
    let env = build(None, 5)?;
    let states = arr2(&[[0.0f32; 6]; 2]);
    let actions = arr2(&[[-1.0f32, 0.0, 1.0, 0.5], [1.0, 1.0, 1.0, 1.0]]);
    let next_states = arr2(&[[0.0, 0.0, 0.0, 3.0, 1.0, 2.0], [0.0, 0.0, 0.0, 6.0, 2.0, 4.0]]);

    let cost = env.cost(states.view(), actions.view(), next_states.view())?;
    assert_eq!(cost, arr1(&[3.0 + 22.5, 6.0 + 40.0]));

    let wrong = arr2(&[[0.0f32; 3]; 2]);
    assert!(env
        .cost(states.view(), wrong.view(), next_states.view())
        .is_err());
    Ok(())
}

#[test]
fn test_invalid_max_steps() {
    assert!(build(None, 0).is_err());
}
