mod common;
use anyhow::Result;
use border_core::Env;
use border_energyplus_env::{
    DiscreteActionConfig, DiscreteActionWrapper, DiscreteSpace, EnergyPlusContinuousAct,
    EnergyPlusDiscreteAct, EnvError, EpisodeSegmenter, EpisodeSegmenterConfig, ModelBasedEnv,
    Space,
};
use common::{env_error, TableSim, TableSimConfig};
use ndarray::{arr2, Array2};
use std::collections::HashSet;

type Quantized = DiscreteActionWrapper<EpisodeSegmenter<TableSim>>;

fn build(num_levels: usize) -> Result<Quantized> {
    let config = DiscreteActionConfig::new(EpisodeSegmenterConfig::new(TableSimConfig::default()))
        .num_levels(num_levels);
    DiscreteActionWrapper::build(&config, 0)
}

#[test]
fn test_actions_are_distinct() -> Result<()> {
    let env = build(4)?;
    assert_eq!(env.action_space(), Space::Discrete(DiscreteSpace { n: 256 }));

    let mut seen = HashSet::new();
    for i in 0..256 {
        let act = env.action(i)?;
        assert_eq!(act.act.len(), 4);
        assert!(act.act.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(seen.insert(act.act.iter().map(|v| v.to_bits()).collect::<Vec<_>>()));
        assert_eq!(env.reverse_action(&act)?, i);
    }
    Ok(())
}

#[test]
fn test_digit_order() -> Result<()> {
    let env = build(4)?;
    let table = env.action_table().to_vec();
    assert_eq!(table.len(), 4);
    assert_eq!((table[0], table[3]), (-1.0, 1.0));

    // 1 + 2 * 4 + 3 * 64
    assert_eq!(env.levels(201)?, vec![1, 2, 0, 3]);
    assert_eq!(
        env.action(201)?.act.to_vec(),
        vec![table[1], table[2], table[0], table[3]]
    );
    Ok(())
}

#[test]
fn test_out_of_range() -> Result<()> {
    let env = build(4)?;
    for i in &[-1, 256, i64::MAX] {
        assert!(matches!(
            env.action(*i),
            Err(EnvError::ActionOutOfBounds(_, _))
        ));
    }
    Ok(())
}

#[test]
fn test_reverse_action_snaps_to_nearest() -> Result<()> {
    let env = build(4)?;
    let act = EnergyPlusContinuousAct::new(vec![0.3, -0.9, 0.0, 1.2]);
    // Levels 2, 0, 1, 3
    assert_eq!(env.reverse_action(&act)?, 2 + 16 + 3 * 64);

    // Exactly between -1 and 1
    let env = build(2)?;
    let act = EnergyPlusContinuousAct::new(vec![0.0; 4]);
    assert_eq!(env.reverse_action(&act)?, 0);

    let short = EnergyPlusContinuousAct::new(vec![0.0; 3]);
    assert_eq!(
        env.reverse_action(&short),
        Err(EnvError::ActShape {
            expected: 4,
            actual: 3
        })
    );
    let nan = EnergyPlusContinuousAct::new(vec![f32::NAN; 4]);
    assert!(env.reverse_action(&nan).is_err());
    Ok(())
}

#[test]
fn test_step_decodes_index() -> Result<()> {
    let mut env = build(4)?;
    env.reset()?;

    let (step, record) = env.step(&EnergyPlusDiscreteAct::new(255))?;
    assert_eq!(step.act, EnergyPlusDiscreteAct::new(255));
    assert_eq!(record.get_scalar("act_index")?, 255.0);
    // Highest level in every dimension, the upper bound of the native range
    assert_eq!(env.inner().inner().actions[0], vec![10.0; 4]);

    env.step(&EnergyPlusDiscreteAct::new(0))?;
    assert_eq!(env.inner().inner().actions[1], vec![0.0; 4]);

    assert_eq!(
        env_error(env.step(&EnergyPlusDiscreteAct::new(256))),
        Some(EnvError::ActionOutOfBounds(
            "256".to_string(),
            "Discrete(256)".to_string()
        ))
    );
    assert_eq!(env.inner().inner().n_steps, 2);
    Ok(())
}

#[test]
fn test_cost_decodes_indices() -> Result<()> {
    let env = build(4)?;
    let states = Array2::<f32>::zeros((2, 6));
    let next_states = arr2(&[[0.0, 0.0, 0.0, 3.0, 1.0, 2.0], [0.0, 0.0, 0.0, 6.0, 2.0, 4.0]]);
    let indices = arr2(&[[255.0f32], [0.0]]);

    let cost = env.cost(states.view(), indices.view(), next_states.view())?;
    assert_eq!(cost.to_vec(), vec![3.0 + 40.0, 6.0]);

    let fractional = arr2(&[[0.5f32], [0.0]]);
    assert!(env
        .cost(states.view(), fractional.view(), next_states.view())
        .is_err());
    let continuous = Array2::<f32>::zeros((2, 4));
    assert!(env
        .cost(states.view(), continuous.view(), next_states.view())
        .is_err());
    Ok(())
}

#[test]
fn test_invalid_num_levels() {
    assert!(build(0).is_err());
}
