use anyhow::Result;
use border_core::{record::BufferedRecorder, util, Env as _, Policy};
use border_energyplus_env::{
    discrete_stack_config, save_config, DiscreteStack, EnergyPlusDiscreteAct, EnergyPlusObs,
    ModelBasedEnv as _, ScriptedSim, ScriptedSimConfig, Space,
};
use clap::Parser;

type Env = DiscreteStack<ScriptedSim>;

struct RandomPolicy {
    n_acts: i64,
}

impl Policy<Env> for RandomPolicy {
    fn sample(&mut self, _: &EnergyPlusObs) -> EnergyPlusDiscreteAct {
        EnergyPlusDiscreteAct::new(fastrand::i64(..self.n_acts))
    }
}

/// Run a random policy on the data center simulator with quantized actions
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The number of episodes
    #[arg(short, long, default_value_t = 5)]
    episodes: usize,

    /// The maximum number of control steps in an episode
    #[arg(short, long, default_value_t = 96)]
    max_steps: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: i64,

    /// Save the configuration in this YAML file
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    fastrand::seed(args.seed as u64);

    let mut config = discrete_stack_config(ScriptedSimConfig::default());
    config.inner.inner.inner.max_steps = args.max_steps;
    if let Some(path) = &args.config {
        save_config(&config, path)?;
    }

    let mut env = Env::build(&config, args.seed)?;
    let n_acts = match env.action_space() {
        Space::Discrete(space) => space.n,
        Space::Box(_) => anyhow::bail!("discrete action space expected"),
    };
    let mut policy = RandomPolicy { n_acts };
    let mut recorder = BufferedRecorder::new();

    let returns = util::rollout(&mut env, &mut policy, args.episodes, &mut recorder)?;
    for (i, r) in returns.iter().enumerate() {
        println!("episode {}: return = {}", i, r);
    }
    println!("{} steps recorded", recorder.len());

    Ok(())
}
