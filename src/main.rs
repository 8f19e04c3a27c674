use anyhow::Result;
use server_cooling_env::config::{RunConfig, SimulatorConfig};
use server_cooling_env::simulation::{run_episode, Action, Environment, Month};
use server_cooling_env::telemetry::init_tracing;
use tracing::{info, warn};

/// Proportional thermostat with a dead band around the target
fn thermostat(run: &RunConfig, temperature_c: f64, month: Month) -> Action {
    let upper = run.target_temperature_c + run.hysteresis_c;
    let lower = run.target_temperature_c - run.hysteresis_c;

    if temperature_c > upper {
        Action::cool(((temperature_c - upper) * run.gain).min(run.max_energy), month)
    } else if temperature_c < lower {
        Action::heat(((lower - temperature_c) * run.gain).min(run.max_energy), month)
    } else if temperature_c > run.target_temperature_c {
        Action::cool(run.idle_energy, month)
    } else {
        Action::heat(run.idle_energy, month)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = SimulatorConfig::load()?;
    let run = cfg.run.clone();
    let mut env = Environment::new(cfg.environment)?;

    info!(seed = env.seed(), episodes = run.episodes, "starting server cooling simulation");

    let mut start = env.month();
    for episode in 0..run.episodes {
        env.reset(start.index() as i64)?;

        let summary = run_episode(&mut env, run.max_steps, |env, step| {
            let month = start.advance(step * run.months_per_step as u64);
            thermostat(&run, env.temperature_ai(), month)
        })?;

        if summary.terminated {
            warn!(episode, start_month = %start, "thermostat lost thermal control");
        }
        let summary_json = serde_json::to_string(&summary)?;
        info!(
            episode,
            start_month = %start,
            summary = %summary_json,
            "episode summary"
        );

        start = start.advance(3);
    }

    Ok(())
}
