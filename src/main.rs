use orbsim::{bench_pairwise_gravity, bench_update, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario YAML file
    #[arg(short, default_value = "scenario.yaml")]
    file_name: String,

    /// Run the built-in micro-benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(path: &str) -> Result<ScenarioConfig> {
    let file = File::open(path).with_context(|| format!("opening scenario file {path}"))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).context("parsing scenario YAML")?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_pairwise_gravity();
        bench_update();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build(scenario_cfg)?;

    let dt = scenario.parameters.dt;
    let t_end = scenario.parameters.t_end;
    info!(
        "starting headless run: {} bodies, dt = {dt}, t_end = {t_end}",
        scenario.system.dynamics.len()
    );

    let mut steps: u64 = 0;
    while scenario.system.t < t_end {
        scenario.update(dt);
        steps += 1;
        if steps % 200 == 0 {
            info!("t = {:.3} ({steps} steps)", scenario.system.t);
        }
    }

    // Final state, one line per body, for piping into external tools
    for (id, body) in scenario.system.dynamics.iter() {
        let p = body.position();
        let v = body.velocity;
        println!(
            "body {:>4}  x = ({:+.6}, {:+.6})  v = ({:+.6}, {:+.6})",
            id.index(),
            p.x,
            p.y,
            v.x,
            v.y
        );
    }

    Ok(())
}
