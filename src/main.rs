use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};

use auto_edge::config::ApiConfig;
use auto_edge::pipeline::{Alliance, compute_win_probability};
use auto_edge::prob_model::ModelConfig;

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("not enough rating data to estimate this match");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 6 || args.len() > 7 {
        bail!("usage: auto_edge RED1 RED2 RED3 BLUE1 BLUE2 BLUE3 [EVENT_KEY]");
    }
    let mut teams = [0u32; 6];
    for (slot, raw) in teams.iter_mut().zip(&args) {
        *slot = raw
            .parse()
            .with_context(|| format!("invalid team number: {raw}"))?;
    }
    let event_key = args.get(6).map(String::as_str);

    let cfg = ApiConfig::from_env()?;
    let model = ModelConfig::default();
    let red = Alliance::red([teams[0], teams[1], teams[2]]);
    let blue = Alliance::blue([teams[3], teams[4], teams[5]]);

    let mut log = |line: &str| println!("{line}");
    let Some(result) = compute_win_probability(&cfg, &model, red, blue, event_key, &mut log)
    else {
        return Ok(false);
    };

    println!();
    println!(
        "Red  {:>6.2} auto EPA  ->  {:>5.1}% win",
        result.red_total,
        result.p_red * 100.0
    );
    println!(
        "Blue {:>6.2} auto EPA  ->  {:>5.1}% win",
        result.blue_total,
        result.p_blue * 100.0
    );
    Ok(true)
}
