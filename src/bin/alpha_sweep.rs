extern crate failure;
extern crate hyrec;
extern crate rand;
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;
extern crate tracing;
extern crate tracing_subscriber;

use std::env;
use std::fs::File;
use std::process;
use std::time::{Duration, Instant};

use rand::{SeedableRng, XorShiftRng};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hyrec::artifacts::Artifacts;
use hyrec::config::Config;
use hyrec::evaluation::{coverage_score, rmse_score};
use hyrec::hybrid::Hyperparameters;

const RESULTS_PATH: &str = "alpha_sweep_results.json";

#[derive(Debug, Serialize, Deserialize)]
struct SweepResult {
    test_rmse: f32,
    test_coverage: f32,
    elapsed: Duration,
    hyperparameters: Hyperparameters,
}

fn run() -> Result<(), failure::Error> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "hyrec.json".to_owned());
    let config = Config::from_path_or_default(&config_path)?;
    let mut artifacts = Artifacts::load(&config)?;

    let mut rng = XorShiftRng::from_seed([config.seed; 16]);
    let (train, test) = config.split(&mut artifacts.ratings, &mut rng);

    info!(
        train = train.len(),
        test = test.len(),
        user_holdout = config.user_holdout,
        "Split ratings."
    );

    let mut results = Vec::new();

    for step in 0..11 {
        let alpha = step as f32 / 10.0;
        let sweep_config = Config {
            alpha,
            ..config.clone()
        };
        let model = artifacts.model_over(&train, &sweep_config)?;

        let start = Instant::now();
        let test_rmse = rmse_score(&model, &test)?;
        let test_coverage = coverage_score(&model, &test)?;

        let result = SweepResult {
            test_rmse,
            test_coverage,
            elapsed: start.elapsed(),
            hyperparameters: model.hyperparameters().clone(),
        };

        info!(alpha, test_rmse, test_coverage, "Evaluated blend weight.");

        if result.test_rmse.is_finite() {
            results.push(result);
        } else {
            warn!(alpha, "Discarding non-finite result.");
        }
    }

    results.sort_by(|a, b| {
        a.test_rmse
            .partial_cmp(&b.test_rmse)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("Best result: {:#?}", results.first());

    serde_json::to_writer_pretty(File::create(RESULTS_PATH)?, &results)?;

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        error!(error = %err, "Sweep failed.");
        process::exit(1);
    }
}
