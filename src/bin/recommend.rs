extern crate failure;
extern crate hyrec;
extern crate tracing;
extern crate tracing_subscriber;

use std::env;
use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use hyrec::artifacts::Artifacts;
use hyrec::config::Config;
use hyrec::RatingPredictor;

fn run() -> Result<(), failure::Error> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "hyrec.json".to_owned());
    let config = Config::from_path_or_default(&config_path)?;
    let artifacts = Artifacts::load(&config)?;
    let model = artifacts.model(&config)?;

    let user_id = match config.user_id {
        Some(ref user_id) => user_id.clone(),
        None => match artifacts.ratings.user_ids().first() {
            Some(user_id) => user_id.to_string(),
            None => {
                println!("The ratings table is empty.");
                return Ok(());
            }
        },
    };

    println!("User {} (alpha = {})", user_id, config.alpha);

    if let Some(ref product_id) = config.product_id {
        println!(
            "Predicted rating for {}: {}",
            product_id,
            model.predict(&user_id, product_id)
        );
    }

    let recommendations = model.recommend(&user_id, artifacts.ratings.product_ids());

    if recommendations.is_empty() {
        println!("Not enough data to generate recommendations.");
    } else {
        println!("Top {} Recommended Products", recommendations.len());
        for (rank, recommendation) in recommendations.iter().enumerate() {
            println!(
                "{}. {} - Predicted Rating: {:.2}",
                rank + 1,
                recommendation.product_id,
                recommendation.score
            );
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        error!(error = %err, "Recommendation failed.");
        process::exit(1);
    }
}
