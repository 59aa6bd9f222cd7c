extern crate hyrec;
extern crate ndarray;

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use ndarray::{arr1, arr2};

use hyrec::artifacts::Artifacts;
use hyrec::config::Config;
use hyrec::models::latent_factor::LatentFactorModel;
use hyrec::{Prediction, RatingPredictor};

const RATINGS: &str = "user_id,product_id,rating\n\
                       alice,a,5\n\
                       alice,b,3\n\
                       bob,c,4\n\
                       bob,e,2\n\
                       carol,a,1\n";

const SIMILARITY: &str = r#"{
    "products": ["a", "b", "c"],
    "matrix": {
        "v": 1,
        "dim": [3, 3],
        "data": [
            1.0, 0.1, 0.8,
            0.1, 1.0, 0.7,
            0.8, 0.7, 1.0
        ]
    }
}"#;

fn write_artifacts(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(name);
    fs::create_dir_all(&dir).unwrap();

    File::create(dir.join("dataset.csv"))
        .unwrap()
        .write_all(RATINGS.as_bytes())
        .unwrap();
    File::create(dir.join("content.json"))
        .unwrap()
        .write_all(SIMILARITY.as_bytes())
        .unwrap();

    // Product "d" is rated nowhere and unknown to both models.
    let collaborative = LatentFactorModel::new(
        3.0,
        (1.0, 5.0),
        vec!["alice".to_owned(), "bob".to_owned()],
        vec!["c".to_owned(), "e".to_owned()],
        arr1(&[0.0, 0.0]),
        arr1(&[-1.0, 0.0]),
        arr2(&[[0.0], [0.0]]),
        arr2(&[[0.0], [0.0]]),
    ).unwrap();
    collaborative
        .to_path(dir.join("collaborative.json"))
        .unwrap();

    dir
}

fn config_for(dir: PathBuf) -> Config {
    Config {
        data_dir: dir,
        ..Config::default()
    }
}

#[test]
fn recommends_from_loaded_artifacts() {
    let config = config_for(write_artifacts("hyrec_recommends_from_loaded_artifacts"));
    let artifacts = Artifacts::load(&config).unwrap();
    let model = artifacts.model(&config).unwrap();

    assert_eq!(artifacts.ratings.user_ids(), vec!["alice", "bob", "carol"]);

    // Content: mean of alice's ratings of a and b is 4; collaborative: 3 - 1 = 2.
    assert_eq!(model.predict("alice", "c"), Prediction::Score(3.0));
    // "e" is not in the similarity index, so only the collaborative estimate counts.
    assert_eq!(model.predict("alice", "e"), Prediction::Score(3.0));

    let recommendations = model.recommend("alice", artifacts.ratings.product_ids());
    let ids: Vec<&str> = recommendations
        .iter()
        .map(|x| x.product_id.as_str())
        .collect();

    // Equal scores keep the order products first appear in the ratings.
    assert_eq!(ids, vec!["c", "e"]);
}

#[test]
fn blend_weight_moves_between_estimates() {
    let dir = write_artifacts("hyrec_blend_weight_moves_between_estimates");

    let content_only = Config {
        alpha: 1.0,
        ..config_for(dir.clone())
    };
    let collaborative_only = Config {
        alpha: 0.0,
        ..config_for(dir)
    };

    let artifacts = Artifacts::load(&content_only).unwrap();

    assert_eq!(
        artifacts.model(&content_only).unwrap().predict("alice", "c"),
        Prediction::Score(4.0)
    );
    assert_eq!(
        artifacts
            .model(&collaborative_only)
            .unwrap()
            .predict("alice", "c"),
        Prediction::Score(2.0)
    );
}

#[test]
fn unknown_products_are_never_recommended() {
    let config = config_for(write_artifacts("hyrec_unknown_products_are_never_recommended"));
    let artifacts = Artifacts::load(&config).unwrap();
    let model = artifacts.model(&config).unwrap();

    let mut products = artifacts.ratings.product_ids().to_vec();
    products.push("d".to_owned());

    assert!(model.predict("carol", "d").is_insufficient());
    assert!(
        model
            .recommend("carol", &products)
            .iter()
            .all(|x| x.product_id != "d" && x.product_id != "a")
    );
}

#[test]
fn invalid_blend_weight_is_rejected() {
    let config = Config {
        alpha: 1.5,
        ..config_for(write_artifacts("hyrec_invalid_blend_weight_is_rejected"))
    };
    let artifacts = Artifacts::load(&config).unwrap();

    assert!(artifacts.model(&config).is_err());
}

#[test]
fn oversized_recommendation_list_is_rejected() {
    let config = Config {
        num_recommendations: 25,
        ..config_for(write_artifacts("hyrec_oversized_recommendation_list_is_rejected"))
    };
    let artifacts = Artifacts::load(&config).unwrap();

    assert!(artifacts.model(&config).is_err());
}

#[test]
fn missing_artifacts_fail_to_load() {
    let config = config_for(env::temp_dir().join("hyrec_missing_artifacts_fail_to_load"));

    assert!(Artifacts::load(&config).is_err());
}
