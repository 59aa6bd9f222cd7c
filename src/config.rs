//! Run configuration read from JSON.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use failure;
use rand::Rng;
use serde_json;

use super::{ProductId, UserId};
use data::{train_test_split, user_based_split, Ratings};
use hybrid::Hyperparameters;

/// Where the artifacts live, and what to recommend for whom.
///
/// Every key is optional in the file; missing keys take their defaults.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the artifacts.
    pub data_dir: PathBuf,
    /// Ratings CSV, relative to `data_dir`.
    pub ratings_file: PathBuf,
    /// Serialized collaborative model, relative to `data_dir`.
    pub collaborative_file: PathBuf,
    /// Serialized similarity index, relative to `data_dir`.
    pub similarity_file: PathBuf,
    /// User to recommend for. Defaults to the first user in sorted order.
    pub user_id: Option<UserId>,
    /// Product whose single prediction is reported alongside the list.
    pub product_id: Option<ProductId>,
    /// Weight of the content-based estimate.
    pub alpha: f32,
    /// Neighbours averaged by the content-based estimate.
    pub num_neighbours: usize,
    /// Maximum length of the recommendation list, at most 10.
    pub num_recommendations: usize,
    /// Fraction of ratings held out when evaluating.
    pub test_fraction: f32,
    /// Hold out whole users rather than individual ratings when evaluating.
    pub user_holdout: bool,
    /// Seed for the evaluation split.
    pub seed: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            ratings_file: PathBuf::from("dataset.csv"),
            collaborative_file: PathBuf::from("collaborative.json"),
            similarity_file: PathBuf::from("content.json"),
            user_id: None,
            product_id: None,
            alpha: 0.5,
            num_neighbours: 10,
            num_recommendations: 10,
            test_fraction: 0.2,
            user_holdout: false,
            seed: 42,
        }
    }
}

impl Config {
    /// Read a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, failure::Error> {
        let reader = BufReader::new(File::open(path)?);

        Ok(serde_json::from_reader(reader)?)
    }

    /// Read `path` if it exists, otherwise use the defaults.
    pub fn from_path_or_default<P: AsRef<Path>>(path: P) -> Result<Self, failure::Error> {
        if path.as_ref().exists() {
            Config::from_path(path)
        } else {
            info!(
                path = %path.as_ref().display(),
                "No configuration file, using defaults."
            );
            Ok(Config::default())
        }
    }

    /// Path of the ratings CSV.
    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join(&self.ratings_file)
    }

    /// Path of the collaborative model.
    pub fn collaborative_path(&self) -> PathBuf {
        self.data_dir.join(&self.collaborative_file)
    }

    /// Path of the similarity index.
    pub fn similarity_path(&self) -> PathBuf {
        self.data_dir.join(&self.similarity_file)
    }

    /// Split `ratings` into `(train, test)` the way this configuration asks.
    pub fn split<R: Rng>(&self, ratings: &mut Ratings, rng: &mut R) -> (Ratings, Ratings) {
        if self.user_holdout {
            user_based_split(ratings, rng, self.test_fraction)
        } else {
            train_test_split(ratings, rng, self.test_fraction)
        }
    }

    /// Model hyperparameters described by this configuration.
    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new()
            .alpha(self.alpha)
            .num_neighbours(self.num_neighbours)
            .num_recommendations(self.num_recommendations)
    }
}
