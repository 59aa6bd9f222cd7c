//! Pre-trained biased matrix factorization model.
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use failure;
use ndarray::{Array1, Array2};
use serde_json;

use super::super::{ArtifactError, CollaborativeModel, ProductId, UserId};

#[derive(Serialize, Deserialize)]
struct StoredModel {
    global_mean: f32,
    rating_scale: (f32, f32),
    user_ids: Vec<UserId>,
    product_ids: Vec<ProductId>,
    user_biases: Array1<f32>,
    product_biases: Array1<f32>,
    user_factors: Array2<f32>,
    product_factors: Array2<f32>,
}

/// A latent-factor collaborative model trained elsewhere.
///
/// The estimate for a known user and product is
/// `global_mean + user_bias + product_bias + user_factors · product_factors`,
/// clipped to the rating scale. Unknown users fall back to
/// `global_mean + product_bias`; unknown products have no estimate.
#[derive(Clone, Debug)]
pub struct LatentFactorModel {
    global_mean: f32,
    rating_scale: (f32, f32),
    user_ids: Vec<UserId>,
    product_ids: Vec<ProductId>,
    user_index: HashMap<UserId, usize>,
    product_index: HashMap<ProductId, usize>,
    user_biases: Array1<f32>,
    product_biases: Array1<f32>,
    user_factors: Array2<f32>,
    product_factors: Array2<f32>,
}

fn build_index<F>(ids: &[String], duplicate: F) -> Result<HashMap<String, usize>, ArtifactError>
where
    F: Fn(String) -> ArtifactError,
{
    let mut index = HashMap::with_capacity(ids.len());

    for (row, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), row).is_some() {
            return Err(duplicate(id.clone()));
        }
    }

    Ok(index)
}

impl LatentFactorModel {
    /// Assemble a model from its parameters. Row `i` of the user
    /// biases and factors belongs to `user_ids[i]`; likewise for products.
    pub fn new(
        global_mean: f32,
        rating_scale: (f32, f32),
        user_ids: Vec<UserId>,
        product_ids: Vec<ProductId>,
        user_biases: Array1<f32>,
        product_biases: Array1<f32>,
        user_factors: Array2<f32>,
        product_factors: Array2<f32>,
    ) -> Result<Self, ArtifactError> {
        if user_biases.len() != user_ids.len() || user_factors.nrows() != user_ids.len() {
            return Err(ArtifactError::FactorShape(format!(
                "{} users but {} biases and {} factor rows",
                user_ids.len(),
                user_biases.len(),
                user_factors.nrows()
            )));
        }

        if product_biases.len() != product_ids.len()
            || product_factors.nrows() != product_ids.len()
        {
            return Err(ArtifactError::FactorShape(format!(
                "{} products but {} biases and {} factor rows",
                product_ids.len(),
                product_biases.len(),
                product_factors.nrows()
            )));
        }

        if user_factors.ncols() != product_factors.ncols() {
            return Err(ArtifactError::FactorShape(format!(
                "user factors have {} columns, product factors {}",
                user_factors.ncols(),
                product_factors.ncols()
            )));
        }

        let user_index = build_index(&user_ids, ArtifactError::DuplicateUser)?;
        let product_index = build_index(&product_ids, ArtifactError::DuplicateProduct)?;

        Ok(LatentFactorModel {
            global_mean,
            rating_scale,
            user_ids,
            product_ids,
            user_index,
            product_index,
            user_biases,
            product_biases,
            user_factors,
            product_factors,
        })
    }

    /// Load a model serialized as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, failure::Error> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let stored: StoredModel = serde_json::from_reader(reader)?;
        let model = LatentFactorModel::new(
            stored.global_mean,
            stored.rating_scale,
            stored.user_ids,
            stored.product_ids,
            stored.user_biases,
            stored.product_biases,
            stored.user_factors,
            stored.product_factors,
        )?;

        debug!(
            path = %path.as_ref().display(),
            users = model.num_users(),
            products = model.num_products(),
            latent_dim = model.latent_dim(),
            "Read latent factor model."
        );

        Ok(model)
    }

    /// Serialize the model as JSON, in the layout `from_path` reads.
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), failure::Error> {
        let stored = StoredModel {
            global_mean: self.global_mean,
            rating_scale: self.rating_scale,
            user_ids: self.user_ids.clone(),
            product_ids: self.product_ids.clone(),
            user_biases: self.user_biases.clone(),
            product_biases: self.product_biases.clone(),
            user_factors: self.user_factors.clone(),
            product_factors: self.product_factors.clone(),
        };

        serde_json::to_writer(File::create(path)?, &stored)?;

        Ok(())
    }

    /// Number of users seen during training.
    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    /// Number of products seen during training.
    pub fn num_products(&self) -> usize {
        self.product_ids.len()
    }

    /// Dimensionality of the latent factors.
    pub fn latent_dim(&self) -> usize {
        self.user_factors.ncols()
    }

    fn clip(&self, value: f32) -> f32 {
        let (min, max) = self.rating_scale;
        value.max(min).min(max)
    }
}

impl CollaborativeModel for LatentFactorModel {
    fn estimate(&self, user_id: &str, product_id: &str) -> Option<f32> {
        let &product = self.product_index.get(product_id)?;

        let mut estimate = self.global_mean + self.product_biases[product];

        if let Some(&user) = self.user_index.get(user_id) {
            estimate += self.user_biases[user]
                + self.user_factors
                    .row(user)
                    .dot(&self.product_factors.row(product));
        }

        if estimate.is_finite() {
            Some(self.clip(estimate))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use ndarray::{arr1, arr2};

    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|x| x.to_string()).collect()
    }

    fn model() -> LatentFactorModel {
        LatentFactorModel::new(
            3.0,
            (1.0, 5.0),
            ids(&["u1", "u2"]),
            ids(&["p1", "p2"]),
            arr1(&[0.5, -0.25]),
            arr1(&[0.25, -1.0]),
            arr2(&[[1.0, 0.0], [0.5, 0.5]]),
            arr2(&[[0.5, 1.0], [4.0, 0.0]]),
        ).unwrap()
    }

    #[test]
    fn known_user_and_product() {
        // 3.0 + 0.5 + 0.25 + (1.0 * 0.5 + 0.0 * 1.0)
        assert_eq!(model().estimate("u1", "p1"), Some(4.25));
        // 3.0 - 0.25 + 0.25 + (0.5 * 0.5 + 0.5 * 1.0)
        assert_eq!(model().estimate("u2", "p1"), Some(3.75));
    }

    #[test]
    fn estimates_are_clipped_to_the_rating_scale() {
        // 3.0 + 0.5 - 1.0 + 4.0 is above the scale.
        assert_eq!(model().estimate("u1", "p2"), Some(5.0));
    }

    #[test]
    fn unknown_user_falls_back_to_product_baseline() {
        assert_eq!(model().estimate("stranger", "p1"), Some(3.25));
    }

    #[test]
    fn unknown_product_has_no_estimate() {
        assert_eq!(model().estimate("u1", "unseen"), None);
        assert_eq!(model().estimate("stranger", "unseen"), None);
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let result = LatentFactorModel::new(
            3.0,
            (1.0, 5.0),
            ids(&["u1"]),
            ids(&["p1"]),
            arr1(&[0.0]),
            arr1(&[0.0]),
            arr2(&[[1.0, 0.0]]),
            arr2(&[[1.0, 0.0, 0.0]]),
        );
        assert!(match result {
            Err(ArtifactError::FactorShape(_)) => true,
            _ => false,
        });

        let result = LatentFactorModel::new(
            3.0,
            (1.0, 5.0),
            ids(&["u1", "u1"]),
            ids(&["p1"]),
            arr1(&[0.0, 0.0]),
            arr1(&[0.0]),
            arr2(&[[1.0], [1.0]]),
            arr2(&[[1.0]]),
        );
        assert!(match result {
            Err(ArtifactError::DuplicateUser(ref id)) => id == "u1",
            _ => false,
        });
    }

    #[test]
    fn json_round_trip_preserves_estimates() {
        let path = env::temp_dir().join("hyrec_latent_factor_model.json");
        let model = model();

        model.to_path(&path).unwrap();
        let loaded = LatentFactorModel::from_path(&path).unwrap();

        for user in &["u1", "u2", "stranger"] {
            for product in &["p1", "p2", "unseen"] {
                assert_eq!(
                    loaded.estimate(user, product),
                    model.estimate(user, product)
                );
            }
        }
    }
}
