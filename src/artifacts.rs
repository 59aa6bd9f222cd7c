//! Loading the pre-built ratings table and models.
use failure;

use config::Config;
use data::Ratings;
use hybrid::HybridModel;
use models::content::ContentSimilarity;
use models::latent_factor::LatentFactorModel;
use ParameterError;

/// Everything a recommendation run reads from disk, loaded once.
#[derive(Clone, Debug)]
pub struct Artifacts {
    /// The ratings table.
    pub ratings: Ratings,
    /// The collaborative model.
    pub collaborative: LatentFactorModel,
    /// The content similarity index.
    pub similarity: ContentSimilarity,
}

impl Artifacts {
    /// Load the artifacts named by `config`.
    pub fn load(config: &Config) -> Result<Self, failure::Error> {
        let ratings = Ratings::from_path(config.ratings_path())?;
        let collaborative = LatentFactorModel::from_path(config.collaborative_path())?;
        let similarity = ContentSimilarity::from_path(config.similarity_path())?;

        info!(
            ratings = ratings.len(),
            users = ratings.num_users(),
            products = ratings.num_products(),
            indexed_products = similarity.len(),
            latent_dim = collaborative.latent_dim(),
            "Loaded artifacts."
        );

        Ok(Artifacts {
            ratings,
            collaborative,
            similarity,
        })
    }

    /// A hybrid model over the loaded artifacts, configured by `config`.
    pub fn model(
        &self,
        config: &Config,
    ) -> Result<HybridModel<LatentFactorModel, ContentSimilarity>, ParameterError> {
        self.model_over(&self.ratings, config)
    }

    /// A hybrid model whose content estimates draw on `ratings` instead of
    /// the loaded table, for evaluating on held-out data.
    pub fn model_over<'a>(
        &'a self,
        ratings: &'a Ratings,
        config: &Config,
    ) -> Result<HybridModel<'a, LatentFactorModel, ContentSimilarity>, ParameterError> {
        config
            .hyperparameters()
            .build(ratings, &self.collaborative, &self.similarity)
    }
}
