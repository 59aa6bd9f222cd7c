//! Blending content-based and collaborative estimates.
use super::{CollaborativeModel, ParameterError, Prediction, RatingPredictor, SimilarityIndex};
use data::Ratings;
use models::content::content_estimate;

/// Combine the two estimates with blend weight `alpha`.
///
/// - both present: `alpha * content + (1 - alpha) * collaborative`;
/// - one present: that estimate, whatever `alpha` is;
/// - neither: `Prediction::InsufficientData`.
///
/// A present estimate of zero counts as present.
pub fn blend(content: Option<f32>, collaborative: Option<f32>, alpha: f32) -> Prediction {
    match (content, collaborative) {
        (Some(content), Some(collaborative)) => {
            Prediction::Score(alpha * content + (1.0 - alpha) * collaborative)
        }
        (None, Some(collaborative)) => Prediction::Score(collaborative),
        (Some(content), None) => Prediction::Score(content),
        (None, None) => Prediction::InsufficientData,
    }
}

/// Longest recommendation list a model may produce.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Hyperparameters of the hybrid model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Hyperparameters {
    alpha: f32,
    num_neighbours: usize,
    num_recommendations: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters::new()
    }
}

impl Hyperparameters {
    /// Equal blend, 10 content neighbours, top-10 recommendations.
    pub fn new() -> Self {
        Hyperparameters {
            alpha: 0.5,
            num_neighbours: 10,
            num_recommendations: 10,
        }
    }

    /// Weight of the content-based estimate, in `[0, 1]`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Number of most similar products the content estimate averages over.
    pub fn num_neighbours(mut self, num_neighbours: usize) -> Self {
        self.num_neighbours = num_neighbours;
        self
    }

    /// Maximum length of a recommendation list, at most `MAX_RECOMMENDATIONS`.
    pub fn num_recommendations(mut self, num_recommendations: usize) -> Self {
        self.num_recommendations = num_recommendations;
        self
    }

    /// The configured blend weight.
    pub fn blend_weight(&self) -> f32 {
        self.alpha
    }

    /// The configured recommendation list length.
    pub fn recommendations(&self) -> usize {
        self.num_recommendations
    }

    /// Build a model over loaded ratings and pre-built models.
    pub fn build<'a, C, S>(
        self,
        ratings: &'a Ratings,
        collaborative: &'a C,
        similarity: &'a S,
    ) -> Result<HybridModel<'a, C, S>, ParameterError>
    where
        C: CollaborativeModel + ?Sized + 'a,
        S: SimilarityIndex + ?Sized + 'a,
    {
        if !(self.alpha >= 0.0 && self.alpha <= 1.0) {
            return Err(ParameterError::InvalidBlendWeight(self.alpha));
        }

        if self.num_recommendations > MAX_RECOMMENDATIONS {
            return Err(ParameterError::TooManyRecommendations {
                requested: self.num_recommendations,
                limit: MAX_RECOMMENDATIONS,
            });
        }

        Ok(HybridModel {
            hyper: self,
            ratings,
            collaborative,
            similarity,
        })
    }
}

/// Hybrid rating model over borrowed, immutable artifacts.
pub struct HybridModel<'a, C: ?Sized + 'a, S: ?Sized + 'a> {
    pub(crate) hyper: Hyperparameters,
    pub(crate) ratings: &'a Ratings,
    collaborative: &'a C,
    similarity: &'a S,
}

impl<'a, C, S> HybridModel<'a, C, S>
where
    C: CollaborativeModel + ?Sized + 'a,
    S: SimilarityIndex + ?Sized + 'a,
{
    /// The model's hyperparameters.
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyper
    }

    /// The ratings the content estimate draws on.
    pub fn ratings(&self) -> &'a Ratings {
        self.ratings
    }

    /// Content-based estimate, or `None` if there is no basis for one.
    pub fn content_estimate(&self, user_id: &str, product_id: &str) -> Option<f32> {
        content_estimate(
            self.similarity,
            self.ratings,
            user_id,
            product_id,
            self.hyper.num_neighbours,
        )
    }

    /// Collaborative estimate, or `None` if the model cannot produce one.
    pub fn collaborative_estimate(&self, user_id: &str, product_id: &str) -> Option<f32> {
        self.collaborative.estimate(user_id, product_id)
    }
}

impl<'a, C, S> RatingPredictor for HybridModel<'a, C, S>
where
    C: CollaborativeModel + ?Sized + 'a,
    S: SimilarityIndex + ?Sized + 'a,
{
    fn predict(&self, user_id: &str, product_id: &str) -> Prediction {
        let content = self.content_estimate(user_id, product_id);
        let collaborative = self.collaborative_estimate(user_id, product_id);

        let prediction = blend(content, collaborative, self.hyper.alpha);

        trace!(
            user_id,
            product_id,
            ?content,
            ?collaborative,
            %prediction,
            "Blended estimates."
        );

        prediction
    }
}
