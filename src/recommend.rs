//! Ranking a user's unrated products by hybrid score.
use std::cmp::Ordering;

use super::{CollaborativeModel, Prediction, ProductId, RatingPredictor, SimilarityIndex};
use hybrid::HybridModel;

/// A recommended product and its predicted rating, rounded to two decimals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommended product.
    pub product_id: ProductId,
    /// Predicted rating, rounded to two decimals.
    pub score: f32,
}

fn round_to_cents(score: f32) -> f32 {
    ((f64::from(score) * 100.0).round() / 100.0) as f32
}

/// Rank scored candidates and keep the best `num_recommendations`.
///
/// Candidates with insufficient data or a non-finite score are dropped.
/// Equal scores keep their candidate order. Scores are rounded to two
/// decimals only after ranking.
pub fn rank<I>(scored: I, num_recommendations: usize) -> Vec<Recommendation>
where
    I: IntoIterator<Item = (ProductId, Prediction)>,
{
    let mut ranked: Vec<(ProductId, f32)> = scored
        .into_iter()
        .filter_map(|(product_id, prediction)| match prediction {
            Prediction::Score(score) if score.is_finite() => Some((product_id, score)),
            _ => None,
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(num_recommendations);

    ranked
        .into_iter()
        .map(|(product_id, score)| Recommendation {
            product_id,
            score: round_to_cents(score),
        })
        .collect()
}

impl<'a, C, S> HybridModel<'a, C, S>
where
    C: CollaborativeModel + ?Sized + 'a,
    S: SimilarityIndex + ?Sized + 'a,
{
    /// Recommend products from `product_ids` that `user_id` has not rated yet.
    ///
    /// An empty list means there was not enough data to score any candidate.
    pub fn recommend(&self, user_id: &str, product_ids: &[ProductId]) -> Vec<Recommendation> {
        let rated = self.ratings.rated_products(user_id);

        let scored: Vec<(ProductId, Prediction)> = product_ids
            .iter()
            .filter(|product_id| !rated.contains(product_id.as_str()))
            .map(|product_id| (product_id.clone(), self.predict(user_id, product_id)))
            .collect();

        let num_candidates = scored.len();
        let recommendations = rank(scored, self.hyper.recommendations());

        debug!(
            user_id,
            rated = rated.len(),
            candidates = num_candidates,
            recommended = recommendations.len(),
            "Ranked candidates."
        );

        recommendations
    }
}
