#![deny(missing_docs)]
//! # hyrec
//!
//! `hyrec` blends two pre-built recommendation signals into a single
//! predicted rating: a latent-factor collaborative model, and a
//! content-similarity matrix over products. The blended prediction is then
//! used to rank every product a user has not yet rated.
//!
//! Neither signal is trained here: both are loaded as finished artifacts
//! (see [`artifacts`](artifacts/index.html)) and queried through the
//! [`CollaborativeModel`](trait.CollaborativeModel.html) and
//! [`SimilarityIndex`](trait.SimilarityIndex.html) traits.
//!
//! ## Example
//!
//! ```rust
//! # extern crate hyrec;
//! # extern crate ndarray;
//! use hyrec::data::{Rating, Ratings};
//! use hyrec::hybrid::Hyperparameters;
//! use hyrec::models::content::ContentSimilarity;
//!
//! let ratings = Ratings::from(vec![
//!     Rating::new("alice", "a", 5.0),
//!     Rating::new("alice", "b", 3.0),
//!     Rating::new("bob", "c", 4.0),
//! ]);
//!
//! let similarity = ContentSimilarity::new(
//!     vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
//!     ndarray::arr2(&[[1.0, 0.2, 0.9], [0.2, 1.0, 0.8], [0.9, 0.8, 1.0]]),
//! ).unwrap();
//!
//! // Any closure can stand in for the collaborative model.
//! let collaborative = |_user: &str, _product: &str| Some(2.0_f32);
//!
//! let model = Hyperparameters::new()
//!     .alpha(0.5)
//!     .build(&ratings, &collaborative, &similarity)
//!     .unwrap();
//!
//! let recommendations = model.recommend("alice", ratings.product_ids());
//!
//! assert_eq!(recommendations.len(), 1);
//! assert_eq!(recommendations[0].product_id, "c");
//! assert_eq!(recommendations[0].score, 3.0);
//! ```
#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate failure;
#[macro_use]
extern crate tracing;

extern crate csv;
extern crate itertools;
extern crate ndarray;
extern crate rand;
extern crate rayon;
extern crate serde;
extern crate serde_json;
extern crate siphasher;

#[cfg(test)]
extern crate proptest;

use std::fmt;

pub mod artifacts;
pub mod config;
pub mod data;
pub mod evaluation;
pub mod hybrid;
pub mod models;
pub mod recommend;

use models::content::SimilarityRow;

/// Alias for user identifiers.
pub type UserId = String;
/// Alias for product identifiers.
pub type ProductId = String;

/// Invalid model parameters.
#[derive(Debug, Fail)]
pub enum ParameterError {
    /// The blend weight lies outside `[0, 1]` or is not a number.
    #[fail(display = "Blend weight must lie in [0, 1], got {}.", _0)]
    InvalidBlendWeight(f32),
    /// The requested list length exceeds the recommendation limit.
    #[fail(
        display = "At most {} recommendations can be requested, got {}.",
        limit, requested
    )]
    TooManyRecommendations {
        /// Requested list length.
        requested: usize,
        /// Largest allowed list length.
        limit: usize,
    },
}

/// Malformed pre-built artifacts.
#[derive(Debug, Fail)]
pub enum ArtifactError {
    /// The similarity matrix does not have one square row per product.
    #[fail(
        display = "Similarity matrix is {}x{} but {} products are indexed.",
        rows, cols, products
    )]
    SimilarityShape {
        /// Matrix rows.
        rows: usize,
        /// Matrix columns.
        cols: usize,
        /// Number of indexed products.
        products: usize,
    },
    /// A product id is listed more than once.
    #[fail(display = "Product {} is indexed more than once.", _0)]
    DuplicateProduct(ProductId),
    /// A user id is listed more than once.
    #[fail(display = "User {} is indexed more than once.", _0)]
    DuplicateUser(UserId),
    /// Factor matrices or bias vectors disagree with the id lists.
    #[fail(display = "Inconsistent factor shapes: {}.", _0)]
    FactorShape(String),
}

/// The outcome of blending the available estimates for a (user, product) pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    /// A predicted rating. Zero is a legitimate score.
    Score(f32),
    /// Neither estimator could produce a value.
    InsufficientData,
}

impl Prediction {
    /// The predicted rating, if there is one.
    pub fn score(&self) -> Option<f32> {
        match *self {
            Prediction::Score(score) => Some(score),
            Prediction::InsufficientData => None,
        }
    }

    /// Whether neither estimator produced a value.
    pub fn is_insufficient(&self) -> bool {
        *self == Prediction::InsufficientData
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Prediction::Score(score) => write!(f, "{:.2}", score),
            Prediction::InsufficientData => write!(f, "Not enough data to predict."),
        }
    }
}

/// A pre-trained model able to produce a point estimate of a user's
/// rating for a product.
pub trait CollaborativeModel {
    /// Estimate the rating `user_id` would give `product_id`, or `None`
    /// when the model has no basis for an estimate (for example, an id
    /// it never saw during training).
    fn estimate(&self, user_id: &str, product_id: &str) -> Option<f32>;
}

impl<F> CollaborativeModel for F
where
    F: Fn(&str, &str) -> Option<f32>,
{
    fn estimate(&self, user_id: &str, product_id: &str) -> Option<f32> {
        self(user_id, product_id)
    }
}

/// A pre-built item-by-item similarity structure.
pub trait SimilarityIndex {
    /// The similarity row of `product_id` against every indexed product,
    /// or `None` if the product is not indexed.
    fn similarity_row(&self, product_id: &str) -> Option<SimilarityRow>;
}

/// Trait describing models that predict a user's rating for a product.
pub trait RatingPredictor {
    /// Predict the rating `user_id` would give `product_id`.
    fn predict(&self, user_id: &str, product_id: &str) -> Prediction;
}
