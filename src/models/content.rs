//! Content-based estimates from a pre-built product similarity matrix.
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use failure;
use ndarray::{Array2, ArrayView1};
use serde_json;

use super::super::{ArtifactError, ProductId, SimilarityIndex};
use data::Ratings;

/// One product's similarities against every indexed product.
#[derive(Clone, Debug)]
pub struct SimilarityRow<'a> {
    row: usize,
    scores: ArrayView1<'a, f32>,
    products: &'a [ProductId],
}

impl<'a> SimilarityRow<'a> {
    /// Build a row. `scores[i]` is the similarity to `products[i]`,
    /// and `row` is the position of the queried product itself.
    pub fn new(row: usize, scores: ArrayView1<'a, f32>, products: &'a [ProductId]) -> Self {
        debug_assert_eq!(scores.len(), products.len());

        SimilarityRow {
            row,
            scores,
            products,
        }
    }

    /// Position of the queried product in the index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Similarity scores, in index order.
    pub fn scores(&self) -> ArrayView1<'a, f32> {
        self.scores.clone()
    }

    /// The `k` most similar other products, most similar first.
    ///
    /// The queried product itself is never returned, NaN similarities are
    /// skipped, and ties keep index order.
    pub fn nearest(&self, k: usize) -> Vec<&'a str> {
        let products = self.products;

        let mut neighbours: Vec<(usize, f32)> = self
            .scores
            .iter()
            .cloned()
            .enumerate()
            .filter(|&(idx, score)| idx != self.row && !score.is_nan())
            .collect();

        neighbours.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        neighbours
            .into_iter()
            .take(k)
            .map(|(idx, _)| products[idx].as_str())
            .collect()
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSimilarity {
    products: Vec<ProductId>,
    matrix: Array2<f32>,
}

/// Dense product-by-product similarity matrix with a product id to row mapping.
#[derive(Clone, Debug)]
pub struct ContentSimilarity {
    products: Vec<ProductId>,
    matrix: Array2<f32>,
    index: HashMap<ProductId, usize>,
}

impl ContentSimilarity {
    /// Build the index. Row and column `i` of `matrix` belong to `products[i]`.
    pub fn new(products: Vec<ProductId>, matrix: Array2<f32>) -> Result<Self, ArtifactError> {
        let (rows, cols) = matrix.dim();

        if rows != cols || rows != products.len() {
            return Err(ArtifactError::SimilarityShape {
                rows,
                cols,
                products: products.len(),
            });
        }

        let mut index = HashMap::with_capacity(products.len());

        for (row, product_id) in products.iter().enumerate() {
            if index.insert(product_id.clone(), row).is_some() {
                return Err(ArtifactError::DuplicateProduct(product_id.clone()));
            }
        }

        Ok(ContentSimilarity {
            products,
            matrix,
            index,
        })
    }

    /// Load a similarity index stored as JSON:
    /// `{"products": [...], "matrix": <ndarray>}`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, failure::Error> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let stored: StoredSimilarity = serde_json::from_reader(reader)?;
        let similarity = ContentSimilarity::new(stored.products, stored.matrix)?;

        debug!(
            path = %path.as_ref().display(),
            products = similarity.len(),
            "Read similarity index."
        );

        Ok(similarity)
    }

    /// Number of indexed products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether no products are indexed.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Indexed products, in row order.
    pub fn products(&self) -> &[ProductId] {
        &self.products
    }
}

impl SimilarityIndex for ContentSimilarity {
    fn similarity_row(&self, product_id: &str) -> Option<SimilarityRow> {
        let &row = self.index.get(product_id)?;

        Some(SimilarityRow::new(row, self.matrix.row(row), &self.products))
    }
}

/// Estimate `user_id`'s rating of `product_id` from content alone.
///
/// Takes the `num_neighbours` products most similar to `product_id` and
/// averages every rating the user gave any of them. Returns `None` if the
/// product is not indexed or the user rated none of its neighbours.
pub fn content_estimate<S: SimilarityIndex + ?Sized>(
    similarity: &S,
    ratings: &Ratings,
    user_id: &str,
    product_id: &str,
    num_neighbours: usize,
) -> Option<f32> {
    let row = similarity.similarity_row(product_id)?;
    let neighbours: HashSet<&str> = row.nearest(num_neighbours).into_iter().collect();

    let (total, count) = ratings
        .user_ratings(user_id)
        .filter(|x| neighbours.contains(x.product_id()))
        .fold((0.0_f32, 0_usize), |(total, count), x| (total + x.rating(), count + 1));

    if count == 0 {
        None
    } else {
        Some(total / count as f32)
    }
}
