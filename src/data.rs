//! The ratings table and train/test splitting.
use std;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use std::io;
use std::path::Path;

use csv;
use failure;
use itertools::Itertools;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use siphasher::sip::SipHasher;

use super::{ProductId, UserId};

/// A single observed rating.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Rating {
    user_id: UserId,
    product_id: ProductId,
    rating: f32,
}

impl Rating {
    /// Build a rating of `product_id` by `user_id`.
    pub fn new<U, P>(user_id: U, product_id: P, rating: f32) -> Self
    where
        U: Into<UserId>,
        P: Into<ProductId>,
    {
        Rating {
            user_id: user_id.into(),
            product_id: product_id.into(),
            rating,
        }
    }

    /// The rating user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The rated product.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// The rating value.
    pub fn rating(&self) -> f32 {
        self.rating
    }
}

/// Shuffle the ratings and hold out `test_fraction` of them.
///
/// Returns `(train, test)`.
pub fn train_test_split<R: Rng>(
    ratings: &mut Ratings,
    rng: &mut R,
    test_fraction: f32,
) -> (Ratings, Ratings) {
    ratings.shuffle(rng);

    let (test, train) = ratings.split_at((test_fraction * ratings.len() as f32) as usize);

    (train, test)
}

/// Hold out roughly `test_fraction` of the users, together with all their ratings.
///
/// Returns `(train, test)`; no user appears in both.
pub fn user_based_split<R: Rng>(
    ratings: &Ratings,
    rng: &mut R,
    test_fraction: f32,
) -> (Ratings, Ratings) {
    let denominator = 100_000;
    let train_cutoff = (test_fraction * denominator as f32) as u64;

    let range = Uniform::new(0, std::u64::MAX);
    let (key_0, key_1) = (range.sample(rng), range.sample(rng));

    let is_train = |x: &Rating| {
        let mut hasher = SipHasher::new_with_keys(key_0, key_1);
        hasher.write(x.user_id().as_bytes());
        hasher.finish() % denominator >= train_cutoff
    };

    ratings.split_by(is_train)
}

/// Read-only ratings table, indexed by user and by product.
#[derive(Clone, Debug, Default)]
pub struct Ratings {
    ratings: Vec<Rating>,
    by_user: HashMap<UserId, Vec<usize>>,
    by_product: HashMap<ProductId, Vec<usize>>,
    product_ids: Vec<ProductId>,
}

impl Ratings {
    /// Read ratings from CSV with `user_id`, `product_id`, and `rating` headers.
    /// Other columns are ignored.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, failure::Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let ratings: Vec<Rating> = reader.deserialize().collect::<Result<Vec<_>, _>>()?;

        Ok(Ratings::from(ratings))
    }

    /// Read ratings from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, failure::Error> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let ratings: Vec<Rating> = reader.deserialize().collect::<Result<Vec<_>, _>>()?;

        debug!(
            path = %path.as_ref().display(),
            ratings = ratings.len(),
            "Read ratings table."
        );

        Ok(Ratings::from(ratings))
    }

    /// All ratings, in file order.
    pub fn data(&self) -> &[Rating] {
        &self.ratings
    }

    /// Number of ratings.
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Whether the table holds no ratings.
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Ratings given by `user_id`.
    pub fn user_ratings<'a>(&'a self, user_id: &str) -> impl Iterator<Item = &'a Rating> + 'a {
        let rows: &'a [usize] = self
            .by_user
            .get(user_id)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[]);

        rows.iter().map(move |&row| &self.ratings[row])
    }

    /// Ratings given to `product_id`.
    pub fn product_ratings<'a>(
        &'a self,
        product_id: &str,
    ) -> impl Iterator<Item = &'a Rating> + 'a {
        let rows: &'a [usize] = self
            .by_product
            .get(product_id)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[]);

        rows.iter().map(move |&row| &self.ratings[row])
    }

    /// Products `user_id` has already rated.
    pub fn rated_products(&self, user_id: &str) -> HashSet<&str> {
        self.user_ratings(user_id).map(|x| x.product_id()).collect()
    }

    /// Distinct products, in order of first appearance.
    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    /// Distinct users, sorted ascending.
    pub fn user_ids(&self) -> Vec<&str> {
        self.by_user.keys().map(|x| x.as_str()).sorted().collect()
    }

    /// Number of distinct users.
    pub fn num_users(&self) -> usize {
        self.by_user.len()
    }

    /// Number of distinct products.
    pub fn num_products(&self) -> usize {
        self.product_ids.len()
    }

    /// Shuffle the ratings in place.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut ratings = std::mem::replace(&mut self.ratings, Vec::new());
        rng.shuffle(&mut ratings);

        *self = Ratings::from(ratings);
    }

    /// Split into the first `idx` ratings and the rest.
    pub fn split_at(&self, idx: usize) -> (Self, Self) {
        let idx = idx.min(self.len());

        let head = Ratings::from(self.ratings[..idx].to_owned());
        let tail = Ratings::from(self.ratings[idx..].to_owned());

        (head, tail)
    }

    /// Split into the ratings satisfying `func` and the rest.
    pub fn split_by<F: Fn(&Rating) -> bool>(&self, func: F) -> (Self, Self) {
        let (head, tail): (Vec<Rating>, Vec<Rating>) =
            self.ratings.iter().cloned().partition(|x| func(x));

        (Ratings::from(head), Ratings::from(tail))
    }
}

impl From<Vec<Rating>> for Ratings {
    fn from(data: Vec<Rating>) -> Ratings {
        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        let mut by_product: HashMap<ProductId, Vec<usize>> = HashMap::new();

        for (row, rating) in data.iter().enumerate() {
            by_user
                .entry(rating.user_id.clone())
                .or_insert_with(Vec::new)
                .push(row);
            by_product
                .entry(rating.product_id.clone())
                .or_insert_with(Vec::new)
                .push(row);
        }

        let product_ids = data.iter().map(|x| x.product_id.clone()).unique().collect();

        Ratings {
            ratings: data,
            by_user,
            by_product,
            product_ids,
        }
    }
}
