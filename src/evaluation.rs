//! Offline accuracy of rating predictions on held-out ratings.
use rayon::prelude::*;

use super::RatingPredictor;
use data::Ratings;

/// Evaluation error types.
#[derive(Debug, Fail)]
pub enum EvaluationError {
    /// No test rating could be predicted.
    #[fail(display = "No test rating could be predicted.")]
    NoPredictions,
}

fn squared_errors<T: RatingPredictor + Sync>(model: &T, test: &Ratings) -> Vec<f32> {
    test.data()
        .par_iter()
        .filter_map(|rating| {
            model
                .predict(rating.user_id(), rating.product_id())
                .score()
                .filter(|score| score.is_finite())
                .map(|score| (score - rating.rating()).powi(2))
        })
        .collect()
}

/// Root mean squared error over the test ratings the model can predict.
///
/// Ratings with insufficient data are skipped; see `coverage_score`.
pub fn rmse_score<T: RatingPredictor + Sync>(
    model: &T,
    test: &Ratings,
) -> Result<f32, EvaluationError> {
    let errors = squared_errors(model, test);

    if errors.is_empty() {
        return Err(EvaluationError::NoPredictions);
    }

    Ok((errors.iter().sum::<f32>() / errors.len() as f32).sqrt())
}

/// Fraction of test ratings for which the model produces a finite prediction.
pub fn coverage_score<T: RatingPredictor + Sync>(
    model: &T,
    test: &Ratings,
) -> Result<f32, EvaluationError> {
    let predicted = squared_errors(model, test).len();

    if predicted == 0 {
        return Err(EvaluationError::NoPredictions);
    }

    Ok(predicted as f32 / test.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::Rating;
    use Prediction;

    struct Constant(Prediction);

    impl RatingPredictor for Constant {
        fn predict(&self, _: &str, _: &str) -> Prediction {
            self.0
        }
    }

    struct Lookup(Ratings);

    impl RatingPredictor for Lookup {
        fn predict(&self, user_id: &str, product_id: &str) -> Prediction {
            self.0
                .user_ratings(user_id)
                .find(|x| x.product_id() == product_id)
                .map(|x| Prediction::Score(x.rating()))
                .unwrap_or(Prediction::InsufficientData)
        }
    }

    fn test_ratings() -> Ratings {
        Ratings::from(vec![
            Rating::new("u", "a", 4.0),
            Rating::new("u", "b", 2.0),
            Rating::new("v", "a", 3.0),
            Rating::new("v", "c", 5.0),
        ])
    }

    #[test]
    fn perfect_predictions_have_zero_error() {
        let test = test_ratings();
        let model = Lookup(test.clone());

        assert_eq!(rmse_score(&model, &test).unwrap(), 0.0);
        assert_eq!(coverage_score(&model, &test).unwrap(), 1.0);
    }

    #[test]
    fn constant_predictions() {
        let test = test_ratings();
        let model = Constant(Prediction::Score(3.0));

        // Errors 1, 1, 0, 2: sqrt(6 / 4).
        assert!((rmse_score(&model, &test).unwrap() - 1.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn skips_unpredictable_ratings() {
        let test = test_ratings();
        let model = Lookup(Ratings::from(vec![
            Rating::new("u", "a", 3.0),
            Rating::new("v", "c", 5.0),
        ]));

        assert_eq!(rmse_score(&model, &test).unwrap(), 0.5f32.sqrt());
        assert_eq!(coverage_score(&model, &test).unwrap(), 0.5);
    }

    #[test]
    fn nothing_predictable_is_an_error() {
        let test = test_ratings();
        let model = Constant(Prediction::InsufficientData);

        assert!(rmse_score(&model, &test).is_err());
        assert!(coverage_score(&model, &Ratings::default()).is_err());
    }
}
