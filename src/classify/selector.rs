//! Selects the best-scoring category for a text snippet.

use crate::{
    CategoryName, CategorySet, Error,
    classify::scorer::{LabelScore, LabelScorer},
};

/// Classify `text` as one of the labels in `categories`.
///
/// Calls `scorer` for a score per label and returns the label with the
/// maximum score. On exact ties the label that appears first in the
/// candidate order wins ("stable first-max"), so the result is deterministic
/// for identical inputs. The returned label is always a member of
/// `categories`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyInput] if `text` is empty or whitespace-only,
/// - [Error::ModelUnavailable] if the scorer's backing model is unreachable
///   or returns no usable scores.
pub fn classify(
    scorer: &dyn LabelScorer,
    text: &str,
    categories: &CategorySet,
) -> Result<CategoryName, Error> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let scores = scorer.score(text, categories)?;

    let best: Option<&LabelScore> = scores.iter().fold(None, |best, entry| match best {
        // Strictly greater, so the earliest label keeps ties.
        Some(current) if entry.score > current.score => Some(entry),
        Some(current) => Some(current),
        None => Some(entry),
    });

    match best {
        Some(entry) => Ok(entry.label.clone()),
        None => Err(Error::ModelUnavailable(
            "the scorer returned no scores".to_string(),
        )),
    }
}

#[cfg(test)]
mod classify_tests {
    use crate::{
        CategoryName, CategorySet, Error,
        classify::{
            classify,
            scorer::{LabelScore, LabelScorer},
        },
    };

    /// Assigns a fixed score per label, and 0.0 to labels it does not know.
    struct StubScorer {
        scores: Vec<(&'static str, f64)>,
    }

    impl LabelScorer for StubScorer {
        fn score(&self, _text: &str, labels: &CategorySet) -> Result<Vec<LabelScore>, Error> {
            Ok(labels
                .iter()
                .map(|label| LabelScore {
                    label: label.clone(),
                    score: self
                        .scores
                        .iter()
                        .find(|(name, _)| *name == label.as_ref())
                        .map(|(_, score)| *score)
                        .unwrap_or(0.0),
                })
                .collect())
        }
    }

    /// Always reports the backing model as down.
    struct UnavailableScorer;

    impl LabelScorer for UnavailableScorer {
        fn score(&self, _text: &str, _labels: &CategorySet) -> Result<Vec<LabelScore>, Error> {
            Err(Error::ModelUnavailable("connection refused".to_string()))
        }
    }

    fn food_transport_utilities() -> CategorySet {
        CategorySet::new(vec![
            CategoryName::new_unchecked("Food"),
            CategoryName::new_unchecked("Transportation"),
            CategoryName::new_unchecked("Utilities"),
        ])
        .unwrap()
    }

    #[test]
    fn classify_returns_highest_scoring_label() {
        let scorer = StubScorer {
            scores: vec![("Food", 0.92), ("Transportation", 0.31), ("Utilities", 0.05)],
        };
        let categories = food_transport_utilities();

        let label = classify(&scorer, "Tesco grocery run", &categories).unwrap();

        assert_eq!(label, CategoryName::new_unchecked("Food"));
    }

    #[test]
    fn classify_returns_a_member_of_the_label_set() {
        let scorer = StubScorer {
            scores: vec![("Transportation", 0.7)],
        };
        let categories = food_transport_utilities();

        let label = classify(&scorer, "Uber to the airport", &categories).unwrap();

        assert!(categories.contains(&label));
    }

    #[test]
    fn classify_breaks_exact_ties_with_first_label_in_candidate_order() {
        let scorer = StubScorer {
            scores: vec![("Food", 0.5), ("Transportation", 0.5), ("Utilities", 0.5)],
        };
        let categories = food_transport_utilities();

        for _ in 0..10 {
            let label = classify(&scorer, "ambiguous merchant", &categories).unwrap();
            assert_eq!(label, CategoryName::new_unchecked("Food"));
        }
    }

    #[test]
    fn classify_tie_break_follows_candidate_order_not_alphabetical_order() {
        let scorer = StubScorer {
            scores: vec![("Utilities", 0.5), ("Food", 0.5)],
        };
        let categories = CategorySet::new(vec![
            CategoryName::new_unchecked("Utilities"),
            CategoryName::new_unchecked("Food"),
        ])
        .unwrap();

        let label = classify(&scorer, "ambiguous merchant", &categories).unwrap();

        assert_eq!(label, CategoryName::new_unchecked("Utilities"));
    }

    #[test]
    fn classify_fails_on_empty_text() {
        let scorer = StubScorer { scores: vec![] };
        let categories = food_transport_utilities();

        let result = classify(&scorer, "", &categories);

        assert_eq!(result, Err(Error::EmptyInput));
    }

    #[test]
    fn classify_fails_on_whitespace_only_text() {
        let scorer = StubScorer { scores: vec![] };
        let categories = food_transport_utilities();

        let result = classify(&scorer, " \t\n", &categories);

        assert_eq!(result, Err(Error::EmptyInput));
    }

    #[test]
    fn classify_propagates_model_unavailable() {
        let categories = food_transport_utilities();

        let result = classify(&UnavailableScorer, "Tesco grocery run", &categories);

        assert_eq!(
            result,
            Err(Error::ModelUnavailable("connection refused".to_string()))
        );
    }
}
