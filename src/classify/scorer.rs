//! Defines the label scorer trait.

use crate::{CategoryName, CategorySet, Error};

/// The likelihood score a scorer assigned to one candidate label.
///
/// Ephemeral: produced per classification call and not persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelScore {
    /// The candidate label that was scored.
    pub label: CategoryName,
    /// The likelihood that the label applies to the text, in `[0, 1]`.
    pub score: f64,
}

/// Scores a text snippet against a fixed set of candidate labels.
///
/// Implementers must return exactly one [LabelScore] per label of `labels`,
/// in candidate order, with every score in `[0, 1]`, and must not mutate the
/// label set. Text is guaranteed non-empty by the caller
/// ([classify](crate::classify)).
pub trait LabelScorer {
    /// Score `text` against every label in `labels`.
    ///
    /// # Errors
    /// This function will return [Error::ModelUnavailable] if the backing
    /// model is unreachable or times out. The call may take seconds when a
    /// remote model is involved; it must fail rather than hang indefinitely.
    fn score(&self, text: &str, labels: &CategorySet) -> Result<Vec<LabelScore>, Error>;
}
