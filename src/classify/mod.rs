//! Zero-shot category inference.
//!
//! A free-text transaction description is scored against every label of a
//! [CategorySet](crate::CategorySet) by a [LabelScorer], and [classify]
//! selects the best-scoring label. The production scorer ([NliScorer]) calls
//! a natural-language-inference model over HTTP and is treated as an opaque
//! scoring oracle; any other implementor of [LabelScorer] can take its
//! place.

mod nli;
mod scorer;
mod selector;

pub use nli::{NliScorer, ScorerConfig};
pub use scorer::{LabelScore, LabelScorer};
pub use selector::classify;
