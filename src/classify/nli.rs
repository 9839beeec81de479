//! A label scorer backed by a hosted natural-language-inference model.
//!
//! The scorer posts the text and candidate labels to the Hugging Face
//! inference API's zero-shot classification endpoint. The model is an opaque
//! oracle: this module only shapes the request, enforces the timeout, and
//! maps the response scores back to candidate order.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    CategorySet, Error,
    classify::scorer::{LabelScore, LabelScorer},
};

/// The model the original pipeline used locally, served by the inference API.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How an entailment hypothesis is built from a candidate label.
const HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Configuration for [NliScorer].
#[derive(Clone, Debug)]
pub struct ScorerConfig {
    /// The URL of the zero-shot classification endpoint.
    pub endpoint: String,
    /// An optional API token sent as a bearer credential.
    pub api_token: Option<String>,
    /// The per-request timeout. A request that exceeds it fails with
    /// [Error::ModelUnavailable] rather than hanging.
    pub timeout: Duration,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Scores labels with a remote zero-shot classification model.
///
/// The public interface is synchronous to match the request-per-call model
/// of the rest of the crate; the HTTP call runs on a tokio runtime
/// internally.
pub struct NliScorer {
    config: ScorerConfig,
    client: reqwest::Client,
}

impl NliScorer {
    /// Create a scorer for the endpoint in `config`.
    ///
    /// # Errors
    /// Returns [Error::ModelUnavailable] if the HTTP client cannot be built.
    pub fn new(config: ScorerConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::ModelUnavailable(error.to_string()))?;

        Ok(Self { config, client })
    }

    async fn request(&self, text: &str, labels: &CategorySet) -> Result<ZeroShotResponse, Error> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels.iter().map(|label| label.as_ref()).collect(),
                hypothesis_template: HYPOTHESIS_TEMPLATE,
            },
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::ModelUnavailable(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ModelUnavailable(format!(
                "the scoring backend returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|error| Error::ModelUnavailable(error.to_string()))
    }
}

impl LabelScorer for NliScorer {
    fn score(&self, text: &str, labels: &CategorySet) -> Result<Vec<LabelScore>, Error> {
        // The caller may or may not already be inside a tokio runtime.
        // Calling block_on on a nested runtime panics, so bridge through the
        // current handle when one exists.
        let response = if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.request(text, labels)))
        } else {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|error| Error::ModelUnavailable(error.to_string()))?;
            runtime.block_on(self.request(text, labels))
        }?;

        scores_in_candidate_order(&response, labels)
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
    hypothesis_template: &'a str,
}

/// The inference API returns labels sorted by descending score, not in
/// request order.
#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Reorder the response scores to match the candidate order of `labels`.
///
/// The scorer contract promises one score per input label, so a response
/// that is missing a label or carries mismatched lengths is unusable and
/// reported as [Error::ModelUnavailable].
fn scores_in_candidate_order(
    response: &ZeroShotResponse,
    labels: &CategorySet,
) -> Result<Vec<LabelScore>, Error> {
    if response.labels.len() != response.scores.len() {
        return Err(Error::ModelUnavailable(
            "the scoring backend returned mismatched labels and scores".to_string(),
        ));
    }

    labels
        .iter()
        .map(|label| {
            let position = response
                .labels
                .iter()
                .position(|returned| returned == label.as_ref())
                .ok_or_else(|| {
                    Error::ModelUnavailable(format!(
                        "the scoring backend returned no score for \"{label}\""
                    ))
                })?;

            Ok(LabelScore {
                label: label.clone(),
                score: response.scores[position].clamp(0.0, 1.0),
            })
        })
        .collect()
}
