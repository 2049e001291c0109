use crate::error::ScoringError;
use crate::service::{RemoteAnalysis, RemotePrediction, RemoteScorer, ScoringRequest};
use afya_core::{FeatureSnapshot, Insight, ModelOutput, PredictionResult, Status, MODEL_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpScorerConfig {
    pub analysis_url: Option<String>,
    pub predict_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for HttpScorerConfig {
    fn default() -> Self {
        Self {
            analysis_url: None,
            predict_url: None,
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

impl HttpScorerConfig {
    pub fn is_configured(&self) -> bool {
        self.analysis_url.is_some() || self.predict_url.is_some()
    }
}

/// JSON-over-HTTP scorer for the hosted analysis and prediction functions.
pub struct HttpScorer {
    client: reqwest::Client,
    config: HttpScorerConfig,
}

impl HttpScorer {
    pub fn new(config: HttpScorerConfig) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    async fn post(&self, url: Option<&str>, request: &ScoringRequest<'_>) -> Result<ResponseBody, ScoringError> {
        let url = url.ok_or(ScoringError::Unavailable)?;
        debug!(url, readings = request.readings.len(), "posting scoring request");

        let mut builder = self.client.post(url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        decode_body(&text)
    }
}

impl RemoteScorer for HttpScorer {
    async fn analyze(&self, request: &ScoringRequest<'_>) -> Result<RemoteAnalysis, ScoringError> {
        let body = self.post(self.config.analysis_url.as_deref(), request).await?;
        Ok(body.into_analysis(Utc::now()))
    }

    async fn predict(&self, request: &ScoringRequest<'_>) -> Result<RemotePrediction, ScoringError> {
        let body = self.post(self.config.predict_url.as_deref(), request).await?;
        Ok(body.into_prediction(Utc::now()))
    }
}

/// Loose view of what the scoring endpoints return. Missing fields are
/// filled in the same way for every endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ResponseBody {
    error: Option<String>,
    status: Option<Status>,
    summary: Option<String>,
    recommendation: Option<String>,
    risk_score: Option<f64>,
    factors: Option<Vec<String>>,
    insights: Option<String>,
    timestamp: Option<i64>,
    prediction: Option<f64>,
    probability: Option<f64>,
    model: Option<String>,
    model_used: Option<String>,
    confidence: Option<f64>,
    features: Option<FeatureSnapshot>,
    individual_results: Option<BTreeMap<String, serde_json::Value>>,
    ai_generated: Option<bool>,
    ml_generated: Option<bool>,
    version: Option<String>,
}

pub(crate) fn decode_body(text: &str) -> Result<ResponseBody, ScoringError> {
    let body: ResponseBody = serde_json::from_str(text)?;
    if let Some(err) = body.error {
        return Err(ScoringError::Upstream(err));
    }
    Ok(body)
}

impl ResponseBody {
    /// A missing `aiGenerated` counts as generated.
    pub(crate) fn into_analysis(self, now: DateTime<Utc>) -> RemoteAnalysis {
        let ai_generated = self.ai_generated.unwrap_or(true);
        RemoteAnalysis {
            insight: self.into_insight("Analysis complete.", now),
            ai_generated,
        }
    }

    pub(crate) fn into_insight(self, default_summary: &str, now: DateTime<Utc>) -> Insight {
        let timestamp = self
            .timestamp
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(now);
        Insight {
            status: self.status.unwrap_or(Status::Normal),
            summary: self.summary.unwrap_or_else(|| default_summary.to_string()),
            recommendation: self
                .recommendation
                .unwrap_or_else(|| "Continue monitoring.".to_string()),
            risk_score: self
                .risk_score
                .map(|s| s.round().clamp(0.0, 100.0) as u8)
                .unwrap_or(0),
            factors: self.factors.unwrap_or_default(),
            insights: self.insights,
            timestamp,
        }
    }

    pub(crate) fn into_prediction(mut self, now: DateTime<Utc>) -> RemotePrediction {
        let probability = self
            .probability
            .or(self.confidence.map(|c| c / 100.0))
            .or(self.risk_score.map(|s| s / 100.0))
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let prediction = match self.prediction {
            Some(p) => u8::from(p >= 0.5),
            None => u8::from(probability >= 0.5),
        };
        let model = self
            .model
            .take()
            .or(self.model_used.take())
            .unwrap_or_else(|| "remote".to_string());
        let individual_results = self.individual_results.take().map(|raw| {
            raw.into_iter()
                .filter_map(|(name, value)| {
                    serde_json::from_value::<ModelOutput>(value)
                        .ok()
                        .map(|out| (name, out))
                })
                .collect()
        });
        let features = self.features.take();
        let version = self.version.take().unwrap_or_else(|| MODEL_VERSION.to_string());
        let ml_generated = self.ml_generated.unwrap_or(true);

        RemotePrediction {
            result: PredictionResult {
                insight: self.into_insight("Prediction complete.", now),
                prediction,
                probability,
                model,
                features,
                individual_results,
                version,
            },
            ml_generated,
        }
    }
}
