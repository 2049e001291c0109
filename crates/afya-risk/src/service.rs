use crate::error::ScoringError;
use crate::fallback::fallback_prediction;
use crate::model::{predict_with, ModelKind};
use crate::rules::analyze_at;
use afya_core::{Assessment, Insight, PredictionResult, Profile, Reading};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tracing::{debug, warn};

/// Body posted to a remote scorer.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest<'a> {
    pub readings: &'a [Reading],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<&'a Profile>,
    pub model: ModelKind,
}

/// Analysis as reported by a remote service, with its `aiGenerated` flag.
/// The hosted function answers with its own rule-based insight and
/// `aiGenerated: false` when its model gateway fails.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAnalysis {
    pub insight: Insight,
    pub ai_generated: bool,
}

/// Prediction as reported by a remote service, with its `mlGenerated` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePrediction {
    pub result: PredictionResult,
    pub ml_generated: bool,
}

/// A scorer reached over the network.
pub trait RemoteScorer: Send + Sync {
    fn analyze(
        &self,
        request: &ScoringRequest<'_>,
    ) -> impl Future<Output = Result<RemoteAnalysis, ScoringError>> + Send;

    fn predict(
        &self,
        request: &ScoringRequest<'_>,
    ) -> impl Future<Output = Result<RemotePrediction, ScoringError>> + Send;
}

/// Placeholder remote for services that only score locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl RemoteScorer for NoRemote {
    async fn analyze(&self, _request: &ScoringRequest<'_>) -> Result<RemoteAnalysis, ScoringError> {
        Err(ScoringError::Unavailable)
    }

    async fn predict(&self, _request: &ScoringRequest<'_>) -> Result<RemotePrediction, ScoringError> {
        Err(ScoringError::Unavailable)
    }
}

/// Which classifier the application is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Rules,
    Model,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Rules => "rules",
            Strategy::Model => "model",
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" => Ok(Strategy::Rules),
            "model" | "ml" => Ok(Strategy::Model),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// Remote-then-local scoring. Every call returns a well-formed assessment:
/// an empty window short-circuits to the no-data result, and any remote
/// failure is logged and replaced by the local computation.
pub struct ScoringService<R = NoRemote> {
    remote: Option<R>,
    model: ModelKind,
}

impl ScoringService<NoRemote> {
    pub fn local(model: ModelKind) -> Self {
        Self { remote: None, model }
    }
}

impl<R: RemoteScorer> ScoringService<R> {
    pub fn new(remote: R, model: ModelKind) -> Self {
        Self {
            remote: Some(remote),
            model,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub async fn assess(
        &self,
        strategy: Strategy,
        readings: &[Reading],
        profile: Option<&Profile>,
    ) -> Assessment {
        match strategy {
            Strategy::Rules => self.analyze(readings, profile).await,
            Strategy::Model => self.predict(readings, profile).await,
        }
    }

    /// Remote analysis when available, threshold rules otherwise. A remote
/// reply flagged `aiGenerated: false` is reported as a rule assessment.
    pub async fn analyze(&self, readings: &[Reading], profile: Option<&Profile>) -> Assessment {
        let now = Utc::now();
        if readings.is_empty() {
            return Assessment::Rule(analyze_at(readings, profile, now));
        }

        if let Some(remote) = &self.remote {
            let request = self.request(readings, profile);
            match remote.analyze(&request).await {
                Ok(RemoteAnalysis { insight, ai_generated: true }) => {
                    debug!(status = %insight.status, risk = insight.risk_score, "remote analysis");
                    return Assessment::Ai(insight);
                }
                Ok(RemoteAnalysis { insight, ai_generated: false }) => {
                    warn!(status = %insight.status, "remote answered with its rule fallback");
                    return Assessment::Rule(insight);
                }
                Err(err) => warn!(error = %err, "remote analysis failed, using local rules"),
            }
        }

        Assessment::Rule(analyze_at(readings, profile, now))
    }

    /// Remote prediction when available; the local model when no remote is
    /// configured; the threshold fallback when the remote call fails.
    pub async fn predict(&self, readings: &[Reading], profile: Option<&Profile>) -> Assessment {
        let now = Utc::now();
        if readings.is_empty() {
            return Assessment::Ml {
                result: PredictionResult::no_data(now),
                generated: false,
            };
        }

        let Some(remote) = &self.remote else {
            return Assessment::Ml {
                result: predict_with(self.model, readings, profile, now),
                generated: true,
            };
        };

        let request = self.request(readings, profile);
        match remote.predict(&request).await {
            Ok(reply) => {
                debug!(model = %reply.result.model, probability = reply.result.probability, "remote prediction");
                Assessment::Ml {
                    result: reply.result,
                    generated: reply.ml_generated,
                }
            }
            Err(err) => {
                warn!(error = %err, "remote prediction failed, using fallback");
                Assessment::Ml {
                    result: fallback_prediction(readings, now),
                    generated: false,
                }
            }
        }
    }

    fn request<'a>(&self, readings: &'a [Reading], profile: Option<&'a Profile>) -> ScoringRequest<'a> {
        ScoringRequest {
            readings,
            user_profile: profile,
            model: self.model,
        }
    }
}
