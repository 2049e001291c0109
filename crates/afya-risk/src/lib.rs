//! Risk scoring for windows of wristband readings.
//!
//! Two local strategies are available: threshold rules ([`rules`]) and the
//! hypertension models ([`model`]). [`service::ScoringService`] puts an
//! optional remote scorer in front of them and falls back to the local
//! computation whenever the remote call fails.

pub mod error;
pub mod fallback;
pub mod features;
pub mod forest;
pub mod gate;
pub mod http;
pub mod interpret;
pub mod logistic;
pub mod model;
pub mod rules;
pub mod service;


pub use error::ScoringError;
pub use fallback::fallback_prediction;
pub use features::{sigmoid, FeatureVector};
pub use gate::{AnalysisGate, AnalysisPermit};
pub use http::{HttpScorer, HttpScorerConfig};
pub use model::{predict, ModelKind};
pub use rules::analyze;
pub use service::{NoRemote, RemoteAnalysis, RemotePrediction, RemoteScorer, ScoringRequest, ScoringService, Strategy};
