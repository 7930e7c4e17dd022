use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::model::{ListKind, ScanError, Verdict};

/// Remote classification boundary. Production traffic goes through
/// [`HttpClassifier`]; tests substitute scripted implementations.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, url: &str) -> Result<Verdict, ScanError>;

    async fn submit_listing(&self, url: &str, list: ListKind) -> Result<(), ScanError>;
}

#[derive(Debug, Clone)]
pub struct ClassifierEndpoints {
    pub check: String,
    pub allow: String,
    pub deny: String,
    pub report: String,
}

impl Default for ClassifierEndpoints {
    fn default() -> Self {
        Self {
            check: "/api/check-url".to_string(),
            allow: "/api/whitelist".to_string(),
            deny: "/api/blacklist".to_string(),
            report: "/api/report-url".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct VerdictWire {
    risk: String,
    score: f64,
    #[serde(default)]
    reasons: Vec<String>,
}

// The error variant must come first: a scored payload never carries an
// `error` field, but both shapes arrive with a 2xx status.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum CheckResponse {
    Error { error: String },
    Scored(VerdictWire),
}

#[derive(Deserialize, Debug)]
struct MutationResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpClassifier {
    client: reqwest::Client,
    base: String,
    endpoints: ClassifierEndpoints,
}

impl HttpClassifier {
    #[must_use]
    pub fn new(client: reqwest::Client, base: &str, endpoints: ClassifierEndpoints) -> Self {
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            endpoints,
        }
    }

    /// Startup reachability probe against the classifier root.
    pub async fn health(&self) -> Result<(), ScanError> {
        self.client
            .get(format!("{}/", self.base))
            .send()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| ScanError::Network(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Classify for HttpClassifier {
    async fn classify(&self, url: &str) -> Result<Verdict, ScanError> {
        let response = self
            .client
            .post(format!("{}{}", self.base, self.endpoints.check))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?
            .json::<CheckResponse>()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?;

        match response {
            CheckResponse::Error { error } => Err(ScanError::Classifier(error)),
            CheckResponse::Scored(wire) => {
                Verdict::new(wire.risk.parse()?, wire.score, wire.reasons)
            }
        }
    }

    async fn submit_listing(&self, url: &str, list: ListKind) -> Result<(), ScanError> {
        let path = match list {
            ListKind::Allow => &self.endpoints.allow,
            ListKind::Deny => &self.endpoints.deny,
            ListKind::Report => &self.endpoints.report,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?
            .json::<MutationResponse>()
            .await
            .map_err(|e| ScanError::Network(e.to_string()))?;

        if response.ok {
            Ok(())
        } else {
            Err(ScanError::ListMutation(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}
